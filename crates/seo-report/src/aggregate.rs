//! Turns per-page issues into per-page and site-wide scores (§4.6). Pure
//! arithmetic over already-computed data; does no I/O and makes no further
//! rule-engine calls.

use seo_types::{CrawlRecord, Issue, PageScore, SiteContext};
use std::collections::BTreeMap;

pub fn score_pages(records: &[CrawlRecord], ctx: &SiteContext) -> Vec<PageScore> {
    records
        .iter()
        .map(|record| {
            let mut issues = seo_rules::evaluate(record, ctx);
            issues.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.code.cmp(b.code)));
            PageScore::compute(record.url.clone(), issues)
        })
        .collect()
}

pub fn average_score(pages: &[PageScore]) -> f64 {
    if pages.is_empty() {
        return 0.0;
    }
    let sum: i64 = pages.iter().map(|p| p.final_score as i64).sum();
    let mean = sum as f64 / pages.len() as f64;
    (mean * 100.0).round() / 100.0
}

/// Count of occurrences per rule code, across every page's issues.
pub fn code_counts<'a>(pages: &'a [PageScore], category: seo_types::Category) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for issue in all_issues(pages).filter(|i| i.category == category) {
        *counts.entry(issue.code.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Issues per rule code, across every page, grouped for `audit_issues`.
pub fn code_groups(pages: &[PageScore], category: seo_types::Category) -> BTreeMap<String, Vec<Issue>> {
    let mut groups: BTreeMap<String, Vec<Issue>> = BTreeMap::new();
    for issue in all_issues(pages).filter(|i| i.category == category) {
        groups.entry(issue.code.to_string()).or_default().push(issue.clone());
    }
    groups
}

pub fn all_issues(pages: &[PageScore]) -> impl Iterator<Item = &Issue> {
    pages.iter().flat_map(|p| p.issues.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_types::CanonicalUrl;

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::parse(s).expect("valid")
    }

    fn page(final_score: i32) -> PageScore {
        PageScore {
            url: url("https://a.test/"),
            base: 100,
            penalty_total: final_score - 100,
            final_score,
            issues: Vec::new(),
        }
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        let pages = vec![page(100), page(85), page(85)];
        assert_eq!(average_score(&pages), 90.0);

        let pages = vec![page(100), page(90), page(90)];
        assert_eq!(average_score(&pages), 93.33);
    }

    #[test]
    fn average_of_empty_pages_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }
}
