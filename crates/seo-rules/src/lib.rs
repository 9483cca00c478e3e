//! The closed catalog of SEO rules (§4.5): technical, on-page, and
//! reported-only. Every rule is a pure `fn(&CrawlRecord, &SiteContext) ->
//! Vec<Issue>` — no I/O, no shared mutable state, no dependency on any other
//! rule's output — so the whole catalog can be evaluated in a fixed order
//! with a single pass over each crawled page.

mod common;
mod onpage;
mod reported;
mod technical;

use seo_types::{CrawlRecord, Issue, SiteContext};

pub use onpage::onpage_rules;
pub use reported::reported_rules;
pub use technical::technical_rules;

/// All catalog rules, technical first, then on-page, then reported-only,
/// matching the order §4.5 lists them in. The order only affects issue
/// ordering for ties in the report builder's (severity, code) sort, so it is
/// not itself load-bearing, but keeping it fixed keeps output deterministic
/// across runs without a rebuild.
fn all_rules() -> Vec<fn(&CrawlRecord, &SiteContext) -> Vec<Issue>> {
    let mut rules = technical_rules();
    rules.extend(onpage_rules());
    rules.extend(reported_rules());
    rules
}

/// Evaluate every catalog rule against a single crawled page, returning every
/// issue it produced across the whole catalog.
pub fn evaluate(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    all_rules().iter().flat_map(|rule| rule(record, ctx)).collect()
}

/// Evaluate the catalog across every crawled page, in `records` order.
/// Callers that need deterministic output re-sort the result themselves
/// (§7's "issues sorted by severity then code" applies per-page, at report
/// build time, not here).
pub fn evaluate_all(records: &[CrawlRecord], ctx: &SiteContext) -> Vec<Issue> {
    records.iter().flat_map(|record| evaluate(record, ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_types::{CanonicalUrl, FetchResult, PageFacts, RobotsInfo};
    use std::collections::HashMap;

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::parse(s).expect("valid")
    }

    fn bare_fetch(final_url: &str) -> FetchResult {
        FetchResult {
            final_url: url(final_url),
            status_code: Some(200),
            response_headers: Vec::new(),
            body: None,
            redirect_chain: Vec::new(),
            elapsed_ms: 1,
            body_truncated: false,
            error: None,
        }
    }

    fn ctx(homepage: &str) -> SiteContext {
        SiteContext {
            base_host: url(homepage).host().unwrap(),
            homepage_url: url(homepage),
            duplicate_titles: HashMap::new(),
            duplicate_descriptions: HashMap::new(),
            inbound_links: HashMap::new(),
            sitemap_urls: Default::default(),
            robots: RobotsInfo::default(),
            status_by_url: HashMap::new(),
            llms_txt_exists: true,
        }
    }

    #[test]
    fn a_healthy_homepage_collects_only_reported_only_issues() {
        let mut facts = PageFacts::default();
        facts.title = Some("A perfectly reasonable page title here".to_string());
        facts.meta_description =
            Some("A meta description that comfortably clears the minimum recommended length of one-twenty.".to_string());
        facts.headings.counts[0] = 1;
        facts.headings.h1_texts = vec!["Something else entirely".to_string()];
        facts.viewport_present = true;
        facts.lang_attr = Some("en".to_string());
        facts.charset = Some("utf-8".to_string());

        let record = CrawlRecord { url: url("https://a.test/"), fetch: bare_fetch("https://a.test/"), facts: Some(facts) };
        let c = ctx("https://a.test/");

        let issues = evaluate(&record, &c);
        assert!(issues.iter().all(|i| !i.is_scored()));
    }

    #[test]
    fn evaluate_all_concatenates_per_page_results() {
        let c = ctx("https://a.test/");
        let home = CrawlRecord { url: url("https://a.test/"), fetch: bare_fetch("https://a.test/"), facts: None };
        let other = CrawlRecord { url: url("https://a.test/x"), fetch: bare_fetch("https://a.test/x"), facts: None };
        let records = vec![home.clone(), other.clone()];

        let combined = evaluate_all(&records, &c);
        let separate: Vec<_> =
            evaluate(&home, &c).into_iter().chain(evaluate(&other, &c)).collect();
        assert_eq!(combined.len(), separate.len());
    }
}
