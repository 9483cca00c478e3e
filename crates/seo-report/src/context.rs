//! Builds [`SiteContext`] from a finished crawl, in a single pass, as §4.4/§9
//! require: no duplicate or inbound-link bookkeeping happens during the
//! crawl itself.

use seo_crawler::CrawlOutcome;
use seo_types::{normalize_for_duplicate_check, CanonicalUrl, CrawlRecord, RobotsInfo, SiteContext};
use std::collections::{HashMap, HashSet};

pub fn build_context(outcome: &CrawlOutcome) -> SiteContext {
    SiteContext {
        base_host: outcome.base_host.clone(),
        homepage_url: outcome.homepage_url.clone(),
        duplicate_titles: duplicate_map(&outcome.records, |facts| facts.title.as_deref()),
        duplicate_descriptions: duplicate_map(&outcome.records, |facts| facts.meta_description.as_deref()),
        inbound_links: inbound_link_counts(&outcome.records),
        sitemap_urls: outcome.sitemap_urls.iter().cloned().collect(),
        robots: outcome.robots.clone(),
        status_by_url: outcome
            .records
            .iter()
            .map(|r| (r.url.clone(), r.fetch.status_bucket()))
            .collect(),
        llms_txt_exists: outcome.llms_txt_exists,
    }
}

/// Groups URLs by normalized field value, keeping only keys with more than
/// one distinct URL — a title/description that appears exactly once is not
/// a duplicate.
fn duplicate_map(
    records: &[CrawlRecord],
    field: impl Fn(&seo_types::PageFacts) -> Option<&str>,
) -> HashMap<String, HashSet<CanonicalUrl>> {
    let mut grouped: HashMap<String, HashSet<CanonicalUrl>> = HashMap::new();
    for record in records {
        let Some(facts) = &record.facts else { continue };
        let Some(value) = field(facts) else { continue };
        if value.trim().is_empty() {
            continue;
        }
        let key = normalize_for_duplicate_check(value);
        grouped.entry(key).or_default().insert(record.url.clone());
    }
    grouped.retain(|_, urls| urls.len() > 1);
    grouped
}

/// Count of distinct internal-linking source pages per target URL.
fn inbound_link_counts(records: &[CrawlRecord]) -> HashMap<CanonicalUrl, u32> {
    let mut sources: HashMap<CanonicalUrl, HashSet<CanonicalUrl>> = HashMap::new();
    for record in records {
        let Some(facts) = &record.facts else { continue };
        for link in facts.internal_links() {
            sources
                .entry(link.href_absolute.clone())
                .or_default()
                .insert(record.url.clone());
        }
    }
    sources.into_iter().map(|(url, srcs)| (url, srcs.len() as u32)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_crawler::CrawlOutcome;
    use seo_types::{FetchResult, Link, PageFacts};

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

    fn record_with_title(page_url: &str, title: &str) -> CrawlRecord {
        let mut facts = PageFacts::default();
        facts.title = Some(title.to_string());
        CrawlRecord { url: url(page_url), fetch: bare_fetch(page_url), facts: Some(facts) }
    }

    fn outcome(records: Vec<CrawlRecord>) -> CrawlOutcome {
        CrawlOutcome {
            records,
            base_host: "a.test".to_string(),
            homepage_url: url("https://a.test/"),
            robots: RobotsInfo::default(),
            sitemap_urls: Vec::new(),
            sitemaps_found: Vec::new(),
            llms_txt_exists: false,
        }
    }

    #[test]
    fn a_title_appearing_once_is_not_a_duplicate() {
        let ctx = build_context(&outcome(vec![record_with_title("https://a.test/", "Unique")]));
        assert!(ctx.duplicate_titles.is_empty());
    }

    #[test]
    fn a_title_repeated_across_pages_is_a_duplicate() {
        let ctx = build_context(&outcome(vec![
            record_with_title("https://a.test/a", "Home"),
            record_with_title("https://a.test/b", "home"),
            record_with_title("https://a.test/c", "  Home  "),
        ]));
        let (_, urls) = ctx.duplicate_titles.iter().next().expect("one group");
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn inbound_links_count_distinct_sources_only() {
        let mut home_facts = PageFacts::default();
        home_facts.links.push(Link {
            href_absolute: url("https://a.test/target"),
            anchor_text: "t".to_string(),
            rel_tokens: Vec::new(),
            is_internal: true,
            aria_label: None,
        });
        home_facts.links.push(Link {
            href_absolute: url("https://a.test/target"),
            anchor_text: "t again".to_string(),
            rel_tokens: Vec::new(),
            is_internal: true,
            aria_label: None,
        });
        let home = CrawlRecord { url: url("https://a.test/"), fetch: bare_fetch("https://a.test/"), facts: Some(home_facts) };

        let ctx = build_context(&outcome(vec![home]));
        assert_eq!(ctx.inbound_count(&url("https://a.test/target")), 1);
    }
}
