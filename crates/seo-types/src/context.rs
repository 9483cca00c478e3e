use crate::canon::CanonicalUrl;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotsInfo {
    pub exists: bool,
    pub raw_text: Option<String>,
    pub declared_sitemaps: Vec<String>,
    /// Disallow/Allow rule lines applying to the auditor's user agent, verbatim,
    /// kept only for reporting; matching itself is delegated to a robots.txt matcher.
    pub user_agent_rules: Vec<String>,
}

/// Site-wide context computed once, after the crawl completes, and never mutated
/// afterward. The rule engine is a pure function of (CrawlRecord, SiteContext).
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub base_host: String,
    pub homepage_url: CanonicalUrl,
    pub duplicate_titles: HashMap<String, HashSet<CanonicalUrl>>,
    pub duplicate_descriptions: HashMap<String, HashSet<CanonicalUrl>>,
    pub inbound_links: HashMap<CanonicalUrl, u32>,
    pub sitemap_urls: HashSet<CanonicalUrl>,
    pub robots: RobotsInfo,
    /// status code (or pseudo-status) per crawled URL, for `canonical_404` /
    /// `broken_internal_links` lookups without re-scanning every record.
    pub status_by_url: HashMap<CanonicalUrl, String>,
    /// Whether a GET of `/llms.txt` against the base host returned 2xx.
    pub llms_txt_exists: bool,
}

impl SiteContext {
    pub fn inbound_count(&self, url: &CanonicalUrl) -> u32 {
        self.inbound_links.get(url).copied().unwrap_or(0)
    }

    pub fn is_homepage(&self, url: &CanonicalUrl) -> bool {
        *url == self.homepage_url
    }

    pub fn status_of(&self, url: &CanonicalUrl) -> Option<&str> {
        self.status_by_url.get(url).map(|s| s.as_str())
    }
}

/// Case-insensitive, whitespace-collapsed normalization used for duplicate-title
/// and duplicate-description comparison.
pub fn normalize_for_duplicate_check(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
