use crate::canon::CanonicalUrl;
use crate::facts::PageFacts;
use crate::fetch::FetchResult;
use serde::{Deserialize, Serialize};

/// Result of crawling one URL: always has a fetch outcome, only has facts when
/// the response was HTML. Created once by the crawler and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub url: CanonicalUrl,
    pub fetch: FetchResult,
    pub facts: Option<PageFacts>,
}

impl CrawlRecord {
    pub fn is_html_ok(&self) -> bool {
        self.facts.is_some() && self.fetch.is_ok_status()
    }
}
