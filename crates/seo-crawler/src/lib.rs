//! Coordinates discovery: seeds the frontier from the homepage and sitemap
//! URLs, pulls from the shared work queue with a bounded worker pool,
//! enforces the per-host rate limit and page budget, and returns every
//! `CrawlRecord` produced. Link-following only happens from HTML 2xx
//! records, restricted to pages on the seed's own host.

mod frontier;

use frontier::Frontier;
use seo_config::AuditConfig;
use seo_fetch::Fetcher;
use seo_html::parse as parse_html;
use seo_robots::RobotsResolver;
use seo_types::{CanonicalUrl, CrawlRecord, RobotsInfo};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

/// Everything discovered about a site during one crawl: the records
/// themselves, plus the robots/sitemap context [`seo_types::SiteContext`]
/// needs but which isn't itself derivable from the records.
pub struct CrawlOutcome {
    pub records: Vec<CrawlRecord>,
    pub base_host: String,
    pub homepage_url: CanonicalUrl,
    pub robots: RobotsInfo,
    pub sitemap_urls: Vec<CanonicalUrl>,
    pub sitemaps_found: Vec<String>,
    pub llms_txt_exists: bool,
}

pub struct Crawler {
    fetcher: Arc<Fetcher>,
    robots: Arc<RobotsResolver>,
    config: AuditConfig,
}

impl Crawler {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            fetcher: Arc::new(Fetcher::new(config)),
            robots: Arc::new(RobotsResolver::new(config)),
            config: config.clone(),
        }
    }

    #[instrument(skip(self), fields(seed = %seed, max_pages, respect_robots))]
    pub async fn crawl(&self, seed: CanonicalUrl, max_pages: u32, respect_robots: bool) -> CrawlOutcome {
        let base_host = seed.host().unwrap_or_default();
        let resolution = self.robots.resolve(&seed).await;
        let llms_txt_exists = self.probe_llms_txt(&seed).await;

        let frontier = Arc::new(Frontier::new(max_pages, self.config.global_deadline));
        frontier.push(seed.clone());
        for url in &resolution.sitemap_urls {
            if url.host().as_deref() == Some(base_host.as_str()) {
                frontier.push(url.clone());
            }
        }

        let records: Arc<Mutex<Vec<CrawlRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let robots_content = Arc::new(resolution.raw_robots().to_string());

        let mut workers = JoinSet::new();
        for _ in 0..self.config.max_concurrent_fetches.max(1) {
            let frontier = frontier.clone();
            let records = records.clone();
            let fetcher = self.fetcher.clone();
            let robots = self.robots.clone();
            let robots_content = robots_content.clone();
            let base_host = base_host.clone();

            workers.spawn(async move {
                while let Some(url) = frontier.pop().await {
                    if respect_robots && !robots.is_allowed(&robots_content, url.as_str()) {
                        debug!(url = %url, "skipped: disallowed by robots.txt");
                        frontier.complete();
                        continue;
                    }

                    if let Some(host) = url.host() {
                        robots.wait_for_rate_limit(&host).await;
                    }

                    let record = Self::fetch_one(&fetcher, &url).await;
                    debug!(
                        url = %record.url,
                        fetched_at = seo_utils::time::now_unix_millis(),
                        status = record.fetch.status_code,
                        "page fetched"
                    );

                    if record.is_html_ok() && record.url.host().as_deref() == Some(base_host.as_str()) {
                        if let Some(facts) = &record.facts {
                            for link in facts.internal_links() {
                                if link.href_absolute.host().as_deref() == Some(base_host.as_str()) {
                                    frontier.push(link.href_absolute.clone());
                                }
                            }
                        }
                    }

                    records.lock().unwrap().push(record);
                    frontier.complete();
                }
            });
        }

        while workers.join_next().await.is_some() {}

        let records = Arc::try_unwrap(records)
            .map(|m| m.into_inner().unwrap())
            .unwrap_or_default();

        CrawlOutcome {
            records,
            base_host,
            homepage_url: seed,
            robots: resolution.robots,
            sitemap_urls: resolution.sitemap_urls,
            sitemaps_found: resolution.sitemaps_found,
            llms_txt_exists,
        }
    }

    async fn fetch_one(fetcher: &Fetcher, url: &CanonicalUrl) -> CrawlRecord {
        let fetch = fetcher.fetch(url).await;
        let facts = if fetch.is_html() {
            fetch.body.as_ref().map(|body| {
                let x_robots = fetch
                    .header("x-robots-tag")
                    .map(|v| v.split(',').map(|t| t.trim().to_lowercase()).collect())
                    .unwrap_or_default();
                parse_html(body, &fetch.final_url, x_robots)
            })
        } else {
            None
        };

        CrawlRecord {
            url: url.clone(),
            fetch,
            facts,
        }
    }

    async fn probe_llms_txt(&self, seed: &CanonicalUrl) -> bool {
        let origin = format!("{}://{}", seed.scheme(), seed.host().unwrap_or_default());
        let Ok(llms_url) = CanonicalUrl::parse(&format!("{origin}/llms.txt")) else {
            return false;
        };
        self.fetcher.fetch(&llms_url).await.is_ok_status()
    }
}
