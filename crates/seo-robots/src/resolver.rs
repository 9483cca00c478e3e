use crate::robots::{is_allowed, parse_directives, RobotsDirectives, TokenBucket};
use crate::sitemap::SitemapExpander;
use dashmap::DashMap;
use seo_config::AuditConfig;
use seo_types::{CanonicalUrl, RobotsInfo};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Everything discovered about a site's crawl policy: robots.txt contents plus
/// the flattened set of sitemap-declared URLs.
pub struct Resolution {
    pub robots: RobotsInfo,
    pub sitemap_urls: Vec<CanonicalUrl>,
    pub sitemaps_found: Vec<String>,
    directives: RobotsDirectives,
}

impl Resolution {
    pub fn crawl_delay(&self) -> Option<f64> {
        self.directives.crawl_delay
    }

    pub fn raw_robots(&self) -> &str {
        &self.directives.raw
    }
}

/// Resolves robots.txt and sitemaps for a host, and exposes per-host rate
/// limiting built from the discovered (or default) crawl delay.
pub struct RobotsResolver {
    client: reqwest::Client,
    user_agent: String,
    default_rps: f64,
    rate_limiters: DashMap<String, Arc<TokenBucket>>,
}

impl RobotsResolver {
    pub fn new(config: &AuditConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            user_agent: config.user_agent.clone(),
            default_rps: config.per_host_rps,
            rate_limiters: DashMap::new(),
        }
    }

    #[instrument(skip(self), fields(base = %base))]
    pub async fn resolve(&self, base: &CanonicalUrl) -> Resolution {
        let origin = format!("{}://{}", base.scheme(), base.host().unwrap_or_default());
        let robots_url = format!("{origin}/robots.txt");

        let (exists, raw) = match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let text = resp.text().await.unwrap_or_default();
                (true, text)
            }
            _ => (false, String::new()),
        };

        let directives = parse_directives(&raw);

        if let Some(delay) = directives.crawl_delay {
            if let Some(host) = base.host() {
                let rps = (1.0 / delay).min(self.default_rps);
                self.rate_limiters.insert(host, Arc::new(TokenBucket::new(rps)));
            }
        }

        let sitemap_expander = SitemapExpander::new(self.client.clone());
        let mut candidate_sitemaps = directives.declared_sitemaps.clone();
        if exists {
            debug!(count = candidate_sitemaps.len(), "sitemaps declared in robots.txt");
        }
        let probed = sitemap_expander.probe_common_locations(&origin).await;
        for p in probed {
            if !candidate_sitemaps.contains(&p) {
                candidate_sitemaps.push(p);
            }
        }

        let sitemap_urls = sitemap_expander.expand_all(candidate_sitemaps.clone()).await;

        let robots = RobotsInfo {
            exists,
            raw_text: if exists { Some(raw) } else { None },
            declared_sitemaps: directives.declared_sitemaps.clone(),
            user_agent_rules: directives.user_agent_lines.clone(),
        };

        Resolution {
            robots,
            sitemap_urls,
            sitemaps_found: candidate_sitemaps,
            directives,
        }
    }

    /// Whether `url` may be crawled under `robots_content` for our user agent.
    pub fn is_allowed(&self, robots_content: &str, url: &str) -> bool {
        is_allowed(robots_content, &self.user_agent, url)
    }

    /// Cooperatively wait for a rate-limit token for `host`, creating a default
    /// bucket on first use.
    pub async fn wait_for_rate_limit(&self, host: &str) {
        let bucket = self
            .rate_limiters
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(TokenBucket::new(self.default_rps)))
            .clone();
        bucket.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn declared_sitemaps_excludes_probed_common_locations() {
        let server = MockServer::start().await;
        let declared = format!("{}/custom-sitemap.xml", server.uri());

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("User-agent: *\nSitemap: {declared}\n")))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        for other in ["/sitemap_index.xml", "/sitemap-index.xml", "/sitemaps.xml", "/wp-sitemap.xml"] {
            Mock::given(method("HEAD"))
                .and(path(other))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/custom-sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<urlset><url><loc>https://example.com/a</loc></url></urlset>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<urlset><url><loc>https://example.com/b</loc></url></urlset>"#,
            ))
            .mount(&server)
            .await;

        let resolver = RobotsResolver::new(&AuditConfig::default());
        let base = CanonicalUrl::parse(&server.uri()).expect("valid");
        let resolution = resolver.resolve(&base).await;

        assert_eq!(resolution.robots.declared_sitemaps, vec![declared.clone()]);
        assert!(resolution.sitemaps_found.contains(&declared));
        assert!(resolution.sitemaps_found.iter().any(|s| s.ends_with("/sitemap.xml")));
        assert_eq!(resolution.sitemaps_found.len(), 2);
    }
}
