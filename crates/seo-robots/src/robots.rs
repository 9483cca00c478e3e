use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use robotstxt::DefaultMatcher;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

const MAX_CRAWL_DELAY_SECS: f64 = 10.0;

/// Parsed view of a robots.txt document: the directive lines applying to our
/// user agent (for display/reporting) and declared sitemap URLs. Disallow/Allow
/// matching itself is delegated to [`is_allowed`] rather than re-implemented here.
#[derive(Debug, Clone, Default)]
pub struct RobotsDirectives {
    pub raw: String,
    pub declared_sitemaps: Vec<String>,
    pub crawl_delay: Option<f64>,
    pub user_agent_lines: Vec<String>,
}

/// Parse `Sitemap:`, `Crawl-delay:`, and the `User-agent`/`Disallow`/`Allow` block
/// out of a robots.txt document. Case-insensitive per RFC 9309.
pub fn parse_directives(content: &str) -> RobotsDirectives {
    let mut declared_sitemaps = Vec::new();
    let mut crawl_delay = None;
    let mut user_agent_lines = Vec::new();
    let mut in_relevant_block = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(value) = strip_directive(trimmed, "sitemap:") {
            if let Ok(url) = url::Url::parse(value.trim()) {
                if url.scheme() == "http" || url.scheme() == "https" {
                    declared_sitemaps.push(value.trim().to_string());
                }
            }
            continue;
        }

        if let Some(value) = strip_directive(trimmed, "user-agent:") {
            in_relevant_block = value.trim() == "*";
            continue;
        }

        if in_relevant_block {
            if let Some(value) = strip_directive(trimmed, "crawl-delay:") {
                if let Ok(delay) = value.trim().parse::<f64>() {
                    crawl_delay = Some(delay.max(0.1).min(MAX_CRAWL_DELAY_SECS));
                }
                continue;
            }
            if trimmed.to_lowercase().starts_with("disallow:") || trimmed.to_lowercase().starts_with("allow:") {
                user_agent_lines.push(trimmed.to_string());
            }
        }
    }

    RobotsDirectives {
        raw: content.to_string(),
        declared_sitemaps,
        crawl_delay,
        user_agent_lines,
    }
}

fn strip_directive<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    let lower = line.to_lowercase();
    if lower.starts_with(directive) {
        Some(&line[directive.len()..])
    } else {
        None
    }
}

/// Whether `url` is allowed for `user_agent` under the given robots.txt text.
pub fn is_allowed(robots_content: &str, user_agent: &str, url: &str) -> bool {
    let mut matcher = DefaultMatcher::default();
    matcher.one_agent_allowed_by_robots(robots_content, user_agent, url)
}

/// Per-host rate limiter keyed by host, shared via a concurrent map in
/// [`crate::resolver::RobotsResolver`]. Cooperative wait at dequeue time, the way
/// the crawler's frontier is expected to throttle itself.
pub struct TokenBucket {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl TokenBucket {
    /// `rps` may be fractional (derived from a robots.txt `Crawl-delay`), so the
    /// quota is built from its period rather than `Quota::per_second`'s integer rate.
    pub fn new(rps: f64) -> Self {
        let period = Duration::from_secs_f64(1.0 / rps.max(0.01));
        let quota = Quota::with_period(period).unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).unwrap()));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Block cooperatively until a token is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
        debug!("rate limit permit acquired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sitemap_and_crawl_delay_directives() {
        let content = "User-agent: *\nCrawl-delay: 3\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml\n";
        let parsed = parse_directives(content);
        assert_eq!(parsed.crawl_delay, Some(3.0));
        assert_eq!(parsed.declared_sitemaps, vec!["https://example.com/sitemap.xml"]);
        assert_eq!(parsed.user_agent_lines, vec!["Disallow: /admin"]);
    }

    #[test]
    fn clamps_excessive_crawl_delay() {
        let parsed = parse_directives("User-agent: *\nCrawl-delay: 500\n");
        assert_eq!(parsed.crawl_delay, Some(MAX_CRAWL_DELAY_SECS));
    }

    #[test]
    fn disallow_blocks_matching_path() {
        let content = "User-agent: *\nDisallow: /private\n";
        assert!(!is_allowed(content, "SeoAuditBot", "https://example.com/private/page"));
        assert!(is_allowed(content, "SeoAuditBot", "https://example.com/public"));
    }

    #[tokio::test]
    async fn token_bucket_grants_then_waits_for_refill() {
        let bucket = TokenBucket::new(1000.0);
        let start = std::time::Instant::now();
        bucket.wait().await;
        bucket.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
