//! The core's single entry point: validates input, runs the crawl, builds
//! site context, scores every page, and shapes the final report (§6).

mod aggregate;
mod context;
mod report;

pub use context::build_context;
pub use report::build_report;

use seo_config::AuditConfig;
use seo_crawler::Crawler;
use seo_types::{AuditError, AuditReport, AuditResult, CanonicalUrl};
use std::time::Instant;
use tracing::instrument;

/// `audit(url, max_pages?, respect_robots?) -> AuditReport` (§6). Fails only
/// on input validation; once the crawl begins, per-page errors are captured
/// as data rather than propagated.
#[instrument(skip(config), fields(url))]
pub async fn audit(
    url: &str,
    max_pages: Option<u32>,
    respect_robots: bool,
    config: &AuditConfig,
) -> AuditResult<AuditReport> {
    let seed = CanonicalUrl::parse(url)?;

    let max_pages = match max_pages {
        Some(0) => return Err(AuditError::invalid_max_pages(0)),
        Some(n) => n,
        None => config.default_max_pages,
    };

    let start = Instant::now();
    let crawler = Crawler::new(config);
    let outcome = crawler.crawl(seed, max_pages, respect_robots).await;
    let execution_time = start.elapsed().as_secs_f64();

    Ok(build_report(outcome, execution_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn rejects_a_malformed_url() {
        let config = AuditConfig::default();
        let err = audit("not a url", None, false, &config).await.unwrap_err();
        assert!(matches!(err, AuditError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn rejects_a_zero_page_budget() {
        let config = AuditConfig::default();
        let err = audit("https://a.test/", Some(0), false, &config).await.unwrap_err();
        assert!(matches!(err, AuditError::InvalidMaxPages { .. }));
    }

    #[tokio::test]
    async fn audits_a_single_clean_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/robots.txt")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
        Mock::given(method("GET")).and(path("/llms.txt")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(
                        r#"<html><head><title>Welcome to A Great Testing Site</title>
                        <meta name="description" content="A description that comfortably clears the recommended minimum length of one hundred twenty characters for SEO purposes today."></head>
                        <body><h1>Welcome</h1><img src="a.png" alt="a"></body></html>"#,
                    ),
            )
            .mount(&server)
            .await;

        let config = AuditConfig { per_host_rps: 100.0, ..AuditConfig::default() };
        let report = audit(&server.uri(), None, false, &config).await.expect("valid audit");

        assert_eq!(report.audit_stats.site_overview.unwrap().total_crawled_pages, 1);
    }
}
