//! Shapes the two top-level report trees (§4.7, §6) from a scored crawl.

use crate::aggregate::{all_issues, average_score, code_counts, code_groups, score_pages};
use crate::context::build_context;
use seo_crawler::CrawlOutcome;
use seo_types::{
    AuditIssues, AuditReport, AuditStats, Category, Crawlability, IssuesSummary, Severity,
    SiteOverview,
};

pub fn build_report(mut outcome: CrawlOutcome, execution_time: f64) -> AuditReport {
    outcome.records.sort_by(|a, b| a.url.as_str().cmp(b.url.as_str()));

    let ctx = build_context(&outcome);
    let pages = score_pages(&outcome.records, &ctx);

    let total_issues = all_issues(&pages).count();
    let severity_count = |s: Severity| all_issues(&pages).filter(|i| i.severity == s).count();

    let site_overview = SiteOverview {
        base_url: outcome.homepage_url.as_str().to_string(),
        total_crawled_pages: outcome.records.len(),
        average_seo_score: average_score(&pages),
        total_issues,
        critical_issues_count: severity_count(Severity::Critical),
        high_issues_count: severity_count(Severity::High),
        medium_issues_count: severity_count(Severity::Medium),
        low_issues_count: severity_count(Severity::Low),
    };

    let crawlability = Crawlability::from_robots(&ctx.robots, outcome.sitemaps_found.clone());

    let mut status_code_distribution = std::collections::BTreeMap::new();
    for record in &outcome.records {
        *status_code_distribution.entry(record.fetch.status_bucket()).or_insert(0) += 1;
    }

    let audit_stats = AuditStats {
        site_overview: Some(site_overview.clone()),
        crawlability: Some(crawlability.clone()),
        status_code_distribution,
        technical_seo: code_counts(&pages, Category::Technical),
        onpage_seo: code_counts(&pages, Category::Onpage),
    };

    let mut issues_summary = IssuesSummary::default();
    for issue in all_issues(&pages) {
        issues_summary.push(issue.clone());
    }

    let audit_issues = AuditIssues {
        site_overview: Some(site_overview),
        crawlability: Some(crawlability),
        issues_summary,
        technical_seo: code_groups(&pages, Category::Technical),
        onpage_seo: code_groups(&pages, Category::Onpage),
    };

    AuditReport {
        audit_stats,
        audit_issues,
        execution_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_types::{CanonicalUrl, CrawlRecord, FetchResult, PageFacts, RobotsInfo};

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::parse(s).expect("valid")
    }

    fn bare_fetch(final_url: &str, status: u16) -> FetchResult {
        FetchResult {
            final_url: url(final_url),
            status_code: Some(status),
            response_headers: Vec::new(),
            body: None,
            redirect_chain: Vec::new(),
            elapsed_ms: 1,
            body_truncated: false,
            error: None,
        }
    }

    #[test]
    fn every_page_score_is_within_the_clamped_range() {
        let mut facts = PageFacts::default();
        facts.meta_robots.insert("noindex".to_string());
        let record = CrawlRecord { url: url("https://a.test/"), fetch: bare_fetch("https://a.test/", 200), facts: Some(facts) };

        let outcome = CrawlOutcome {
            records: vec![record],
            base_host: "a.test".to_string(),
            homepage_url: url("https://a.test/"),
            robots: RobotsInfo::default(),
            sitemap_urls: Vec::new(),
            sitemaps_found: Vec::new(),
            llms_txt_exists: false,
        };

        let report = build_report(outcome, 0.5);
        let overview = report.audit_stats.site_overview.expect("present");
        assert!((20..=100).contains(&(overview.average_seo_score as i32)));
        assert_eq!(overview.critical_issues_count, 1);
    }

    #[test]
    fn total_crawled_pages_matches_distinct_records() {
        let records = vec![
            CrawlRecord { url: url("https://a.test/"), fetch: bare_fetch("https://a.test/", 200), facts: None },
            CrawlRecord { url: url("https://a.test/x"), fetch: bare_fetch("https://a.test/x", 404), facts: None },
        ];
        let outcome = CrawlOutcome {
            records,
            base_host: "a.test".to_string(),
            homepage_url: url("https://a.test/"),
            robots: RobotsInfo::default(),
            sitemap_urls: Vec::new(),
            sitemaps_found: Vec::new(),
            llms_txt_exists: false,
        };

        let report = build_report(outcome, 0.1);
        assert_eq!(report.audit_stats.site_overview.unwrap().total_crawled_pages, 2);
        assert_eq!(*report.audit_stats.status_code_distribution.get("404").unwrap(), 1);
    }
}
