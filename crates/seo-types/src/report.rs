use crate::context::RobotsInfo;
use crate::issue::{Issue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteOverview {
    pub base_url: String,
    pub total_crawled_pages: usize,
    pub average_seo_score: f64,
    pub total_issues: usize,
    pub critical_issues_count: usize,
    pub high_issues_count: usize,
    pub medium_issues_count: usize,
    pub low_issues_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crawlability {
    pub robots_txt_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_txt_content: Option<String>,
    pub sitemap_exists: bool,
    pub sitemaps_found: Vec<String>,
}

impl Crawlability {
    pub fn from_robots(robots: &RobotsInfo, sitemaps_found: Vec<String>) -> Self {
        Self {
            robots_txt_exists: robots.exists,
            robots_txt_content: robots.raw_text.clone(),
            sitemap_exists: !sitemaps_found.is_empty(),
            sitemaps_found,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditStats {
    pub site_overview: Option<SiteOverview>,
    pub crawlability: Option<Crawlability>,
    pub status_code_distribution: BTreeMap<String, usize>,
    pub technical_seo: BTreeMap<String, usize>,
    pub onpage_seo: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuesSummary {
    pub critical: Vec<Issue>,
    pub high: Vec<Issue>,
    pub medium: Vec<Issue>,
    pub low: Vec<Issue>,
}

impl IssuesSummary {
    pub fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Critical => self.critical.push(issue),
            Severity::High => self.high.push(issue),
            Severity::Medium => self.medium.push(issue),
            Severity::Low => self.low.push(issue),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditIssues {
    pub site_overview: Option<SiteOverview>,
    pub crawlability: Option<Crawlability>,
    pub issues_summary: IssuesSummary,
    pub technical_seo: BTreeMap<String, Vec<Issue>>,
    pub onpage_seo: BTreeMap<String, Vec<Issue>>,
}

/// The full report handed back by `audit()`: two differently-shaped views over
/// the same underlying issue set, plus wall-clock execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub audit_stats: AuditStats,
    pub audit_issues: AuditIssues,
    pub execution_time: f64,
}
