//! Reported-only rules (§4.5, "Reported-only (non-scored)" table). Each of
//! these carries `weight = 0`: they surface in the report's issue lists but
//! never move `final_score`. [`seo_types::Issue::is_scored`] is how the
//! report builder tells the two groups apart. This is a closed catalog —
//! the twelve codes below are exactly the ones the spec names.

use crate::common::issue;
use seo_types::{Category, CrawlRecord, Issue, Severity, SiteContext};

const URL_TOO_LONG_THRESHOLD: usize = 100;
const URL_TOO_DEEP_SEGMENTS: usize = 5;

pub fn reported_rules() -> Vec<fn(&CrawlRecord, &SiteContext) -> Vec<Issue>> {
    vec![
        urls_contain_underscore,
        urls_contain_uppercase,
        urls_too_long,
        urls_too_deep,
        urls_special_characters,
        missing_viewport,
        missing_cache_control,
        missing_content_compression,
        missing_robots_txt,
        no_sitemaps_found,
        missing_llms_txt,
        status_404,
    ]
}

fn reported(code: &'static str, url: &seo_types::CanonicalUrl, note: &str) -> Vec<Issue> {
    vec![issue(code, Category::Technical, Severity::Low, 0, url, note)]
}

fn urls_contain_underscore(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.url.path().contains('_') {
        reported("urls_contain_underscore", &record.url, "URL path contains an underscore")
    } else {
        Vec::new()
    }
}

fn urls_contain_uppercase(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let path = record.url.path();
    if path.chars().any(|c| c.is_ascii_uppercase()) {
        reported("urls_contain_uppercase", &record.url, "URL path contains uppercase characters")
    } else {
        Vec::new()
    }
}

fn urls_too_long(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.url.as_str().len() > URL_TOO_LONG_THRESHOLD {
        reported("urls_too_long", &record.url, "URL exceeds 100 characters")
    } else {
        Vec::new()
    }
}

fn urls_too_deep(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let segments = record.url.path().split('/').filter(|s| !s.is_empty()).count();
    if segments > URL_TOO_DEEP_SEGMENTS {
        reported("urls_too_deep", &record.url, "URL path is more than 5 segments deep")
    } else {
        Vec::new()
    }
}

fn urls_special_characters(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let path = record.url.path();
    let has_special = path
        .chars()
        .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '/')));
    if has_special {
        reported("urls_special_characters", &record.url, "URL path contains characters outside [a-z0-9-_./]")
    } else {
        Vec::new()
    }
}

fn missing_viewport(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if !facts.viewport_present {
        reported("missing_viewport", &record.url, "page has no viewport meta tag")
    } else {
        Vec::new()
    }
}

fn missing_cache_control(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.header("cache-control").is_none() {
        reported("missing_cache_control", &record.url, "response carries no Cache-Control header")
    } else {
        Vec::new()
    }
}

fn missing_content_compression(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.header("content-encoding").is_none() {
        reported("missing_content_compression", &record.url, "response is not compressed")
    } else {
        Vec::new()
    }
}

fn missing_robots_txt(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    if ctx.is_homepage(&record.url) && !ctx.robots.exists {
        reported("missing_robots_txt", &record.url, "site has no robots.txt")
    } else {
        Vec::new()
    }
}

fn no_sitemaps_found(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    if ctx.is_homepage(&record.url) && ctx.sitemap_urls.is_empty() {
        reported("no_sitemaps_found", &record.url, "no sitemap was discovered")
    } else {
        Vec::new()
    }
}

fn missing_llms_txt(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    if ctx.is_homepage(&record.url) && !ctx.llms_txt_exists {
        reported("missing_llms_txt", &record.url, "GET /llms.txt did not return 2xx")
    } else {
        Vec::new()
    }
}

fn status_404(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.status_code == Some(404) {
        reported("status_404", &record.url, "page returned 404")
    } else {
        Vec::new()
    }
}
