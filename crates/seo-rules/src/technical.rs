//! Technical SEO rules (§4.5, "Technical rules" table). Each function is a pure
//! `(&CrawlRecord, &SiteContext) -> Vec<Issue>` with no I/O and no dependency on
//! any other rule's output, evaluated in catalog order by [`crate::evaluate`].

use crate::common::{issue, issue_with_note};
use seo_types::{Category, CrawlRecord, Issue, Severity, SiteContext};

pub fn technical_rules() -> Vec<fn(&CrawlRecord, &SiteContext) -> Vec<Issue>> {
    vec![
        noindex_on_indexable,
        redirect_loop,
        not_https,
        canonical,
        server_error_5xx,
        redirect_chain_ends_404,
        mixed_content_js_css,
        meta_robots_conflict,
        redirect_chain_too_long,
        redirect_302,
        nofollow_directive,
        missing_structured_data,
        duplicate_structured_data,
    ]
}

fn noindex_on_indexable(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if facts.meta_robots.contains("noindex") || facts.x_robots.contains("noindex") {
        vec![issue_with_note(
            "noindex_on_indexable",
            Category::Technical,
            Severity::Critical,
            -15,
            &record.url,
            "page carries a noindex directive",
            "meta_robots or x_robots contains noindex",
        )]
    } else {
        Vec::new()
    }
}

fn redirect_loop(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.has_redirect_loop() {
        vec![issue_with_note(
            "redirect_loop",
            Category::Technical,
            Severity::Critical,
            -15,
            &record.url,
            "redirect chain revisits a URL already seen in the chain",
            format!("chain length {}", record.fetch.redirect_chain.len()),
        )]
    } else {
        Vec::new()
    }
}

fn not_https(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if !record.fetch.final_url.is_https() {
        vec![issue_with_note(
            "not_https",
            Category::Technical,
            Severity::Critical,
            -15,
            &record.url,
            "final URL is served over http, not https",
            record.fetch.final_url.scheme(),
        )]
    } else {
        Vec::new()
    }
}

/// `canonical_404`, `canonical_to_homepage`, and `canonical_different_url` are
/// mutually exclusive facets of the same observation (a page's declared
/// canonical), so one function decides between them in priority order rather
/// than risking two of the three firing together.
fn canonical(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(canonical) = &facts.canonical else { return Vec::new() };

    if ctx.status_of(canonical) == Some("404") {
        return vec![issue_with_note(
            "canonical_404",
            Category::Technical,
            Severity::High,
            -12,
            &record.url,
            "canonical URL resolves to a 404",
            canonical.as_str(),
        )];
    }

    if *canonical == ctx.homepage_url && record.url != ctx.homepage_url {
        return vec![issue_with_note(
            "canonical_to_homepage",
            Category::Technical,
            Severity::High,
            -12,
            &record.url,
            "canonical points at the homepage instead of this page",
            canonical.as_str(),
        )];
    }

    if *canonical != record.url {
        return vec![issue_with_note(
            "canonical_different_url",
            Category::Technical,
            Severity::Medium,
            -6,
            &record.url,
            "canonical URL differs from the crawled URL",
            canonical.as_str(),
        )];
    }

    Vec::new()
}

fn server_error_5xx(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    match record.fetch.status_code {
        Some(code) if (500..600).contains(&code) => vec![issue_with_note(
            "server_error_5xx",
            Category::Technical,
            Severity::High,
            -12,
            &record.url,
            "server responded with a 5xx status",
            code.to_string(),
        )],
        _ => Vec::new(),
    }
}

fn redirect_chain_ends_404(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if !record.fetch.redirect_chain.is_empty() && record.fetch.status_code == Some(404) {
        vec![issue(
            "redirect_chain_ends_404",
            Category::Technical,
            Severity::High,
            -12,
            &record.url,
            "redirect chain terminates in a 404",
        )]
    } else {
        Vec::new()
    }
}

fn mixed_content_js_css(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if facts.https && !facts.mixed_content.is_empty() {
        vec![issue_with_note(
            "mixed_content_js_css",
            Category::Technical,
            Severity::High,
            -10,
            &record.url,
            "https page loads non-https subresources",
            format!("{} insecure subresource(s)", facts.mixed_content.len()),
        )]
    } else {
        Vec::new()
    }
}

fn meta_robots_conflict(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let conflict = (facts.meta_robots.contains("noindex") && facts.x_robots.contains("index"))
        || (facts.meta_robots.contains("index") && facts.x_robots.contains("noindex"));
    if conflict {
        vec![issue(
            "meta_robots_conflict",
            Category::Technical,
            Severity::Medium,
            -6,
            &record.url,
            "meta robots and X-Robots-Tag disagree on index/noindex",
        )]
    } else {
        Vec::new()
    }
}

fn redirect_chain_too_long(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.redirect_chain.len() > 3 {
        vec![issue_with_note(
            "redirect_chain_too_long",
            Category::Technical,
            Severity::Medium,
            -6,
            &record.url,
            "redirect chain is longer than 3 hops",
            format!("chain length {}", record.fetch.redirect_chain.len()),
        )]
    } else {
        Vec::new()
    }
}

fn redirect_302(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    if record.fetch.redirect_chain.iter().any(|hop| hop.status == 302) {
        vec![issue(
            "redirect_302",
            Category::Technical,
            Severity::Medium,
            -4,
            &record.url,
            "redirect chain uses a temporary (302) redirect",
        )]
    } else {
        Vec::new()
    }
}

fn nofollow_directive(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if facts.meta_robots.contains("nofollow") || facts.x_robots.contains("nofollow") {
        vec![issue(
            "nofollow_directive",
            Category::Technical,
            Severity::Low,
            -3,
            &record.url,
            "page carries a nofollow directive",
        )]
    } else {
        Vec::new()
    }
}

fn missing_structured_data(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if facts.structured_data.is_empty() && record.fetch.is_ok_status() {
        vec![issue(
            "missing_structured_data",
            Category::Technical,
            Severity::Low,
            -2,
            &record.url,
            "no structured data found on the page",
        )]
    } else {
        Vec::new()
    }
}

fn duplicate_structured_data(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    if facts.structured_data_type_counts().values().any(|&count| count > 1) {
        vec![issue(
            "duplicate_structured_data",
            Category::Technical,
            Severity::Low,
            -2,
            &record.url,
            "the same structured data type appears more than once on the page",
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seo_types::{CanonicalUrl, FetchErrorKind, FetchResult, PageFacts, RedirectHop};
    use std::collections::HashMap;

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

    fn html_record(page_url: &str, facts: PageFacts) -> CrawlRecord {
        CrawlRecord {
            url: url(page_url),
            fetch: bare_fetch(page_url, 200),
            facts: Some(facts),
        }
    }

    fn empty_ctx(homepage: &str) -> SiteContext {
        SiteContext {
            base_host: url(homepage).host().unwrap(),
            homepage_url: url(homepage),
            duplicate_titles: HashMap::new(),
            duplicate_descriptions: HashMap::new(),
            inbound_links: HashMap::new(),
            sitemap_urls: Default::default(),
            robots: Default::default(),
            status_by_url: HashMap::new(),
            llms_txt_exists: false,
        }
    }

    #[test]
    fn flags_noindex_from_meta_robots() {
        let mut facts = PageFacts::default();
        facts.meta_robots.insert("noindex".to_string());
        let record = html_record("https://a.test/", facts);
        let ctx = empty_ctx("https://a.test/");
        let issues = noindex_on_indexable(&record, &ctx);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "noindex_on_indexable");
        assert_eq!(issues[0].weight, -15);
    }

    #[test]
    fn detects_redirect_loop_from_chain() {
        let mut fetch = bare_fetch("https://c.test/a", 302);
        fetch.redirect_chain = vec![
            RedirectHop { url: url("https://c.test/a"), status: 302 },
            RedirectHop { url: url("https://c.test/b"), status: 302 },
            RedirectHop { url: url("https://c.test/a"), status: 302 },
        ];
        fetch.error = Some(FetchErrorKind::Loop);
        let record = CrawlRecord { url: url("https://c.test/a"), fetch, facts: None };
        let ctx = empty_ctx("https://c.test/");
        let issues = redirect_loop(&record, &ctx);
        assert_eq!(issues[0].code, "redirect_loop");
    }

    #[test]
    fn flags_http_homepage_as_not_https() {
        let record = CrawlRecord {
            url: url("http://b.test/"),
            fetch: bare_fetch("http://b.test/", 200),
            facts: None,
        };
        let ctx = empty_ctx("http://b.test/");
        assert_eq!(not_https(&record, &ctx)[0].code, "not_https");
    }

    #[test]
    fn canonical_to_homepage_takes_priority_over_generic_mismatch() {
        let mut facts = PageFacts::default();
        facts.canonical = Some(url("https://a.test/"));
        let record = html_record("https://a.test/blog", facts);
        let ctx = empty_ctx("https://a.test/");
        let issues = canonical(&record, &ctx);
        assert_eq!(issues[0].code, "canonical_to_homepage");
    }

    #[test]
    fn redirect_chain_too_long_boundary() {
        let mut fetch = bare_fetch("https://a.test/", 200);
        fetch.redirect_chain = vec![
            RedirectHop { url: url("https://a.test/1"), status: 301 },
            RedirectHop { url: url("https://a.test/2"), status: 301 },
            RedirectHop { url: url("https://a.test/3"), status: 301 },
        ];
        let record = CrawlRecord { url: url("https://a.test/"), fetch, facts: None };
        let ctx = empty_ctx("https://a.test/");
        assert!(redirect_chain_too_long(&record, &ctx).is_empty());

        let mut fetch4 = bare_fetch("https://a.test/", 200);
        fetch4.redirect_chain = vec![
            RedirectHop { url: url("https://a.test/1"), status: 301 },
            RedirectHop { url: url("https://a.test/2"), status: 301 },
            RedirectHop { url: url("https://a.test/3"), status: 301 },
            RedirectHop { url: url("https://a.test/4"), status: 301 },
        ];
        let record4 = CrawlRecord { url: url("https://a.test/"), fetch: fetch4, facts: None };
        assert_eq!(redirect_chain_too_long(&record4, &ctx).len(), 1);
    }
}
