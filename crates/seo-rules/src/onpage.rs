//! On-page SEO rules (§4.5, "On-page rules" table).

use crate::common::{issue, issue_with_note};
use seo_types::{Category, CrawlRecord, Issue, Severity, SiteContext};

const TITLE_TEMPLATE_DEFAULTS: &[&str] = &["home", "page", "untitled", "new page"];

pub fn onpage_rules() -> Vec<fn(&CrawlRecord, &SiteContext) -> Vec<Issue>> {
    vec![
        missing_or_empty_title,
        missing_or_empty_meta_description,
        heading_rules,
        orphan_page,
        title_length,
        duplicate_title,
        images_missing_alt,
        broken_internal_links,
        meta_description_length,
        title_template_default,
        images_empty_alt,
        duplicate_description,
        excessive_internal_links,
        link_anomalies,
        h1_identical_to_title,
    ]
}

/// `missing_title` and `title_empty` both describe "there is effectively no
/// title"; one function, since a page can only be in one of those states.
fn missing_or_empty_title(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    match &facts.title {
        None => vec![issue(
            "missing_title",
            Category::Onpage,
            Severity::High,
            -8,
            &record.url,
            "page has no <title> tag",
        )],
        Some(title) if title.trim().is_empty() => vec![issue(
            "title_empty",
            Category::Onpage,
            Severity::High,
            -8,
            &record.url,
            "page has a <title> tag with no text",
        )],
        Some(_) => Vec::new(),
    }
}

fn missing_or_empty_meta_description(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    match &facts.meta_description {
        None => vec![issue(
            "missing_meta_description",
            Category::Onpage,
            Severity::High,
            -6,
            &record.url,
            "page has no meta description",
        )],
        Some(desc) if desc.trim().is_empty() => vec![issue(
            "meta_description_empty",
            Category::Onpage,
            Severity::High,
            -6,
            &record.url,
            "meta description is present but empty",
        )],
        Some(_) => Vec::new(),
    }
}

/// `no_h1`, `multiple_h1`, and `h1_other` are mutually exclusive facets of the
/// page's H1 usage, so one function picks between them.
fn heading_rules(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let count = facts.headings.h1_count();

    if count == 0 {
        return vec![issue(
            "no_h1",
            Category::Onpage,
            Severity::High,
            -6,
            &record.url,
            "page has no H1 heading",
        )];
    }

    if count > 1 {
        return vec![issue_with_note(
            "multiple_h1",
            Category::Onpage,
            Severity::Medium,
            -4,
            &record.url,
            "page has more than one H1 heading",
            format!("{count} H1 headings"),
        )];
    }

    if facts.headings.h1_texts.iter().any(|t| t.trim().is_empty()) {
        return vec![issue(
            "h1_other",
            Category::Onpage,
            Severity::Medium,
            -3,
            &record.url,
            "page's H1 heading has no text content",
        )];
    }

    Vec::new()
}

fn orphan_page(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    if ctx.sitemap_urls.contains(&record.url)
        && ctx.inbound_count(&record.url) == 0
        && record.url != ctx.homepage_url
    {
        vec![issue(
            "orphan_page",
            Category::Onpage,
            Severity::High,
            -6,
            &record.url,
            "page is listed in the sitemap but has no internal inbound links",
        )]
    } else {
        Vec::new()
    }
}

/// `title_too_short` and `title_too_long` are mutually exclusive length facets.
fn title_length(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(title) = &facts.title else { return Vec::new() };
    let len = title.trim().chars().count();

    if len > 0 && len < 30 {
        vec![issue_with_note(
            "title_too_short",
            Category::Onpage,
            Severity::Medium,
            -4,
            &record.url,
            "title is shorter than the recommended 30 characters",
            format!("title length {len}"),
        )]
    } else if len > 70 {
        vec![issue_with_note(
            "title_too_long",
            Category::Onpage,
            Severity::Medium,
            -4,
            &record.url,
            "title is longer than the recommended 70 characters",
            format!("title length {len}"),
        )]
    } else {
        Vec::new()
    }
}

fn duplicate_title(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(title) = &facts.title else { return Vec::new() };
    let key = seo_types::normalize_for_duplicate_check(title);
    if ctx.duplicate_titles.contains_key(&key) {
        vec![issue(
            "duplicate_title",
            Category::Onpage,
            Severity::Medium,
            -4,
            &record.url,
            "title duplicates another crawled page's title",
        )]
    } else {
        Vec::new()
    }
}

const MAX_IMAGES_MISSING_ALT: usize = 3;
const MAX_IMAGES_EMPTY_ALT: usize = 2;
/// `src` can be a data: URI running to megabytes; keep the note readable.
const MAX_SRC_NOTE_CHARS: usize = 120;

fn images_missing_alt(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    facts
        .images
        .iter()
        .filter(|img| !img.is_svg && img.alt.is_none())
        .take(MAX_IMAGES_MISSING_ALT)
        .map(|img| {
            issue_with_note(
                "images_missing_alt",
                Category::Onpage,
                Severity::Medium,
                -4,
                &record.url,
                "image has no alt attribute",
                seo_utils::text::truncate_for_report(&img.src, MAX_SRC_NOTE_CHARS),
            )
        })
        .collect()
}

fn images_empty_alt(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    facts
        .images
        .iter()
        .filter(|img| !img.is_svg && img.alt.as_deref() == Some(""))
        .take(MAX_IMAGES_EMPTY_ALT)
        .map(|img| {
            issue_with_note(
                "images_empty_alt",
                Category::Onpage,
                Severity::Low,
                -2,
                &record.url,
                "image has an empty alt attribute",
                seo_utils::text::truncate_for_report(&img.src, MAX_SRC_NOTE_CHARS),
            )
        })
        .collect()
}

fn broken_internal_links(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let has_broken = facts.internal_links().any(|link| {
        ctx.status_of(&link.href_absolute)
            .and_then(|s| s.parse::<u16>().ok())
            .is_some_and(|code| code >= 400)
    });
    if has_broken {
        vec![issue(
            "broken_internal_links",
            Category::Onpage,
            Severity::Medium,
            -4,
            &record.url,
            "page links to an internal URL that returned an error status",
        )]
    } else {
        Vec::new()
    }
}

fn meta_description_length(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(desc) = &facts.meta_description else { return Vec::new() };
    let len = desc.trim().chars().count();

    if len > 0 && len < 120 {
        vec![issue_with_note(
            "meta_description_too_short",
            Category::Onpage,
            Severity::Medium,
            -3,
            &record.url,
            "meta description is shorter than the recommended 120 characters",
            format!("description length {len}"),
        )]
    } else if len > 160 {
        vec![issue_with_note(
            "meta_description_too_long",
            Category::Onpage,
            Severity::Medium,
            -3,
            &record.url,
            "meta description is longer than the recommended 160 characters",
            format!("description length {len}"),
        )]
    } else {
        Vec::new()
    }
}

fn title_template_default(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(title) = &facts.title else { return Vec::new() };
    let trimmed = title.trim();
    let lowered = trimmed.to_lowercase();
    if TITLE_TEMPLATE_DEFAULTS.contains(&lowered.as_str()) && trimmed.chars().count() < 20 {
        vec![issue(
            "title_template_default",
            Category::Onpage,
            Severity::Low,
            -3,
            &record.url,
            "title looks like an unedited template placeholder",
        )]
    } else {
        Vec::new()
    }
}

fn duplicate_description(record: &CrawlRecord, ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(desc) = &facts.meta_description else { return Vec::new() };
    let key = seo_types::normalize_for_duplicate_check(desc);
    if ctx.duplicate_descriptions.contains_key(&key) {
        vec![issue(
            "duplicate_description",
            Category::Onpage,
            Severity::Low,
            -2,
            &record.url,
            "meta description duplicates another crawled page's description",
        )]
    } else {
        Vec::new()
    }
}

fn excessive_internal_links(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let count = facts.internal_links().count();
    if count > 100 {
        vec![issue_with_note(
            "excessive_internal_links",
            Category::Onpage,
            Severity::Low,
            -2,
            &record.url,
            "page has an unusually large number of internal links",
            format!("{count} internal links"),
        )]
    } else {
        Vec::new()
    }
}

/// `link_without_anchor_text` and `internal_links_other` are distinct link
/// anomalies that can coexist, so both are evaluated (unlike the mutually
/// exclusive groups above) and results are concatenated.
fn link_anomalies(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };

    let mut issues = Vec::new();

    let has_empty_anchor = facts
        .links
        .iter()
        .any(|link| link.anchor_text.trim().is_empty() && link.aria_label.is_none());
    if has_empty_anchor {
        issues.push(issue(
            "link_without_anchor_text",
            Category::Onpage,
            Severity::Low,
            -2,
            &record.url,
            "link has no anchor text and no aria-label",
        ));
    }

    let has_raw_url_anchor = facts
        .internal_links()
        .any(|link| link.anchor_text.trim() == link.href_absolute.as_str());
    if has_raw_url_anchor {
        issues.push(issue(
            "internal_links_other",
            Category::Onpage,
            Severity::Low,
            -2,
            &record.url,
            "internal link uses its raw URL as anchor text",
        ));
    }

    issues
}

/// Single H1 whose text matches the page title exactly (case-insensitive,
/// trimmed): `h1_identical_to_title`. Kept separate since it composes with the
/// heading-anomaly group rather than replacing it.
pub fn h1_identical_to_title(record: &CrawlRecord, _ctx: &SiteContext) -> Vec<Issue> {
    let Some(facts) = &record.facts else { return Vec::new() };
    let Some(title) = &facts.title else { return Vec::new() };
    if facts.headings.h1_count() != 1 {
        return Vec::new();
    }
    let h1 = facts.headings.h1_texts[0].trim().to_lowercase();
    if h1 == title.trim().to_lowercase() {
        vec![issue(
            "h1_identical_to_title",
            Category::Onpage,
            Severity::Low,
            -2,
            &record.url,
            "H1 text is identical to the page title",
        )]
    } else {
        Vec::new()
    }
}
