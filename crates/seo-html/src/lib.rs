//! Turns an HTML body into [`PageFacts`]. Extraction is lenient by design:
//! malformed markup yields best-effort facts, never a parse failure, matching
//! this workspace's native-parser extractors (one `Selector` per concern,
//! `.ok()?`-chained lookups) but narrowed to the single deterministic rule per
//! field this engine's rule catalog expects, rather than a priority-fallback
//! chain across Open Graph/Twitter/native tags.

use scraper::{ElementRef, Html, Selector};
use seo_types::{
    CanonicalUrl, Headings, Image, Link, PageFacts, StructuredDataBlock, StructuredDataKind,
};

/// Parse an HTML document into [`PageFacts`]. `page_url` is the final URL the
/// body was served from (used to resolve relative links/canonicals and to
/// decide internal-vs-external and mixed-content applicability); `x_robots`
/// tokens come from the `X-Robots-Tag` response header, parsed by the caller.
pub fn parse(html_body: &str, page_url: &CanonicalUrl, x_robots: Vec<String>) -> PageFacts {
    let document = Html::parse_document(html_body);
    let base_host = page_url.host();

    let title = extract_title(&document);
    let meta_description = extract_meta_description(&document);
    let canonical = extract_canonical(&document, page_url);
    let meta_robots = extract_meta_robots(&document);
    let headings = extract_headings(&document);
    let images = extract_images(&document);
    let links = extract_links(&document, page_url, base_host.as_deref());
    let structured_data = extract_structured_data(&document);
    let viewport_present = selector_exists(&document, "meta[name='viewport']");
    let lang_attr = extract_lang(&document);
    let charset = extract_charset(&document);
    let https = page_url.is_https();
    let mixed_content = if https {
        find_mixed_content(&document)
    } else {
        Vec::new()
    };

    PageFacts {
        title,
        meta_description,
        canonical,
        meta_robots,
        x_robots: x_robots.into_iter().map(|s| s.to_lowercase()).collect(),
        headings,
        images,
        links,
        structured_data,
        viewport_present,
        lang_attr,
        charset,
        mixed_content,
        https,
    }
}

fn selector_exists(document: &Html, selector: &str) -> bool {
    Selector::parse(selector)
        .ok()
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}

fn text_content(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn extract_title(document: &Html) -> Option<String> {
    let head_title = Selector::parse("head title").ok()?;
    let title = document
        .select(&head_title)
        .next()
        .map(text_content)
        .or_else(|| {
            Selector::parse("title")
                .ok()
                .and_then(|sel| document.select(&sel).next())
                .map(text_content)
        });
    title
}

fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name='description']").ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("content")
        .map(|s| s.trim().to_string())
}

fn extract_canonical(document: &Html, page_url: &CanonicalUrl) -> Option<CanonicalUrl> {
    let selector = Selector::parse("link[rel='canonical']").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    page_url.join(href).ok()
}

fn extract_meta_robots(document: &Html) -> std::collections::HashSet<String> {
    let mut tokens = std::collections::HashSet::new();
    if let Ok(selector) = Selector::parse("meta[name='robots']") {
        for el in document.select(&selector) {
            if let Some(content) = el.value().attr("content") {
                for tok in content.split(',') {
                    let tok = tok.trim().to_lowercase();
                    if !tok.is_empty() {
                        tokens.insert(tok);
                    }
                }
            }
        }
    }
    tokens
}

fn extract_headings(document: &Html) -> Headings {
    let mut headings = Headings::default();
    for (level, tag) in ["h1", "h2", "h3", "h4", "h5", "h6"].iter().enumerate() {
        if let Ok(selector) = Selector::parse(tag) {
            let elements: Vec<_> = document.select(&selector).collect();
            headings.counts[level] = elements.len() as u32;
            if level == 0 {
                headings.h1_texts = elements.into_iter().map(text_content).collect();
            }
        }
    }
    headings
}

fn is_svg_src(src: &str) -> bool {
    src.to_lowercase().ends_with(".svg")
}

fn extract_images(document: &Html) -> Vec<Image> {
    let mut images = Vec::new();

    if let Ok(selector) = Selector::parse("img") {
        for el in document.select(&selector) {
            let value = el.value();
            let src = value.attr("src").unwrap_or_default().to_string();
            let is_svg = value.attr("src").map(is_svg_src).unwrap_or(false);
            images.push(Image {
                src,
                alt: value.attr("alt").map(|s| s.to_string()),
                width: value.attr("width").map(|s| s.to_string()),
                height: value.attr("height").map(|s| s.to_string()),
                is_svg,
            });
        }
    }

    // Inline <svg> elements are images in their own right (§4.3) but carry no
    // `src`/`alt` attributes, so they're always exempt from alt-text checks.
    if let Ok(selector) = Selector::parse("svg") {
        for _ in document.select(&selector) {
            images.push(Image { src: String::new(), alt: None, width: None, height: None, is_svg: true });
        }
    }

    images
}

fn extract_links(document: &Html, page_url: &CanonicalUrl, base_host: Option<&str>) -> Vec<Link> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with("tel:") {
                return None;
            }
            let absolute = page_url.join(href).ok()?;
            let is_internal = base_host.is_some_and(|h| absolute.host().as_deref() == Some(h));
            let rel_tokens = el
                .value()
                .attr("rel")
                .map(|r| r.split_whitespace().map(|t| t.to_lowercase()).collect())
                .unwrap_or_default();
            Some(Link {
                href_absolute: absolute,
                anchor_text: text_content(el),
                rel_tokens,
                is_internal,
                aria_label: el.value().attr("aria-label").map(|s| s.to_string()),
            })
        })
        .collect()
}

fn extract_structured_data(document: &Html) -> Vec<StructuredDataBlock> {
    let mut blocks = Vec::new();

    if let Ok(selector) = Selector::parse("script[type='application/ld+json']") {
        for el in document.select(&selector) {
            let text: String = el.text().collect();
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                collect_jsonld_types(&value, &mut blocks);
            }
        }
    }

    if let Ok(selector) = Selector::parse("[itemscope]") {
        for el in document.select(&selector) {
            if let Some(itemtype) = el.value().attr("itemtype") {
                let type_label = itemtype.rsplit('/').next().unwrap_or(itemtype).to_string();
                blocks.push(StructuredDataBlock {
                    kind: StructuredDataKind::Microdata,
                    type_label,
                });
            }
        }
    }

    if let Ok(selector) = Selector::parse("[typeof]") {
        for el in document.select(&selector) {
            if let Some(type_label) = el.value().attr("typeof") {
                blocks.push(StructuredDataBlock {
                    kind: StructuredDataKind::Rdfa,
                    type_label: type_label.to_string(),
                });
            }
        }
    }

    blocks
}

fn collect_jsonld_types(value: &serde_json::Value, out: &mut Vec<StructuredDataBlock>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_jsonld_types(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(type_value) = map.get("@type") {
                let label = match type_value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(arr) => arr
                        .iter()
                        .filter_map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                    _ => return,
                };
                if !label.is_empty() {
                    out.push(StructuredDataBlock {
                        kind: StructuredDataKind::Jsonld,
                        type_label: label,
                    });
                }
            }
        }
        _ => {}
    }
}

fn extract_lang(document: &Html) -> Option<String> {
    let selector = Selector::parse("html").ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("lang")
        .map(|s| s.to_string())
}

fn extract_charset(document: &Html) -> Option<String> {
    if let Ok(selector) = Selector::parse("meta[charset]") {
        if let Some(el) = document.select(&selector).next() {
            return el.value().attr("charset").map(|s| s.to_string());
        }
    }
    if let Ok(selector) = Selector::parse("meta[http-equiv='Content-Type']") {
        if let Some(el) = document.select(&selector).next() {
            if let Some(content) = el.value().attr("content") {
                if let Some(idx) = content.to_lowercase().find("charset=") {
                    return Some(content[idx + 8..].trim().to_string());
                }
            }
        }
    }
    None
}

fn find_mixed_content(document: &Html) -> Vec<String> {
    let mut found = Vec::new();

    if let Ok(selector) = Selector::parse("script[src]") {
        for el in document.select(&selector) {
            if let Some(src) = el.value().attr("src") {
                if src.starts_with("http://") {
                    found.push(src.to_string());
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("link[href]") {
        for el in document.select(&selector) {
            let is_stylesheet = el
                .value()
                .attr("rel")
                .map(|r| r.split_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")))
                .unwrap_or(false);
            if is_stylesheet {
                if let Some(href) = el.value().attr("href") {
                    if href.starts_with("http://") {
                        found.push(href.to_string());
                    }
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("img[src]") {
        for el in document.select(&selector) {
            if let Some(src) = el.value().attr("src") {
                if src.starts_with("http://") {
                    found.push(src.to_string());
                }
            }
        }
    }

    found
}
