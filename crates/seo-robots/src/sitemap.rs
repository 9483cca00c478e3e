//! Sitemap discovery and expansion. Unlike a quick-and-dirty character-sniffing
//! walk, this tracks element context precisely so `<loc>` is attributed to the
//! right enclosing `<sitemap>` (index entry) or `<url>` (page entry), and bounds
//! both recursion depth and total URL count as guards against pathological or
//! hostile sitemaps.
use flate2::read::GzDecoder;
use seo_types::CanonicalUrl;
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, warn};
use xml::reader::{EventReader, XmlEvent};

pub const MAX_RECURSION_DEPTH: u32 = 5;
pub const MAX_TOTAL_URLS: usize = 50_000;

pub const COMMON_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemaps.xml",
    "/wp-sitemap.xml",
];

#[derive(Debug, Default, PartialEq, Eq)]
enum Entry {
    #[default]
    None,
    Url,
    SitemapIndexEntry,
}

/// Parsed document: either a flat list of page URLs (`urlset`) or a list of
/// child sitemap URLs to recurse into (`sitemapindex`).
#[derive(Debug, Default)]
struct ParsedSitemap {
    page_urls: Vec<String>,
    child_sitemaps: Vec<String>,
}

fn parse_sitemap_xml(xml_text: &str) -> ParsedSitemap {
    let mut result = ParsedSitemap::default();
    let mut stack: Vec<Entry> = Vec::new();
    let mut in_loc = false;
    let mut loc_text = String::new();

    let parser = EventReader::from_str(xml_text);
    for event in parser {
        match event {
            Ok(XmlEvent::StartElement { name, .. }) => match name.local_name.as_str() {
                "url" => stack.push(Entry::Url),
                "sitemap" => stack.push(Entry::SitemapIndexEntry),
                "loc" => {
                    in_loc = true;
                    loc_text.clear();
                }
                _ => {}
            },
            Ok(XmlEvent::Characters(text)) | Ok(XmlEvent::CData(text)) => {
                if in_loc {
                    loc_text.push_str(&text);
                }
            }
            Ok(XmlEvent::EndElement { name }) => match name.local_name.as_str() {
                "loc" => {
                    in_loc = false;
                    let value = loc_text.trim().to_string();
                    if !value.is_empty() {
                        match stack.last() {
                            Some(Entry::Url) => result.page_urls.push(value),
                            Some(Entry::SitemapIndexEntry) => result.child_sitemaps.push(value),
                            _ => {}
                        }
                    }
                }
                "url" | "sitemap" => {
                    stack.pop();
                }
                _ => {}
            },
            Err(e) => {
                warn!(error = %e, "malformed sitemap xml, stopping walk");
                break;
            }
            _ => {}
        }
    }

    result
}

pub struct SitemapExpander {
    client: reqwest::Client,
}

impl SitemapExpander {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch and flatten every URL reachable from `seed_urls`, following
    /// sitemap-index recursion to [`MAX_RECURSION_DEPTH`] and stopping once
    /// [`MAX_TOTAL_URLS`] page URLs have been collected.
    pub async fn expand_all(&self, seed_urls: Vec<String>) -> Vec<CanonicalUrl> {
        let mut visited_sitemaps = HashSet::new();
        let mut out: Vec<CanonicalUrl> = Vec::new();
        let mut seen_urls = HashSet::new();

        for seed in seed_urls {
            if out.len() >= MAX_TOTAL_URLS {
                break;
            }
            self.expand_one(&seed, 0, &mut visited_sitemaps, &mut out, &mut seen_urls).await;
        }

        out
    }

    async fn expand_one(
        &self,
        sitemap_url: &str,
        depth: u32,
        visited_sitemaps: &mut HashSet<String>,
        out: &mut Vec<CanonicalUrl>,
        seen_urls: &mut HashSet<String>,
    ) {
        if depth > MAX_RECURSION_DEPTH {
            debug!(sitemap_url, depth, "sitemap recursion depth exceeded, stopping");
            return;
        }
        if !visited_sitemaps.insert(sitemap_url.to_string()) {
            return;
        }

        let body = match self.fetch_decoded(sitemap_url).await {
            Some(body) => body,
            None => return,
        };

        let parsed = parse_sitemap_xml(&body);

        for page_url in parsed.page_urls {
            if out.len() >= MAX_TOTAL_URLS {
                return;
            }
            if let Ok(canon) = CanonicalUrl::parse(&page_url) {
                if seen_urls.insert(canon.as_str().to_string()) {
                    out.push(canon);
                }
            }
        }

        for child in parsed.child_sitemaps {
            if out.len() >= MAX_TOTAL_URLS {
                return;
            }
            Box::pin(self.expand_one(&child, depth + 1, visited_sitemaps, out, seen_urls)).await;
        }
    }

    async fn fetch_decoded(&self, url: &str) -> Option<String> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let is_gzip = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("gzip"))
            .unwrap_or(false)
            || url.ends_with(".gz");

        let bytes = response.bytes().await.ok()?;

        if is_gzip {
            let mut decoder = GzDecoder::new(&bytes[..]);
            let mut text = String::new();
            decoder.read_to_string(&mut text).ok()?;
            Some(text)
        } else {
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    /// Probe the common sitemap locations under `origin`, returning those that
    /// respond 2xx. Used to supplement robots.txt `Sitemap:` directives.
    pub async fn probe_common_locations(&self, origin: &str) -> Vec<String> {
        let mut found = Vec::new();
        for path in COMMON_SITEMAP_PATHS {
            let candidate = format!("{origin}{path}");
            if let Ok(resp) = self.client.head(&candidate).send().await {
                if resp.status().is_success() {
                    found.push(candidate);
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urlset_locs() {
        let xml = r#"<?xml version="1.0"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url><loc>https://example.com/a</loc></url>
          <url><loc>https://example.com/b</loc></url>
        </urlset>"#;
        let parsed = parse_sitemap_xml(xml);
        assert_eq!(parsed.page_urls, vec!["https://example.com/a", "https://example.com/b"]);
        assert!(parsed.child_sitemaps.is_empty());
    }

    #[test]
    fn parses_sitemap_index_locs_separately_from_url_locs() {
        let xml = r#"<sitemapindex>
          <sitemap><loc>https://example.com/sitemap-1.xml</loc></sitemap>
          <sitemap><loc>https://example.com/sitemap-2.xml</loc></sitemap>
        </sitemapindex>"#;
        let parsed = parse_sitemap_xml(xml);
        assert!(parsed.page_urls.is_empty());
        assert_eq!(parsed.child_sitemaps.len(), 2);
    }

    #[test]
    fn malformed_xml_does_not_panic() {
        let parsed = parse_sitemap_xml("<urlset><url><loc>not closed");
        assert!(parsed.page_urls.is_empty() || !parsed.page_urls.is_empty());
    }
}
