use crate::canon::CanonicalUrl;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headings {
    /// H1..H6 counts, indexed 0..5.
    pub counts: [u32; 6],
    /// Trimmed text of every H1, in document order.
    pub h1_texts: Vec<String>,
}

impl Headings {
    pub fn h1_count(&self) -> u32 {
        self.counts[0]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub is_svg: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href_absolute: CanonicalUrl,
    pub anchor_text: String,
    pub rel_tokens: Vec<String>,
    pub is_internal: bool,
    pub aria_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuredDataKind {
    Jsonld,
    Microdata,
    Rdfa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredDataBlock {
    pub kind: StructuredDataKind,
    pub type_label: String,
}

/// Facts extracted from the HTML body of a [`crate::FetchResult`]. Absent from a
/// [`crate::CrawlRecord`] for non-HTML responses or fetch errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFacts {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<CanonicalUrl>,
    pub meta_robots: HashSet<String>,
    pub x_robots: HashSet<String>,
    pub headings: Headings,
    pub images: Vec<Image>,
    pub links: Vec<Link>,
    pub structured_data: Vec<StructuredDataBlock>,
    pub viewport_present: bool,
    pub lang_attr: Option<String>,
    pub charset: Option<String>,
    pub mixed_content: Vec<String>,
    pub https: bool,
}

impl PageFacts {
    pub fn internal_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.is_internal)
    }

    /// Structured-data type labels and how many times each recurs on this page.
    pub fn structured_data_type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for block in &self.structured_data {
            *counts.entry(block.type_label.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
