//! robots.txt retrieval/parsing, per-host rate limiting, and sitemap discovery
//! and expansion, as a single resolver used once per crawl to seed the work
//! queue and to gate individual fetches when `respect_robots` is set.

mod resolver;
mod robots;
mod sitemap;

pub use resolver::{Resolution, RobotsResolver};
pub use robots::{is_allowed, parse_directives, RobotsDirectives, TokenBucket};
pub use sitemap::{SitemapExpander, COMMON_SITEMAP_PATHS, MAX_RECURSION_DEPTH, MAX_TOTAL_URLS};
