//! Directory-listing page parsing.
//!
//! The remote listing is a plain HTML page whose anchor texts are the
//! downloadable filenames. Anchor text is what matters; hrefs are ignored.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::fetch::{self, FetchOptions};

/// Extracts every anchor text ending in `suffix` (case-sensitive exact tail
/// match), in document order. Duplicates are kept; an empty result is valid.
pub fn parse_listing(html: &str, suffix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a").expect("anchor selector");

    document
        .select(&anchor)
        .map(|element| element.text().collect::<String>())
        .filter(|name| name.ends_with(suffix))
        .collect()
}

/// Fetches the listing page at `url` and returns the matching filenames.
pub fn fetch_listing(url: &str, suffix: &str, opts: &FetchOptions) -> Result<Vec<String>> {
    tracing::info!("fetching listing from '{}'", url);
    let html = fetch::fetch_text(url, opts)
        .with_context(|| format!("fetching listing page '{}'", url))?;
    let names = parse_listing(&html, suffix);
    tracing::info!("found {} file(s) ending in '{}'", names.len(), suffix);
    Ok(names)
}
