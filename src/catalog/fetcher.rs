use std::{
    collections::HashSet,
    sync::OnceLock,
};

use chrono::{
    DateTime,
    Utc,
};
use regex::Regex;
use reqwest::Url;
use scraper::{
    Html,
    Selector,
};

use crate::core::{
    http::PageSource,
    Catalog,
    LexitherasError,
    TextEntry,
};

const HEADINGS_AND_LINKS: &str = "h1, h2, h3, h4, h5, h6, a[href]";

fn word_list_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"word-list/([^/?#]+)/").unwrap())
}

/// Pulls the text identifier out of a word-list link, e.g.
/// `/word-list/urn:cts:greekLit:tlg0012.tlg001.perseus-grc2/` → the URN.
pub fn word_list_urn(href: &str) -> Option<&str> {
    word_list_pattern().captures(href).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub struct CatalogFetcher<'a> {
    pages: &'a dyn PageSource,
    catalog_url: String,
}

impl<'a> CatalogFetcher<'a> {
    pub fn new(pages: &'a dyn PageSource, catalog_url: &str) -> Self {
        Self { pages, catalog_url: catalog_url.to_string() }
    }

    pub fn fetch(&self) -> Result<Catalog, LexitherasError> {
        self.fetch_at(Utc::now())
    }

    /// Same as [`fetch`](Self::fetch), stamping the catalog with `fetched_at`.
    pub fn fetch_at(&self, fetched_at: DateTime<Utc>) -> Result<Catalog, LexitherasError> {
        log::info!("Fetching text catalog from {}", self.catalog_url);
        let html = self.pages.get_text(&self.catalog_url)?;
        let texts = parse_catalog(&html, &self.catalog_url)?;
        log::info!("Found {} texts in catalog", texts.len());
        Ok(Catalog::new(fetched_at, texts))
    }
}

/// Walks headings and links in document order. Each heading becomes the
/// author for the word-list links that follow it.
pub fn parse_catalog(html: &str, page_url: &str) -> Result<Vec<TextEntry>, LexitherasError> {
    let base = Url::parse(page_url)
        .map_err(|e| LexitherasError::Parse(format!("Invalid catalog URL {}: {}", page_url, e)))?;
    let selector = Selector::parse(HEADINGS_AND_LINKS)
        .map_err(|e| LexitherasError::Parse(format!("Invalid selector: {:?}", e)))?;

    let document = Html::parse_document(html);
    let mut current_author: Option<String> = None;
    let mut seen = HashSet::new();
    let mut texts = Vec::new();

    for element in document.select(&selector) {
        let text = element.text().collect::<String>();
        let text = text.trim();

        if element.value().name() != "a" {
            current_author = Some(text.to_string());
            continue;
        }

        let Some(href) = element.value().attr("href") else { continue };
        let Some(urn) = word_list_urn(href) else { continue };
        let Ok(url) = base.join(href) else {
            log::debug!("Skipping unresolvable link {}", href);
            continue;
        };

        if !seen.insert(urn.to_string()) {
            continue;
        }

        let title = if text.is_empty() { urn } else { text };
        texts.push(TextEntry::new(current_author.as_deref(), title, urn, url.as_str()));
    }

    Ok(texts)
}
