pub mod cache;
pub mod fetcher;

pub use cache::{
    CacheStore,
    CatalogCache,
    Clock,
    FileStore,
    FixedClock,
    MemoryStore,
    SystemClock,
};
pub use fetcher::CatalogFetcher;

use crate::core::{
    Catalog,
    LexitherasError,
};

/// Where the resolver gets its catalog from.
pub trait CatalogSource {
    fn catalog(&self) -> Result<Catalog, LexitherasError>;
}

/// Serves the cached catalog while it is fresh, otherwise fetches and
/// re-caches. Cache write failures are logged and dropped.
pub struct CachedCatalog<'a> {
    cache: CatalogCache,
    fetcher: CatalogFetcher<'a>,
    refresh: bool,
}

impl<'a> CachedCatalog<'a> {
    pub fn new(cache: CatalogCache, fetcher: CatalogFetcher<'a>) -> Self {
        Self { cache, fetcher, refresh: false }
    }

    /// Skip the cache read; the fetched catalog is still saved.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

impl CatalogSource for CachedCatalog<'_> {
    fn catalog(&self) -> Result<Catalog, LexitherasError> {
        if !self.refresh {
            if let Some(catalog) = self.cache.load() {
                return Ok(catalog);
            }
        }

        let catalog = self.fetcher.fetch_at(self.cache.now())?;
        if let Err(e) = self.cache.save(&catalog) {
            log::warn!("Failed to save catalog cache: {}", e);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::{
        Duration,
        TimeZone,
        Utc,
    };

    use super::*;
    use crate::core::{
        http::testing::StaticPages,
        TextEntry,
    };

    const BASE: &str = "https://vocab.perseus.org/";
    const PAGE: &str = r#"<h2>Homer</h2><a href="/word-list/urn:cts:greekLit:tlg0012.tlg001.perseus-grc2/">Iliad</a>"#;

    fn memory_cache(store: MemoryStore) -> CatalogCache {
        CatalogCache::new(Box::new(store), Box::new(SystemClock), Duration::days(7))
    }

    #[test]
    fn test_fresh_cache_skips_network() {
        let cached = Catalog::new(
            Utc::now(),
            vec![TextEntry::new(Some("Plato"), "Republic", "urn:plato", "https://x/")],
        );
        let store = MemoryStore::with_contents(&serde_json::to_string(&cached).unwrap());
        let pages = StaticPages::default();

        let source = CachedCatalog::new(memory_cache(store), CatalogFetcher::new(&pages, BASE));
        assert_eq!(source.catalog().unwrap(), cached);
        assert!(pages.requests.borrow().is_empty());
    }

    #[test]
    fn test_miss_fetches_and_saves() {
        let pages = StaticPages::default().with_page(BASE, PAGE);
        let source =
            CachedCatalog::new(memory_cache(MemoryStore::default()), CatalogFetcher::new(&pages, BASE));

        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.texts[0].title, "Iliad");

        // Second call is served from the freshly written cache.
        source.catalog().unwrap();
        assert_eq!(pages.requests.borrow().len(), 1);
    }

    #[test]
    fn test_refresh_ignores_fresh_cache() {
        let cached = Catalog::new(Utc::now(), Vec::new());
        let store = MemoryStore::with_contents(&serde_json::to_string(&cached).unwrap());
        let pages = StaticPages::default().with_page(BASE, PAGE);

        let source =
            CachedCatalog::new(memory_cache(store), CatalogFetcher::new(&pages, BASE)).refresh(true);
        assert_eq!(source.catalog().unwrap().len(), 1);
        assert_eq!(pages.requests.borrow().len(), 1);
    }

    #[test]
    fn test_fetched_catalog_goes_stale_on_the_cache_clock() {
        let clock = Rc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        let cache =
            CatalogCache::new(Box::new(MemoryStore::default()), Box::new(clock.clone()), Duration::days(7));
        let pages = StaticPages::default().with_page(BASE, PAGE);
        let source = CachedCatalog::new(cache, CatalogFetcher::new(&pages, BASE));

        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.fetched_at, clock.now());

        clock.advance(Duration::days(6));
        source.catalog().unwrap();
        assert_eq!(pages.requests.borrow().len(), 1);

        clock.advance(Duration::days(2));
        source.catalog().unwrap();
        assert_eq!(pages.requests.borrow().len(), 2);
    }
}
