use std::{
    cell::{
        Cell,
        RefCell,
    },
    fs,
    path::PathBuf,
    rc::Rc,
};

use chrono::{
    DateTime,
    Duration,
    Utc,
};

use crate::{
    core::{
        Catalog,
        LexitherasError,
    },
    persistence::get_data_file_path,
};

pub const CACHE_FILE: &str = "catalog_cache.json";

/// Raw storage behind the catalog cache.
pub trait CacheStore {
    /// `None` when nothing is stored or the stored bytes cannot be read.
    fn read(&self) -> Option<String>;
    fn write(&self, contents: &str) -> Result<(), LexitherasError>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_data_dir() -> Self {
        Self::new(get_data_file_path(CACHE_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn read(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                log::warn!("Failed to read catalog cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn write(&self, contents: &str) -> Result<(), LexitherasError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl<T: CacheStore + ?Sized> CacheStore for Rc<T> {
    fn read(&self) -> Option<String> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<(), LexitherasError> {
        (**self).write(contents)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    contents: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with_contents(contents: &str) -> Self {
        Self { contents: RefCell::new(Some(contents.to_string())) }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.contents()
    }

    fn write(&self, contents: &str) -> Result<(), LexitherasError> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Catalog snapshot with a time-to-live. Missing, corrupt and stale
/// entries all read back as a miss.
pub struct CatalogCache {
    store: Box<dyn CacheStore>,
    clock: Box<dyn Clock>,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(store: Box<dyn CacheStore>, clock: Box<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn load(&self) -> Option<Catalog> {
        let contents = self.store.read()?;

        let catalog = match serde_json::from_str::<Catalog>(&contents) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::warn!("Ignoring corrupt catalog cache: {}", e);
                return None;
            }
        };

        let age = self.clock.now() - catalog.fetched_at;
        if age >= self.ttl {
            log::info!("Catalog cache is stale ({} days old)", age.num_days());
            return None;
        }

        log::debug!("Loaded {} texts from catalog cache", catalog.len());
        Some(catalog)
    }

    pub fn save(&self, catalog: &Catalog) -> Result<(), LexitherasError> {
        let json = serde_json::to_string_pretty(catalog)?;
        self.store.write(&json)?;
        log::debug!("Saved {} texts to catalog cache", catalog.len());
        Ok(())
    }
}
