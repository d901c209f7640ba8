pub mod errors;
pub mod http;
pub mod models;
pub mod settings;

pub use errors::LexitherasError;
pub use models::{
    Catalog,
    TextEntry,
    VocabItem,
    UNKNOWN_AUTHOR,
};
