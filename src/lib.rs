pub mod anki;
pub mod catalog;
pub mod core;
pub mod persistence;
pub mod resolver;
pub mod vocab;
