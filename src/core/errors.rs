use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexitherasError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("SQLite error: {0}")]
    Sqlite(Box<rusqlite::Error>),

    #[error("Zip error: {0}")]
    Zip(Box<zip::result::ZipError>),

    #[error("Lexitheras error: {0}")]
    Custom(String),
}

impl From<std::io::Error> for LexitherasError {
    fn from(error: std::io::Error) -> Self {
        LexitherasError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LexitherasError {
    fn from(error: reqwest::Error) -> Self {
        LexitherasError::Transport(error.to_string())
    }
}

impl From<rusqlite::Error> for LexitherasError {
    fn from(error: rusqlite::Error) -> Self {
        LexitherasError::Sqlite(Box::new(error))
    }
}

impl From<zip::result::ZipError> for LexitherasError {
    fn from(error: zip::result::ZipError) -> Self {
        LexitherasError::Zip(Box::new(error))
    }
}
