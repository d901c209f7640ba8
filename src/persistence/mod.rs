use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::de::DeserializeOwned;

use crate::core::LexitherasError;

const APP_NAME: &str = "lexitheras";

/// `<data_local_dir>/lexitheras`, created on first use. Falls back to the
/// working directory when the platform has no data dir or it can't be created.
pub fn get_app_data_dir() -> PathBuf {
    let Some(data_dir) = dirs::data_local_dir() else {
        log::warn!("No local data directory on this platform, using the working directory");
        return PathBuf::from(".");
    };

    let app_dir = data_dir.join(APP_NAME);
    if let Err(e) = fs::create_dir_all(&app_dir) {
        log::warn!("Failed to create {}: {}, using the working directory", app_dir.display(), e);
        return PathBuf::from(".");
    }
    app_dir
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

/// `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LexitherasError> {
    if !path.exists() {
        return Ok(None);
    }

    let data = serde_json::from_str(&fs::read_to_string(path)?)?;
    log::debug!("Loaded {}", path.display());
    Ok(Some(data))
}

/// Settings-style loading: a missing file is the default, a broken one is
/// reported and also replaced by the default.
pub fn load_json_or_default<T: DeserializeOwned + Default>(filename: &str) -> T {
    let path = get_data_file_path(filename);
    match read_json(&path) {
        Ok(data) => data.unwrap_or_default(),
        Err(e) => {
            log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_read_json_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let data: Option<BTreeMap<String, Vec<String>>> =
            read_json(&dir.path().join("aliases.json")).unwrap();
        assert_eq!(data, None);
    }

    #[test]
    fn test_read_json_reports_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<BTreeMap<String, String>>, _> = read_json(&path);
        assert!(matches!(result, Err(LexitherasError::Json(_))));
    }

    #[test]
    fn test_read_json_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        fs::write(&path, r#"{"clouds": ["nephelai"]}"#).unwrap();

        let data: Option<BTreeMap<String, Vec<String>>> = read_json(&path).unwrap();
        assert_eq!(data.unwrap()["clouds"], vec!["nephelai".to_string()]);
    }
}
