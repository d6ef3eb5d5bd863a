//! Persisted user selection.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{criteria::Selection, error::PreferenceError};

pub const TOOL_KEY: &str = "toollevel";
pub const SEASON_KEY: &str = "season";
pub const WEATHER_KEY: &str = "weather";

pub const DEFAULT_TOOL: &str = "base";
pub const DEFAULT_SEASON: &str = "spring";
pub const DEFAULT_WEATHER: &str = "sunny";

pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Opens the store; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PreferenceError> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Restores the last selection, filling gaps with the defaults.
pub fn load_selection(store: &dyn PreferenceStore) -> Selection {
    let read = |key, default: &str| {
        store
            .get(key)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    };
    Selection {
        toollevel: read(TOOL_KEY, DEFAULT_TOOL),
        season: read(SEASON_KEY, DEFAULT_SEASON),
        weather: read(WEATHER_KEY, DEFAULT_WEATHER),
    }
}

pub fn save_selection(
    store: &mut dyn PreferenceStore,
    selection: &Selection,
) -> Result<(), PreferenceError> {
    store.set(TOOL_KEY, &selection.toollevel)?;
    store.set(SEASON_KEY, &selection.season)?;
    store.set(WEATHER_KEY, &selection.weather)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let store = MemoryPreferenceStore::default();
        let selection = load_selection(&store);
        assert_eq!(selection.weather, "sunny");
        assert_eq!(selection.season, "spring");
        assert_eq!(selection.toollevel, "base");
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let selection = Selection {
            toollevel: "gold".into(),
            season: "winter".into(),
            weather: "snowy".into(),
        };
        {
            let mut store = FilePreferenceStore::open(&path).unwrap();
            save_selection(&mut store, &selection).unwrap();
        }
        let reopened = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(load_selection(&reopened), selection);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            FilePreferenceStore::open(&path),
            Err(PreferenceError::Format(_))
        ));
    }
}
