use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub storage: Storage,
    pub manifest: Option<Manifest>,
    pub sync: Option<Sync>,
    pub upload: Option<Upload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Storage {
    /// SQLite file standing in for the browser's local storage
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// File path or http(s) URL of the photo manifest (default: photos.json)
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Sync {
    /// Remote endpoint receiving owner state; unset disables sync
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Upload {
    /// Longest edge of uploaded images after downscaling (default: 1280)
    pub max_edge: Option<u32>,
    /// JPEG quality 1-100 (default: 85)
    pub jpeg_quality: Option<u8>,
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("galleria")
    } else {
        PathBuf::from("./.config/galleria")
    }
}

pub fn data_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        return bd.data_dir().join("galleria");
    }
    config_dir()
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("galleria.db")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if let Ok(s) = std::fs::read_to_string(&path) {
        toml::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_settings() {
        let s: Settings = toml::from_str(
            r#"
            [manifest]
            location = "https://example.org/photos.json"

            [upload]
            max_edge = 800
            "#,
        )
        .unwrap();
        assert!(s.storage.db_path.is_none());
        assert_eq!(
            s.manifest.and_then(|m| m.location).as_deref(),
            Some("https://example.org/photos.json")
        );
        assert_eq!(s.upload.and_then(|u| u.max_edge), Some(800));
        assert!(s.sync.is_none());
    }
}
