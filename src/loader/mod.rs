//! Loading of YAML list files such as `targets.yaml`.
//!
//! A list file holds one top-level key whose value is a sequence of items.
//! Types implementing [`Loadable`] declare that key and may validate each
//! item after deserialization.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ::config::{Config, File, FileFormat};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while loading a list file.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// The file that was parsed.
        path: PathBuf,
        /// The underlying parser error.
        #[source]
        source: ::config::ConfigError,
    },

    /// The file does not declare the expected top-level key.
    #[error("{path} has no top-level '{key}' list")]
    MissingKey {
        /// The file that was parsed.
        path: PathBuf,
        /// The key that was looked up.
        key: &'static str,
    },

    /// The file extension is not `.yaml` or `.yml`.
    #[error("Unsupported file format for {0}: expected .yaml or .yml")]
    UnsupportedFormat(PathBuf),
}

/// A type that is read as a list from a YAML file.
pub trait Loadable: Sized + DeserializeOwned {
    /// The top-level key holding the list (e.g., "targets").
    const KEY: &'static str;

    /// The specific error type for this loadable item.
    type Error: From<LoaderError>;

    /// Post-deserialization checks for one item.
    fn validate(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Reads the list stored under `key` in the YAML file at `path`.
pub fn load_list<T: DeserializeOwned>(
    path: &Path,
    key: &'static str,
) -> Result<Vec<T>, LoaderError> {
    if !is_yaml_file(path) {
        return Err(LoaderError::UnsupportedFormat(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path)
        .map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;
    let parse_err = |source| LoaderError::Parse { path: path.to_path_buf(), source };

    let config = Config::builder()
        .add_source(File::from_str(&raw, FileFormat::Yaml))
        .build()
        .map_err(parse_err)?;

    match config.get::<Vec<T>>(key) {
        Ok(items) => Ok(items),
        Err(::config::ConfigError::NotFound(_)) => {
            Err(LoaderError::MissingKey { path: path.to_path_buf(), key })
        }
        Err(source) => Err(parse_err(source)),
    }
}

/// Loads and validates every `T` listed in the file at `path`.
pub fn load_config<T: Loadable>(path: &Path) -> Result<Vec<T>, T::Error> {
    let mut items: Vec<T> = load_list(path, T::KEY)?;

    for item in &mut items {
        item.validate()?;
    }

    tracing::debug!(path = %path.display(), key = T::KEY, count = items.len(), "Loaded list file.");
    Ok(items)
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shop {
        name: String,
        priority: u8,
    }

    impl Loadable for Shop {
        type Error = LoaderError;

        const KEY: &'static str = "shops";
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_list_from_yml() {
        let dir = tempfile::tempdir().unwrap();
        let content = "shops:\n  - name: A\n    priority: 1\n  - name: B\n    priority: 2\n";
        let path = write(&dir, "shops.yml", content);

        let shops: Vec<Shop> = load_config(&path).unwrap();

        assert_eq!(shops, vec![
            Shop { name: "A".into(), priority: 1 },
            Shop { name: "B".into(), priority: 2 }
        ]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.yaml");

        let error = load_list::<Shop>(&path, "shops").unwrap_err();

        assert!(matches!(&error, LoaderError::Io { path: p, .. } if *p == path));
        assert!(error.to_string().contains("targets.yaml"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "shops.yaml", "shops: [ { name: 'A', priority: 1 }, { name: 'B'");

        let result = load_list::<Shop>(&path, "shops");

        assert!(matches!(result, Err(LoaderError::Parse { .. })));
    }

    #[test]
    fn test_wrong_item_shape_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "shops.yaml", "shops:\n  - name: A\n    priority: high\n");

        let result = load_list::<Shop>(&path, "shops");

        assert!(matches!(result, Err(LoaderError::Parse { .. })));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "shops.yaml", "products:\n  - name: A\n    priority: 1\n");

        let result = load_list::<Shop>(&path, "shops");

        assert!(matches!(result, Err(LoaderError::MissingKey { key: "shops", .. })));
    }

    #[test]
    fn test_non_yaml_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "shops.json", "{\"shops\": []}");

        let result = load_list::<Shop>(&path, "shops");

        assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
    }
}
