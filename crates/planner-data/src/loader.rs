//! Format detection (RON/JSON/TOML), file discovery, and deserialization
//! helpers used by the world loading pipeline.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use planner_core::binder::BindError;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// Malformed file or a record missing a required field.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The catalog parsed but could not be bound into a world.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    const EXTENSIONS: [(&'static str, Format); 3] =
        [("ron", Format::Ron), ("toml", Format::Toml), ("json", Format::Json)];
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::EXTENSIONS
        .iter()
        .find(|(candidate, _)| Some(*candidate) == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for (ext, _) in &Format::EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `path` is only used in errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(file = %path.display(), ?format, bytes = content.len(), "deserializing data file");
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    pub(crate) fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "planner_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    pub(crate) fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("catalog.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("catalog.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("catalog.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["catalog.yaml", "catalog"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found() {
        let dir = make_test_dir("find_found");
        fs::write(dir.join("catalog.json"), "{}").unwrap();

        let result = find_data_file(&dir, "catalog").unwrap();
        assert_eq!(result, Some(dir.join("catalog.json")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "catalog").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("policy.ron"), "()").unwrap();
        fs::write(dir.join("policy.json"), "{}").unwrap();

        let result = find_data_file(&dir, "policy");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");
        let result = require_data_file(&dir, "catalog");
        assert!(matches!(
            result,
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == "catalog"
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_file
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_file_each_format() {
        let dir = make_test_dir("deserialize_each");
        let expected = Sample {
            name: "plate".to_string(),
            count: 3,
        };
        let files = [
            ("sample.ron", r#"(name: "plate", count: 3)"#),
            ("sample.json", r#"{"name": "plate", "count": 3}"#),
            ("sample.toml", "name = \"plate\"\ncount = 3\n"),
        ];
        for (file, content) in files {
            let path = dir.join(file);
            fs::write(&path, content).unwrap();
            let sample: Sample = deserialize_file(&path).unwrap();
            assert_eq!(sample, expected, "{file}");
        }
        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error_names_file() {
        let dir = make_test_dir("deserialize_parse_error");
        let path = dir.join("bad.json");
        fs::write(&path, r#"{"name": "plate"}"#).unwrap();

        let err = deserialize_file::<Sample>(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        let msg = err.to_string();
        assert!(msg.contains("bad.json"));
        assert!(msg.contains("count"));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_missing_is_io_error() {
        let dir = make_test_dir("deserialize_missing");
        let result = deserialize_file::<Sample>(&dir.join("absent.ron"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "catalog".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(format!("{e}").contains("catalog"));
        assert!(format!("{e}").contains("/data"));

        let e = DataLoadError::ConflictingFormats {
            a: PathBuf::from("policy.ron"),
            b: PathBuf::from("policy.json"),
        };
        let msg = format!("{e}");
        assert!(msg.contains("policy.ron"));
        assert!(msg.contains("policy.json"));

        let e: DataLoadError = BindError::Precondition("recipes must be bound").into();
        assert!(format!("{e}").contains("recipes must be bound"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
