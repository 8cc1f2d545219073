//! TOML session files that preset the command-line options.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Settings read from a session file; every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionFile {
    pub(crate) level: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) lives: Option<u32>,
    pub(crate) ticks: Option<u64>,
    pub(crate) script: Option<String>,
}

/// Failures while loading a session file.
#[derive(Debug, Error)]
pub(crate) enum SessionFileError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl SessionFile {
    /// Reads and parses the session file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, SessionFileError> {
        let contents = fs::read_to_string(path).map_err(|source| SessionFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SessionFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "level = 4\nscript = \"down*2,spray\"").expect("write session");

        let session = SessionFile::load(file.path()).expect("session loads");
        assert_eq!(
            session,
            SessionFile {
                level: Some(4),
                script: Some("down*2,spray".to_owned()),
                ..SessionFile::default()
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "level = 1\ndifficulty = \"hard\"").expect("write session");

        let error = SessionFile::load(file.path()).expect_err("unknown key");
        assert!(matches!(error, SessionFileError::Parse { .. }));
    }

    #[test]
    fn missing_files_report_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.toml");

        let error = SessionFile::load(&path).expect_err("file is missing");
        assert!(matches!(error, SessionFileError::Read { .. }));
        assert!(error.to_string().contains("absent.toml"));
    }
}
