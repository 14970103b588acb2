use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a library export into a `Library`. Always fatal.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed property list: {0}")]
    Plist(#[from] plist::Error),

    #[error("Malformed XML in {path:?}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Missing section: {0}")]
    MissingSection(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl ParseError {
    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        ParseError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Recoverable per-item failure collected during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Song not found in the source folder ({path})")]
    MissingSourceFile { id: u64, path: String },

    #[error("Song could not be copied ({path}): {source}")]
    CopyFailure {
        id: u64,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Playlist could not be written ({name}): {source}")]
    PlaylistWriteFailure {
        id: u64,
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Relative song path for song errors, playlist name for playlist errors.
    pub fn subject(&self) -> &str {
        match self {
            SyncError::MissingSourceFile { path, .. } | SyncError::CopyFailure { path, .. } => path,
            SyncError::PlaylistWriteFailure { name, .. } => name,
        }
    }

    pub fn is_song_error(&self) -> bool {
        !matches!(self, SyncError::PlaylistWriteFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RatingsError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
