use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default share of the progress bar given to the songs phase.
pub const DEFAULT_SONGS_WEIGHT: f64 = 0.8;

/// Where the library metadata comes from. The dialect is always explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum LibrarySource {
    /// iTunes property-list export with tracks and playlists in one file.
    Itunes { library: PathBuf },
    /// Rhythmbox song database plus its separate playlists file.
    Rhythmbox { database: PathBuf, playlists: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PlaylistOutput {
    /// One `.m3u` file per playlist in the destination root.
    #[default]
    Generic,
    /// All playlists in a single Rhythmbox playlists document.
    Aggregate { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: LibrarySource,
    pub source_folder: PathBuf,
    pub destination_folder: PathBuf,
    #[serde(default)]
    pub playlists: PlaylistOutput,
    #[serde(default = "default_songs_weight")]
    pub songs_weight: f64,
}

fn default_songs_weight() -> f64 {
    DEFAULT_SONGS_WEIGHT
}

impl SyncConfig {
    pub fn new(
        source: LibrarySource,
        source_folder: impl Into<PathBuf>,
        destination_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            source_folder: source_folder.into(),
            destination_folder: destination_folder.into(),
            playlists: PlaylistOutput::Generic,
            songs_weight: DEFAULT_SONGS_WEIGHT,
        }
    }

    pub fn with_playlists(mut self, playlists: PlaylistOutput) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SyncConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.songs_weight) {
            return Err(ConfigError::Invalid(format!(
                "songs_weight must be between 0 and 1, got {}",
                self.songs_weight
            )));
        }
        if self.source_folder == self.destination_folder {
            return Err(ConfigError::Invalid(
                "source and destination folders must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_itunes_config_with_defaults() {
        let config: SyncConfig = serde_json::from_str(
            r#"{
                "source": { "dialect": "itunes", "library": "lib.xml" },
                "source_folder": "/music",
                "destination_folder": "/mnt/player"
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            LibrarySource::Itunes {
                library: PathBuf::from("lib.xml")
            }
        );
        assert_eq!(config.playlists, PlaylistOutput::Generic);
        assert_eq!(config.songs_weight, DEFAULT_SONGS_WEIGHT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_rhythmbox_config_with_aggregate_output() {
        let config: SyncConfig = serde_json::from_str(
            r#"{
                "source": { "dialect": "rhythmbox", "database": "rhythmdb.xml", "playlists": "playlists.xml" },
                "source_folder": "/music",
                "destination_folder": "/mnt/player",
                "playlists": { "mode": "aggregate", "path": "/mnt/player/playlists.xml" },
                "songs_weight": 0.5
            }"#,
        )
        .unwrap();

        assert!(matches!(config.source, LibrarySource::Rhythmbox { .. }));
        assert_eq!(
            config.playlists,
            PlaylistOutput::Aggregate {
                path: PathBuf::from("/mnt/player/playlists.xml")
            }
        );
        assert_eq!(config.songs_weight, 0.5);
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let mut config = SyncConfig::new(
            LibrarySource::Itunes {
                library: PathBuf::from("lib.xml"),
            },
            "/music",
            "/mnt/player",
        );
        config.songs_weight = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_identical_folders() {
        let config = SyncConfig::new(
            LibrarySource::Itunes {
                library: PathBuf::from("lib.xml"),
            },
            "/music",
            "/music",
        );
        assert!(config.validate().is_err());
    }
}
