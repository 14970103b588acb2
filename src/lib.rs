pub mod config;
pub mod errors;
pub mod library_parser;
pub mod logging;
pub mod models;
pub mod paths;
pub mod playlist_writer;
pub mod ratings;
pub mod rhythmbox_parser;
pub mod sync;

pub use config::{LibrarySource, PlaylistOutput, SyncConfig};
pub use errors::{ConfigError, ParseError, RatingsError, SyncError};
pub use models::{Library, Members, Playlist, Song, SongRef};
pub use sync::{sync_library, LibrarySync, ProgressSink, SyncReport};
