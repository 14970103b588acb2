use crate::errors::ParseError;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

pub const DEFAULT_FORMAT: &str = "mp3";
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: u64, // Unique within its Library
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub rating: u8, // 0-5
    pub play_count: Option<u32>,
    pub format: String, // File extension, no dot
}

impl Song {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            artist: None,
            album: None,
            album_artist: None,
            track_number: None,
            disc_number: None,
            year: None,
            genre: None,
            rating: 0,
            play_count: None,
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

/// Non-owning reference from a playlist to a song of the same Library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SongRef(usize);

/// Playlist members: songs of the Library, or raw relative file paths when the
/// source dialect only records locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Members {
    Resolved(Vec<SongRef>),
    Unresolved(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: u64,
    pub name: String,
    members: Members,
}

impl Playlist {
    pub fn new(id: u64, name: impl Into<String>, members: Members) -> Self {
        Self {
            id,
            name: name.into(),
            members,
        }
    }

    pub fn members(&self) -> &Members {
        &self.members
    }

    pub fn len(&self) -> usize {
        match &self.members {
            Members::Resolved(refs) => refs.len(),
            Members::Unresolved(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Song at a playlist position. Always `None` for unresolved playlists.
    pub fn song<'a>(&self, index: usize, library: &'a Library) -> Option<&'a Song> {
        match &self.members {
            Members::Resolved(refs) => refs.get(index).and_then(|r| library.resolve(*r)),
            Members::Unresolved(_) => None,
        }
    }

    pub fn songs<'a>(&'a self, library: &'a Library) -> impl Iterator<Item = &'a Song> + 'a {
        let refs: &[SongRef] = match &self.members {
            Members::Resolved(refs) => refs,
            Members::Unresolved(_) => &[],
        };
        refs.iter().filter_map(move |r| library.resolve(*r))
    }

    /// Relative file paths of the members, in playlist order.
    pub fn files(&self, library: &Library) -> Vec<String> {
        match &self.members {
            Members::Resolved(refs) => refs
                .iter()
                .filter_map(|r| library.resolve(*r))
                .map(paths::file_path)
                .collect(),
            Members::Unresolved(files) => files.clone(),
        }
    }

    /// `file://` URLs of the members once placed under `folder`.
    pub fn urls(&self, library: &Library, folder: &Path) -> Vec<String> {
        self.files(library)
            .iter()
            .filter_map(|file| {
                let url = paths::file_url(folder, file);
                if url.is_none() {
                    log::warn!("Cannot build a file URL for {:?} under {:?}", file, folder);
                }
                url
            })
            .collect()
    }
}

/// A parsed music library. Built once by a parser and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Library {
    files: Vec<PathBuf>,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    index: HashMap<u64, usize>,
}

impl Library {
    pub(crate) fn with_songs(files: Vec<PathBuf>, songs: Vec<Song>) -> Result<Self, ParseError> {
        let mut index = HashMap::with_capacity(songs.len());
        for (position, song) in songs.iter().enumerate() {
            if index.insert(song.id, position).is_some() {
                return Err(ParseError::invalid("song id (duplicate)", song.id));
            }
        }
        Ok(Self {
            files,
            songs,
            playlists: Vec::new(),
            index,
        })
    }

    pub(crate) fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
    }

    /// Source files this library was read from.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get_song(&self, id: u64) -> Option<&Song> {
        self.index.get(&id).map(|&position| &self.songs[position])
    }

    pub fn song_ref(&self, id: u64) -> Option<SongRef> {
        self.index.get(&id).copied().map(SongRef)
    }

    /// `None` when `song` was taken from another, larger Library.
    pub fn resolve(&self, song: SongRef) -> Option<&Song> {
        self.songs.get(song.0)
    }

    /// Number of distinct artist folders the songs map to.
    pub fn artist_count(&self) -> usize {
        self.songs
            .iter()
            .map(paths::artist_folder)
            .collect::<BTreeSet<_>>()
            .len()
    }
}
