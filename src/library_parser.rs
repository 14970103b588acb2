use crate::config::LibrarySource;
use crate::errors::ParseError;
use crate::models::{Library, Members, Playlist, Song, DEFAULT_FORMAT, MAX_RATING};
use crate::rhythmbox_parser;
use plist::{Dictionary, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use urlencoding::decode;

/// Auto-generated iTunes views that are not user playlists.
const RESERVED_PLAYLISTS: [&str; 5] = ["Library", "Downloaded", "Music", "Playlists", "Rating"];

/// iTunes stores ratings in steps of 20 on a 0-100 scale.
const ITUNES_RATING_STEP: u64 = 20;

impl Library {
    pub fn load(source: &LibrarySource) -> Result<Library, ParseError> {
        match source {
            LibrarySource::Itunes { library } => parse_library(library),
            LibrarySource::Rhythmbox {
                database,
                playlists,
            } => rhythmbox_parser::parse_library(database, playlists),
        }
    }
}

/// Parses an iTunes Library XML export (tracks and playlists in one plist).
pub fn parse_library<P: AsRef<Path>>(path: P) -> Result<Library, ParseError> {
    let path = path.as_ref();
    log::info!("Parsing iTunes library from {:?}", path);

    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = Value::from_reader(BufReader::new(file))?;

    let root_dict = value
        .as_dictionary()
        .ok_or_else(|| ParseError::MissingSection("root dictionary".to_string()))?;
    let tracks_dict = root_dict
        .get("Tracks")
        .and_then(Value::as_dictionary)
        .ok_or_else(|| ParseError::MissingSection("Tracks".to_string()))?;

    let mut songs = Vec::with_capacity(tracks_dict.len());
    for (key, track_value) in tracks_dict {
        let id: u64 = key
            .parse()
            .map_err(|_| ParseError::invalid("Track key", key))?;
        let track_info = track_value
            .as_dictionary()
            .ok_or_else(|| ParseError::invalid("Track", key))?;

        // Skip remote/streamed tracks
        if let Some(type_str) = track_info.get("Track Type").and_then(Value::as_string) {
            if type_str == "Remote" || type_str == "Stream" {
                log::debug!("Skipping {} track {}", type_str, id);
                continue;
            }
        }

        songs.push(parse_song(id, track_info)?);
    }

    let mut library = Library::with_songs(vec![path.to_path_buf()], songs)?;

    let playlists_array = root_dict
        .get("Playlists")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::MissingSection("Playlists".to_string()))?;

    let mut playlists = Vec::new();
    for playlist_value in playlists_array {
        let playlist_info = playlist_value
            .as_dictionary()
            .ok_or_else(|| ParseError::invalid("Playlist", "not a dictionary"))?;
        if let Some(playlist) = parse_playlist(playlist_info, &library)? {
            playlists.push(playlist);
        }
    }
    library.set_playlists(playlists);

    log::info!(
        "Loaded iTunes library: {} songs, {} playlists",
        library.songs().len(),
        library.playlists().len()
    );
    Ok(library)
}

fn parse_song(id: u64, track_info: &Dictionary) -> Result<Song, ParseError> {
    let text = |key: &str| {
        track_info
            .get(key)
            .and_then(Value::as_string)
            .map(|s| s.to_string())
    };

    let rating = match track_info.get("Rating") {
        Some(value) => {
            let raw = value
                .as_unsigned_integer()
                .ok_or_else(|| ParseError::invalid("Rating", format!("{:?}", value)))?;
            let scaled = raw / ITUNES_RATING_STEP;
            if scaled > MAX_RATING as u64 {
                return Err(ParseError::invalid("Rating", raw));
            }
            scaled as u8
        }
        None => 0,
    };

    let format = track_info
        .get("Location")
        .and_then(Value::as_string)
        .and_then(format_from_location)
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    Ok(Song {
        id,
        title: text("Name"),
        artist: text("Artist"),
        album: text("Album"),
        album_artist: text("Album Artist"),
        track_number: number(track_info, "Track Number")?,
        disc_number: number(track_info, "Disc Number")?,
        year: number(track_info, "Year")?,
        genre: text("Genre"),
        rating,
        play_count: number(track_info, "Play Count")?,
        format,
    })
}

fn number(dict: &Dictionary, key: &str) -> Result<Option<u32>, ParseError> {
    let Some(value) = dict.get(key) else {
        return Ok(None);
    };
    value
        .as_unsigned_integer()
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| ParseError::invalid(key, format!("{:?}", value)))
}

fn parse_playlist(
    playlist_info: &Dictionary,
    library: &Library,
) -> Result<Option<Playlist>, ParseError> {
    let items = match playlist_info.get("Playlist Items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return Ok(None),
    };

    let name = playlist_info
        .get("Name")
        .and_then(Value::as_string)
        .ok_or_else(|| ParseError::invalid("Playlist Name", "missing"))?;
    if RESERVED_PLAYLISTS.contains(&name) {
        return Ok(None);
    }

    let id = playlist_info
        .get("Playlist ID")
        .and_then(Value::as_unsigned_integer)
        .ok_or_else(|| ParseError::invalid("Playlist ID", name))?;

    let mut members = Vec::with_capacity(items.len());
    for item in items {
        let track_id = item
            .as_dictionary()
            .and_then(|d| d.get("Track ID"))
            .and_then(Value::as_unsigned_integer)
            .ok_or_else(|| ParseError::invalid("Track ID", name))?;

        match library.song_ref(track_id) {
            Some(song) => members.push(song),
            None => log::warn!(
                "Playlist {:?} references unknown track {}, skipping it",
                name,
                track_id
            ),
        }
    }

    Ok(Some(Playlist::new(id, name, Members::Resolved(members))))
}

/// Extension of the file a `Location` URL points at.
fn format_from_location(location: &str) -> Option<String> {
    let decoded = decode(location).ok()?;
    let file_name = decoded.trim_end_matches('/').rsplit('/').next()?;
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_string()),
        _ => None,
    }
}
