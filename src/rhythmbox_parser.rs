//! Rhythmbox library parsing
//!
//! Songs come from `rhythmdb.xml`, playlists from `playlists.xml`. Playlists
//! only record file locations, so their members stay as raw relative paths and
//! are never matched against the parsed songs.

use crate::errors::ParseError;
use crate::models::{Library, Members, Playlist, Song, DEFAULT_FORMAT, MAX_RATING};
use chrono::{Datelike, NaiveDate};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;
use urlencoding::decode;

/// Path segments kept from a playlist location: artist, album and file.
const LOCATION_SEGMENTS: usize = 3;

pub fn parse_library(database: &Path, playlists: &Path) -> Result<Library, ParseError> {
    log::info!("Parsing Rhythmbox database from {:?}", database);
    let songs = parse_database(database)?;

    log::info!("Parsing Rhythmbox playlists from {:?}", playlists);
    let parsed_playlists = parse_playlists(playlists)?;

    let mut library = Library::with_songs(
        vec![database.to_path_buf(), playlists.to_path_buf()],
        songs,
    )?;
    library.set_playlists(parsed_playlists);

    log::info!(
        "Loaded Rhythmbox library: {} songs, {} playlists",
        library.songs().len(),
        library.playlists().len()
    );
    Ok(library)
}

pub(crate) fn read_xml(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn parse_xml<'a>(path: &Path, text: &'a str) -> Result<Document<'a>, ParseError> {
    Document::parse(text).map_err(|source| ParseError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn song_entries<'a, 'input>(
    doc: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("entry") && n.attribute("type") == Some("song"))
}

/// Text of a direct child element.
pub(crate) fn child_text<'a>(entry: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    entry
        .children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
}

pub fn parse_database(path: &Path) -> Result<Vec<Song>, ParseError> {
    let text = read_xml(path)?;
    let doc = parse_xml(path, &text)?;

    if !doc.root_element().has_tag_name("rhythmdb") {
        return Err(ParseError::MissingSection("rhythmdb".to_string()));
    }

    song_entries(&doc)
        .enumerate()
        .map(|(index, entry)| parse_song(index as u64, entry))
        .collect()
}

fn parse_song(id: u64, entry: Node) -> Result<Song, ParseError> {
    let text = |tag: &str| child_text(entry, tag).map(|s| s.to_string());

    let rating = match child_text(entry, "rating") {
        Some(raw) => parse_rating(raw)?,
        None => 0,
    };

    let year = match number(entry, "date")? {
        Some(0) | None => None,
        Some(julian_day) => Some(year_from_julian_day(julian_day)?),
    };

    let format = child_text(entry, "location")
        .and_then(format_from_location)
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    Ok(Song {
        id,
        title: text("title"),
        artist: text("artist"),
        album: text("album"),
        album_artist: text("album-artist"),
        track_number: number(entry, "track-number")?,
        disc_number: number(entry, "disc-number")?,
        year,
        genre: text("genre"),
        rating,
        play_count: number(entry, "play-count")?,
        format,
    })
}

fn number(entry: Node, tag: &str) -> Result<Option<u32>, ParseError> {
    child_text(entry, tag)
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| ParseError::invalid(tag, raw))
        })
        .transpose()
}

fn parse_rating(raw: &str) -> Result<u8, ParseError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid("rating", raw))?;
    if value.fract() != 0.0 || !(0.0..=MAX_RATING as f64).contains(&value) {
        return Err(ParseError::invalid("rating", raw));
    }
    Ok(value as u8)
}

/// Rhythmbox stores dates as Julian day numbers counted from 0001-01-01.
fn year_from_julian_day(day: u32) -> Result<u32, ParseError> {
    i32::try_from(day)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .and_then(|date| u32::try_from(date.year()).ok())
        .ok_or_else(|| ParseError::invalid("date", day))
}

fn format_from_location(location: &str) -> Option<String> {
    let file_name = location.rsplit('/').next()?;
    let decoded = decode(file_name).ok()?;
    match decoded.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_string()),
        _ => None,
    }
}

fn decode_location(location: &str) -> Option<String> {
    let decoded = decode(location).ok()?;
    Some(
        decoded
            .replace("file://localhost", "")
            .replace("file://", ""),
    )
}

/// `file:///home/me/Music/Artist/Album/01%20Song.mp3` -> `Artist/Album/01 Song.mp3`
pub fn relative_location(location: &str) -> Option<String> {
    let decoded = decode_location(location)?;
    let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
    let start = segments.len().saturating_sub(LOCATION_SEGMENTS);
    let relative = segments[start..].join("/");
    (!relative.is_empty()).then_some(relative)
}

pub fn parse_playlists(path: &Path) -> Result<Vec<Playlist>, ParseError> {
    let text = read_xml(path)?;
    let doc = parse_xml(path, &text)?;

    if !doc.root_element().has_tag_name("rhythmdb-playlists") {
        return Err(ParseError::MissingSection("rhythmdb-playlists".to_string()));
    }

    let mut playlists = Vec::new();
    for (index, node) in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("playlist"))
        .enumerate()
    {
        // Smart playlists are queries, not file lists
        if node.attribute("type") == Some("automatic") {
            continue;
        }

        let name = node
            .attribute("name")
            .ok_or_else(|| ParseError::invalid("playlist name", "missing"))?;

        let files = node
            .children()
            .filter(|n| n.has_tag_name("location"))
            .filter_map(|n| n.text())
            .filter_map(|location| {
                let relative = relative_location(location);
                if relative.is_none() {
                    log::warn!(
                        "Ignoring unreadable location {:?} in playlist {:?}",
                        location,
                        name
                    );
                }
                relative
            })
            .collect();

        playlists.push(Playlist::new(index as u64, name, Members::Unresolved(files)));
    }
    Ok(playlists)
}
