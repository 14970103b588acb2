//! Canonical destination paths for songs.
//!
//! Every path is derived only from song metadata, so the same song always maps
//! to the same relative path. The sync diff relies on that.

use crate::models::Song;
use std::path::Path;
use url::Url;

/// Characters that never survive into a path segment.
pub const SPECIAL_CHARACTERS: &[char] = &[
    '/', '\\', '?', '*', '@', '$', '€', '=', ':', '~', '[', ']', '{', '}', '<', '>', '^', '"',
    '´', '’',
];

const REPLACEMENT: char = '_';

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Makes a string safe to use as a single path segment.
pub fn sanitize(value: &str) -> String {
    let mut sanitized: String = value
        .chars()
        .map(|c| if SPECIAL_CHARACTERS.contains(&c) { REPLACEMENT } else { c })
        .collect();

    // Hidden files and trailing dots
    if sanitized.starts_with('.') {
        sanitized.replace_range(..1, "_");
    }
    if sanitized.ends_with('.') {
        let last = sanitized.len() - 1;
        sanitized.replace_range(last.., "_");
    }
    sanitized
}

pub const UNNAMED_PLAYLIST: &str = "Unnamed Playlist";

/// Values are used as-is, surrounding whitespace included.
fn segment(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => sanitize(v),
        _ => fallback.to_string(),
    }
}

/// File stem of a generic playlist.
pub fn playlist_stem(name: &str) -> String {
    segment(Some(name), UNNAMED_PLAYLIST)
}

pub fn artist_folder(song: &Song) -> String {
    segment(song.artist.as_deref(), UNKNOWN_ARTIST)
}

pub fn album_folder(song: &Song) -> String {
    segment(song.album.as_deref(), UNKNOWN_ALBUM)
}

/// File name of the song inside its album folder.
pub fn file_name(song: &Song) -> String {
    let title = segment(song.title.as_deref(), UNKNOWN_TITLE);
    let prefix = match (song.disc_number, song.track_number) {
        (Some(disc), Some(track)) => format!("{}-{:02} ", disc, track),
        (None, Some(track)) => format!("{:02} ", track),
        (_, None) => String::new(),
    };
    format!("{}{}.{}", prefix, title, song.format)
}

/// `artist/album`
pub fn folder_path(song: &Song) -> String {
    format!("{}/{}", artist_folder(song), album_folder(song))
}

/// `artist/album/[disc-]NN title.format`
pub fn file_path(song: &Song) -> String {
    format!("{}/{}", folder_path(song), file_name(song))
}

/// Absolute `file://` URL of a relative path placed under `folder`.
pub fn file_url(folder: &Path, relative: &str) -> Option<String> {
    let mut full = std::path::absolute(folder).ok()?;
    full.extend(relative.split('/'));
    Url::from_file_path(&full).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_the_pink() -> Song {
        Song {
            title: Some("Sink the Pink".to_string()),
            artist: Some("AC/DC".to_string()),
            album: Some("Who Made Who".to_string()),
            track_number: Some(3),
            ..Song::new(1)
        }
    }

    #[test]
    fn derives_scenario_path() {
        assert_eq!(file_path(&sink_the_pink()), "AC_DC/Who Made Who/03 Sink the Pink.mp3");
        assert_eq!(folder_path(&sink_the_pink()), "AC_DC/Who Made Who");
    }

    #[test]
    fn derivation_is_deterministic() {
        let song = sink_the_pink();
        assert_eq!(file_path(&song), file_path(&song.clone()));
    }

    #[test]
    fn disc_number_prefixes_track() {
        let song = Song {
            disc_number: Some(2),
            track_number: Some(11),
            format: "m4a".to_string(),
            ..sink_the_pink()
        };
        assert_eq!(file_name(&song), "2-11 Sink the Pink.m4a");
    }

    #[test]
    fn missing_track_number_leaves_title_alone() {
        let song = Song {
            disc_number: Some(1),
            track_number: None,
            ..sink_the_pink()
        };
        assert_eq!(file_name(&song), "Sink the Pink.mp3");
    }

    #[test]
    fn missing_metadata_falls_back() {
        let song = Song::new(4);
        assert_eq!(file_path(&song), "Unknown Artist/Unknown Album/Unknown Title.mp3");
    }

    #[test]
    fn whitespace_is_kept() {
        let song = Song {
            artist: Some(" Green Day ".to_string()),
            ..sink_the_pink()
        };
        assert_eq!(artist_folder(&song), " Green Day ");
    }

    #[test]
    fn empty_playlist_name_gets_a_stem() {
        assert_eq!(playlist_stem(""), "Unnamed Playlist");
        assert_eq!(playlist_stem("Road/Trip"), "Road_Trip");
    }

    #[test]
    fn sanitize_replaces_every_special_character() {
        let all: String = SPECIAL_CHARACTERS.iter().collect();
        let sanitized = sanitize(&format!("a{}b", all));

        assert!(!sanitized.contains(SPECIAL_CHARACTERS));
        assert_eq!(sanitized.chars().count(), all.chars().count() + 2);
        assert_eq!(sanitize("What? <Live> \"1999\""), "What_ _Live_ _1999_");
    }

    #[test]
    fn sanitize_guards_leading_and_trailing_dots() {
        assert_eq!(sanitize(".hidden"), "_hidden");
        assert_eq!(sanitize("Vol. 2."), "Vol. 2_");
        assert_eq!(sanitize("..."), "_._");
        assert_eq!(sanitize("."), "_");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for value in ["AC/DC", "...", "Sigur Rós: ()", "a€b´c’d", "..x..", ""] {
            let once = sanitize(value);
            assert_eq!(sanitize(&once), once);
        }
    }
}
