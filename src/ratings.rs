//! Copies song ratings from a parsed library into a Rhythmbox `rhythmdb.xml`.
//!
//! Entries are matched on artist, album and title. The database is edited in
//! place: only rating elements change, every other byte is kept as it was.

use crate::errors::RatingsError;
use crate::models::Library;
use crate::rhythmbox_parser::{child_text, parse_xml, read_xml, song_entries};
use roxmltree::{Node, NodeId};
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RatingsSummary {
    /// Entries whose existing rating was overwritten
    pub edited: usize,
    /// Entries that had no rating yet
    pub added: usize,
}

impl RatingsSummary {
    pub fn total(&self) -> usize {
        self.edited + self.added
    }
}

type SongKey<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

pub fn transfer_ratings(
    library: &Library,
    rhythmdb: &Path,
) -> Result<RatingsSummary, RatingsError> {
    log::info!(
        "Copying song ratings from {:?} to {:?}",
        library.files().first(),
        rhythmdb
    );
    let text = read_xml(rhythmdb)?;
    let (edits, summary) = {
        let doc = parse_xml(rhythmdb, &text)?;
        plan_edits(library, &doc, &text)
    };

    let updated = apply_edits(&text, edits);
    fs::write(rhythmdb, updated).map_err(|source| RatingsError::Write {
        path: rhythmdb.to_path_buf(),
        source,
    })?;

    log::info!(
        "Set ratings on {} song(s): {} edited, {} added",
        summary.total(),
        summary.edited,
        summary.added
    );
    Ok(summary)
}

fn plan_edits(
    library: &Library,
    doc: &roxmltree::Document,
    text: &str,
) -> (Vec<(Range<usize>, String)>, RatingsSummary) {
    let mut entries: HashMap<SongKey, Node> = HashMap::new();
    for entry in song_entries(doc) {
        let key = (
            child_text(entry, "artist"),
            child_text(entry, "album"),
            child_text(entry, "title"),
        );
        entries.entry(key).or_insert(entry);
    }

    // Later songs win when several match the same entry
    let mut planned: HashMap<NodeId, (Node, u8)> = HashMap::new();
    for song in library.songs() {
        let key = (
            song.artist.as_deref(),
            song.album.as_deref(),
            song.title.as_deref(),
        );
        if let Some(entry) = entries.get(&key) {
            planned.insert(entry.id(), (*entry, song.rating));
        }
    }

    let mut summary = RatingsSummary::default();
    let mut edits = Vec::with_capacity(planned.len());
    for (entry, rating) in planned.into_values() {
        let element = format!("<rating>{}</rating>", rating);
        match entry.children().find(|n| n.has_tag_name("rating")) {
            Some(existing) => {
                match existing.first_child().filter(|n| n.is_text()) {
                    Some(value) => edits.push((value.range(), rating.to_string())),
                    None => edits.push((existing.range(), element)),
                }
                summary.edited += 1;
            }
            None => {
                let range = entry.range();
                match text[range.clone()].rfind("</entry>") {
                    Some(offset) => {
                        let at = range.start + offset;
                        edits.push((at..at, format!("  {}\n  ", element)));
                        summary.added += 1;
                    }
                    None => log::warn!(
                        "Cannot add a rating to an empty entry at byte {}",
                        range.start
                    ),
                }
            }
        }
    }
    (edits, summary)
}

fn apply_edits(text: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut updated = text.to_string();
    for (range, replacement) in edits {
        updated.replace_range(range, &replacement);
    }
    updated
}
