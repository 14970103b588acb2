use crate::paths::playlist_stem;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Generic playlist file extension
pub const EXTENSION: &str = "m3u";

/// Removes every generic playlist file directly inside `folder`.
pub fn remove_generic_playlists(folder: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(folder)?.flatten() {
        let path = entry.path();
        // Matches on the name so a bare `.m3u` is caught too
        let is_playlist = entry
            .file_name()
            .to_string_lossy()
            .ends_with(&format!(".{}", EXTENSION));
        if is_playlist && entry.file_type().is_ok_and(|t| t.is_file()) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::debug!("Could not remove old playlist {:?}: {}", path, e),
            }
        }
    }
    Ok(removed)
}

pub fn generic_playlist_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.{}", playlist_stem(name), EXTENSION))
}

/// Appends one path per line, creating the file on first use.
pub fn append_generic_playlist(path: &Path, files: &[String]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut body = String::new();
    for line in files {
        body.push_str(line);
        body.push('\n');
    }
    file.write_all(body.as_bytes())
}

/// Escapes text for use inside an XML attribute or element.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes all playlists into a single Rhythmbox `playlists.xml` document.
pub struct AggregateWriter {
    file: File,
}

impl AggregateWriter {
    /// Replaces any previous document at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(b"<?xml version=\"1.0\"?>\n<rhythmdb-playlists>")?;
        Ok(Self { file })
    }

    pub fn write_playlist(&mut self, id: u64, name: &str, urls: &[String]) -> io::Result<()> {
        let mut block = format!(
            "\n  <playlist name=\"{}\" show-browser=\"true\" browser-position=\"{}\" search-type=\"search-match\" type=\"static\">",
            escape_xml(name),
            id
        );
        for url in urls {
            block.push_str("\n    <location>");
            block.push_str(&escape_xml(url));
            block.push_str("</location>");
        }
        block.push_str("\n  </playlist>");
        self.file.write_all(block.as_bytes())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.file.write_all(b"\n</rhythmdb-playlists>\n")?;
        self.file.sync_all()
    }
}
