use crate::config::{PlaylistOutput, SyncConfig, DEFAULT_SONGS_WEIGHT};
use crate::errors::SyncError;
use crate::models::Library;
use crate::paths;
use crate::playlist_writer::{self, AggregateWriter};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::mpsc::Sender;

/// Receives progress percentages (0 to 100) while a sync runs.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

impl ProgressSink for Sender<f64> {
    fn report(&mut self, percent: f64) {
        // A dropped receiver only means nobody is watching
        let _ = self.send(percent);
    }
}

/// Monotonic progress counter in front of a sink.
struct Progress<P> {
    value: f64,
    sink: P,
}

impl<P: ProgressSink> Progress<P> {
    fn new(sink: P) -> Self {
        Self { value: 0.0, sink }
    }

    fn set(&mut self, percent: f64) {
        if percent.is_nan() {
            return;
        }
        self.value = percent.clamp(self.value, 100.0);
        self.sink.report(self.value);
    }

    fn increment(&mut self, delta: f64) {
        self.set(self.value + delta);
    }
}

/// Outcome of one sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Songs and playlists that could not be synced, in the order they failed.
    pub errors: Vec<SyncError>,
    pub copied: usize,
    pub pruned: usize,
    pub playlists_written: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// artist folder -> album folder -> file names
type Layout = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Converges a destination folder to mirror a library.
pub struct LibrarySync<'a, P: ProgressSink> {
    library: &'a Library,
    config: &'a SyncConfig,
    songs_weight: f64,
    progress: Progress<P>,
}

impl<'a, P: ProgressSink> LibrarySync<'a, P> {
    pub fn new(library: &'a Library, config: &'a SyncConfig, progress: P) -> Self {
        Self {
            library,
            config,
            songs_weight: songs_weight(config),
            progress: Progress::new(progress),
        }
    }

    pub fn run(mut self) -> SyncReport {
        log::info!(
            "Syncing {} songs by {} artists from {:?} to {:?}",
            self.library.songs().len(),
            self.library.artist_count(),
            self.config.source_folder,
            self.config.destination_folder
        );
        let mut report = SyncReport::default();
        let songs_share = 100.0 * self.songs_weight;

        self.progress.set(0.0);
        self.sync_songs(songs_share, &mut report);
        self.progress.set(songs_share);
        self.sync_playlists(100.0 - songs_share, &mut report);
        self.progress.set(100.0);

        log::info!(
            "Sync completed: {} copied, {} pruned, {} playlists, {} errors",
            report.copied,
            report.pruned,
            report.playlists_written,
            report.errors.len()
        );
        report
    }

    fn sync_songs(&mut self, share: f64, report: &mut SyncReport) {
        log::info!("Syncing songs");
        let start = self.progress.value;
        let songs = self.library.songs();
        let per_song = if songs.is_empty() {
            0.0
        } else {
            share / 2.0 / songs.len() as f64
        };

        let source_root = &self.config.source_folder;
        let destination_root = &self.config.destination_folder;
        let mut layout = Layout::new();

        for song in songs {
            let artist = paths::artist_folder(song);
            let album = paths::album_folder(song);
            let file = paths::file_name(song);
            let relative = paths::file_path(song);

            let source = source_root.join(&artist).join(&album).join(&file);
            let destination_folder = destination_root.join(&artist).join(&album);
            let destination = destination_folder.join(&file);

            layout
                .entry(artist)
                .or_default()
                .entry(album)
                .or_default()
                .insert(file);

            if !source.is_file() {
                log::warn!("Song not found in the source folder ({:?})", source);
                report.errors.push(SyncError::MissingSourceFile {
                    id: song.id,
                    path: relative,
                });
            } else if !destination.exists() {
                match copy_song(&source, &destination_folder, &destination) {
                    Ok(()) => {
                        log::debug!("Copied {}", relative);
                        report.copied += 1;
                    }
                    Err(e) => {
                        log::warn!("Song could not be copied ({}): {}", relative, e);
                        report.errors.push(SyncError::CopyFailure {
                            id: song.id,
                            path: relative,
                            source: e,
                        });
                    }
                }
            }
            self.progress.increment(per_song);
        }

        self.progress.set(start + share / 2.0);
        report.pruned = self.prune(&layout, share / 2.0);
        log::info!("Songs synced");
    }

    /// Removes destination folders and files that are not part of `layout`.
    /// Root-level files are left for the playlists phase.
    fn prune(&mut self, layout: &Layout, share: f64) -> usize {
        let root = &self.config.destination_folder;
        let artists: Vec<fs::DirEntry> = match fs::read_dir(root) {
            Ok(entries) => entries
                .flatten()
                .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
                .collect(),
            Err(e) => {
                log::debug!("Nothing to prune in {:?}: {}", root, e);
                return 0;
            }
        };
        let per_artist = if artists.is_empty() {
            0.0
        } else {
            share / artists.len() as f64
        };

        let mut pruned = 0;
        for artist in artists {
            let name = artist.file_name().to_string_lossy().into_owned();
            match layout.get(&name) {
                None => pruned += remove_node(&artist.path()) as usize,
                Some(albums) => {
                    for album in children(&artist.path()) {
                        let album_name = album.file_name().to_string_lossy().into_owned();
                        match albums.get(&album_name) {
                            None => pruned += remove_node(&album.path()) as usize,
                            Some(files) => {
                                for file in children(&album.path()) {
                                    let file_name = file.file_name().to_string_lossy().into_owned();
                                    if !files.contains(&file_name) {
                                        pruned += remove_node(&file.path()) as usize;
                                    }
                                }
                            }
                        }
                    }
                }
            }
            self.progress.increment(per_artist);
        }
        pruned
    }

    fn sync_playlists(&mut self, share: f64, report: &mut SyncReport) {
        log::info!("Syncing playlists");
        let playlists = self.library.playlists();
        let per_playlist = if playlists.is_empty() {
            0.0
        } else {
            share / playlists.len() as f64
        };
        let root = &self.config.destination_folder;

        let prepared = fs::create_dir_all(root)
            .and_then(|_| playlist_writer::remove_generic_playlists(root));
        if let Err(e) = prepared {
            log::error!("Destination folder {:?} is not writable: {}", root, e);
            self.fail_all_playlists(&e, report);
            return;
        }

        match &self.config.playlists {
            PlaylistOutput::Generic => {
                for playlist in playlists {
                    let path = playlist_writer::generic_playlist_path(root, &playlist.name);
                    let files = playlist.files(self.library);
                    match playlist_writer::append_generic_playlist(&path, &files) {
                        Ok(()) => report.playlists_written += 1,
                        Err(e) => {
                            log::warn!("Playlist could not be created ({:?}): {}", path, e);
                            report.errors.push(SyncError::PlaylistWriteFailure {
                                id: playlist.id,
                                name: playlist.name.clone(),
                                source: e,
                            });
                        }
                    }
                    self.progress.increment(per_playlist);
                }
            }
            PlaylistOutput::Aggregate { path } => {
                let mut writer = match AggregateWriter::create(path) {
                    Ok(writer) => writer,
                    Err(e) => {
                        log::error!("Playlists file {:?} could not be created: {}", path, e);
                        self.fail_all_playlists(&e, report);
                        return;
                    }
                };

                let mut written = 0;
                for playlist in playlists {
                    let urls = playlist.urls(self.library, root);
                    match writer.write_playlist(playlist.id, &playlist.name, &urls) {
                        Ok(()) => written += 1,
                        Err(e) => {
                            log::warn!("Playlist could not be written ({}): {}", playlist.name, e);
                            report.errors.push(SyncError::PlaylistWriteFailure {
                                id: playlist.id,
                                name: playlist.name.clone(),
                                source: e,
                            });
                        }
                    }
                    self.progress.increment(per_playlist);
                }

                match writer.finish() {
                    Ok(()) => report.playlists_written += written,
                    Err(e) => {
                        log::error!("Playlists file {:?} could not be completed: {}", path, e);
                        let failed: BTreeSet<u64> = report
                            .errors
                            .iter()
                            .filter_map(|err| match err {
                                SyncError::PlaylistWriteFailure { id, .. } => Some(*id),
                                _ => None,
                            })
                            .collect();
                        for playlist in playlists.iter().filter(|p| !failed.contains(&p.id)) {
                            report.errors.push(SyncError::PlaylistWriteFailure {
                                id: playlist.id,
                                name: playlist.name.clone(),
                                source: io::Error::new(e.kind(), e.to_string()),
                            });
                        }
                    }
                }
            }
        }
        log::info!("Playlists synced");
    }

    fn fail_all_playlists(&self, cause: &io::Error, report: &mut SyncReport) {
        for playlist in self.library.playlists() {
            report.errors.push(SyncError::PlaylistWriteFailure {
                id: playlist.id,
                name: playlist.name.clone(),
                source: io::Error::new(cause.kind(), cause.to_string()),
            });
        }
    }
}

/// Share of the progress bar for the songs phase, kept within `[0, 1]`.
fn songs_weight(config: &SyncConfig) -> f64 {
    if config.songs_weight.is_nan() {
        log::warn!("Invalid songs weight, using {}", DEFAULT_SONGS_WEIGHT);
        return DEFAULT_SONGS_WEIGHT;
    }
    config.songs_weight.clamp(0.0, 1.0)
}

/// Loads the library named by `config` and mirrors it.
pub fn sync_library<P: ProgressSink>(
    config: &SyncConfig,
    progress: P,
) -> Result<SyncReport, crate::errors::ParseError> {
    let library = Library::load(&config.source)?;
    Ok(LibrarySync::new(&library, config, progress).run())
}

fn copy_song(source: &Path, folder: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(folder)?;
    fs::copy(source, destination)?;
    Ok(())
}

fn children(dir: &Path) -> Vec<fs::DirEntry> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().collect(),
        Err(e) => {
            log::debug!("Could not list {:?}: {}", dir, e);
            Vec::new()
        }
    }
}

/// Best-effort removal. Failures leave a stale node behind and are not errors.
fn remove_node(path: &Path) -> bool {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            log::debug!("Pruned {:?}", path);
            true
        }
        Err(e) => {
            log::debug!("Could not prune {:?}: {}", path, e);
            false
        }
    }
}
