//! Process-wide `log` backend: warnings and errors go to stderr, everything
//! enabled goes to a size-rotated file under the log directory.

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

/// A log file is rotated once it reaches this size.
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
/// `tunesync.log` plus `tunesync.1.log` to `tunesync.4.log`
const KEPT_FILES: usize = 5;
const FILE_STEM: &str = "tunesync";

fn log_file(dir: &Path, generation: usize) -> PathBuf {
    match generation {
        0 => dir.join(format!("{}.log", FILE_STEM)),
        n => dir.join(format!("{}.{}.log", FILE_STEM, n)),
    }
}

/// Shifts every generation up by one, dropping the oldest.
fn rotate(dir: &Path) {
    for generation in (0..KEPT_FILES - 1).rev() {
        let from = log_file(dir, generation);
        if from.exists() {
            let _ = fs::rename(&from, log_file(dir, generation + 1));
        }
    }
}

pub struct LogState {
    dir: Mutex<Option<PathBuf>>,
    debug: AtomicBool,
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}

impl LogState {
    pub fn new() -> Self {
        Self {
            dir: Mutex::new(None),
            debug: AtomicBool::new(false),
        }
    }

    /// e.g. `~/.local/share/tunesync/logs`
    pub fn default_log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(FILE_STEM)
            .join("logs")
    }

    /// Starts writing to `dir`, creating it if needed.
    pub fn open(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        *self.dir.lock().unwrap_or_else(|e| e.into_inner()) = Some(dir.to_path_buf());
        let started = Local::now().format("%Y-%m-%d %H:%M:%S %Z");
        self.append(Level::Info, &format!("--- session started {} ---", started));
        Ok(())
    }

    /// Active log file, once a directory is open.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.dir
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_deref()
            .map(|dir| log_file(dir, 0))
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        if self.debug.swap(enabled, Ordering::Relaxed) != enabled {
            self.append(
                Level::Info,
                &format!("Debug logging {}", if enabled { "on" } else { "off" }),
            );
        }
    }

    fn append(&self, level: Level, message: &str) {
        let guard = self.dir.lock().unwrap_or_else(|e| e.into_inner());
        let Some(dir) = guard.as_deref() else { return };

        let path = log_file(dir, 0);
        if fs::metadata(&path).is_ok_and(|m| m.len() >= ROTATE_AT_BYTES) {
            rotate(dir);
        }

        let line = format!(
            "{} {:<5} {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

impl Log for LogState {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match metadata.level() {
            Level::Trace => false,
            Level::Debug => self.is_debug(),
            _ => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        if record.level() <= Level::Warn {
            eprintln!("[{}] {}", record.level(), message);
        }
        self.append(record.level(), &message);
    }

    fn flush(&self) {}
}

static LOG_STATE: OnceLock<LogState> = OnceLock::new();

/// Installs the global logger, writing under `log_dir` (or the default
/// data directory when `None`). A directory that cannot be created only
/// disables the file output.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Result<&'static LogState, SetLoggerError> {
    let state = LOG_STATE.get_or_init(LogState::new);
    log::set_logger(state)?;
    log::set_max_level(LevelFilter::Debug);

    let dir = log_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(LogState::default_log_dir);
    if let Err(e) = state.open(&dir) {
        eprintln!("Log directory {:?} is not usable: {}", dir, e);
    }
    state.set_debug(debug);
    Ok(state)
}
