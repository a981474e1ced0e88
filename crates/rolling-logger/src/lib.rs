//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes to `<dir>/<app>.log`, rotating
//! to `<app>.log.1`, `<app>.log.2`, ... once the file passes a size cap. The
//! last lines written are also kept in a fixed-size ring so a UI can show
//! recent activity without reading the file. `log` records are bridged in by
//! `tracing-subscriber` on init.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Default size cap of the active log file
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Default number of rotated files kept besides the active one
pub const DEFAULT_MAX_FILES: usize = 3;
/// Default capacity of the in-memory ring
pub const DEFAULT_RING_CAPACITY: usize = 200;

static GLOBAL_WRITER: OnceLock<RollingFileWriter> = OnceLock::new();

/// Rotation and ring settings
#[derive(Debug, Clone)]
pub struct RollingConfig {
    pub max_bytes: u64,
    pub max_files: usize,
    pub ring_capacity: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            ring_capacity: DEFAULT_RING_CAPACITY,
        }
    }
}

struct RollingState {
    path: PathBuf,
    file: File,
    written: u64,
    config: RollingConfig,
    ring: VecDeque<String>,
    partial: String,
}

impl RollingState {
    fn rotated_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.config.max_files == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.config.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.config.max_files).rev() {
            let from = self.rotated_path(n);
            if from.exists() {
                fs::rename(&from, self.rotated_path(n + 1))?;
            }
        }
        fs::rename(&self.path, self.rotated_path(1))?;

        self.file = File::create(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.ring.len() == self.config.ring_capacity {
                self.ring.pop_front();
            }
            if self.config.ring_capacity > 0 {
                self.ring.push_back(line.trim_end().to_string());
            }
        }
    }
}

/// Size-rotating file writer shared by every subscriber thread
#[derive(Clone)]
pub struct RollingFileWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFileWriter {
    /// Open `<dir>/<app_name>.log` in append mode
    pub fn new(dir: &Path, app_name: &str, config: RollingConfig) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                path,
                file,
                written,
                ring: VecDeque::with_capacity(config.ring_capacity),
                config,
                partial: String::new(),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RollingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Active log file path
    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    /// Most recent complete lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().ring.iter().cloned().collect()
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.written > 0 && state.written + buf.len() as u64 > state.config.max_bytes {
            state.rotate()?;
        }
        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFileWriter {
    type Writer = RollingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the global subscriber writing under `log_dir`.
///
/// Fails if a global subscriber is already set.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, RollingConfig::default())
}

pub fn init_logger_with(log_dir: PathBuf, app_name: &str, config: RollingConfig) -> Result<(), String> {
    let writer = RollingFileWriter::new(&log_dir, app_name, config)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    let _ = GLOBAL_WRITER.set(writer);
    log::info!("{} logging to {}", app_name, log_dir.display());
    Ok(())
}

/// Lines recently written by the global logger; empty before `init_logger`
pub fn recent_lines() -> Vec<String> {
    GLOBAL_WRITER.get().map(|w| w.recent_lines()).unwrap_or_default()
}
