use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "pixico.log";
const ARCHIVE_PREFIX: &str = "pixico-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Installs the global subscriber writing to `logs_dir()/pixico.log`.
/// `RUST_LOG` takes precedence over `filter`.
pub fn init(filter: &str) -> Result<(), io::Error> {
    init_in(&logs_dir(), filter)
}

pub fn init_in(log_dir: &Path, filter: &str) -> Result<(), io::Error> {
    let log = RotatingLog::open(log_dir)?;
    let log_path = log.active_path();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(log)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        install_panic_hook();
        tracing::info!(path = %log_path.display(), "logging initialized");
    }
    Ok(())
}

struct ActiveFile {
    file: File,
    written: u64,
}

/// Append-only log file that rolls into `pixico-<millis>.log` once it grows
/// past its size cap, keeping a bounded number of archives.
pub struct RotatingLog {
    dir: PathBuf,
    max_bytes: u64,
    max_archives: usize,
    active: Mutex<ActiveFile>,
}

impl RotatingLog {
    pub fn open(dir: &Path) -> io::Result<Self> {
        Self::with_limits(dir, MAX_LOG_BYTES, MAX_ARCHIVES)
    }

    fn with_limits(dir: &Path, max_bytes: u64, max_archives: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = open_append(&dir.join(LOG_FILE_NAME))?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            max_bytes,
            max_archives,
            active: Mutex::new(ActiveFile { file, written }),
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, ActiveFile>> {
        self.active
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }

    fn append(&self, buf: &[u8]) -> io::Result<usize> {
        let mut active = self.lock()?;
        if active.written >= self.max_bytes {
            self.roll(&mut active)?;
        }
        active.file.write_all(buf)?;
        active.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn roll(&self, active: &mut ActiveFile) -> io::Result<()> {
        active.file.flush()?;
        let archive = self
            .dir
            .join(format!("{ARCHIVE_PREFIX}{}.log", archive_stamp()));
        fs::rename(self.active_path(), archive)?;
        active.file = open_append(&self.active_path())?;
        active.written = 0;
        prune_archives(&self.dir, self.max_archives)
    }
}

pub struct RotatingLogWriter<'a> {
    log: &'a RotatingLog,
}

impl Write for RotatingLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.append(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingLog {
    type Writer = RotatingLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingLogWriter { log: self }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn archive_stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Deletes the oldest archives (by name, which sorts by stamp) beyond `keep`.
fn prune_archives(dir: &Path, keep: usize) -> io::Result<()> {
    let mut archives: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
        })
        .collect();

    archives.sort();
    let excess = archives.len().saturating_sub(keep);
    for stale in &archives[..excess] {
        if let Err(error) = fs::remove_file(stale) {
            eprintln!("[pixico-search] could not remove {}: {error}", stale.display());
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let (file, line) = info
                .location()
                .map(|l| (l.file(), l.line()))
                .unwrap_or(("unknown", 0));
            tracing::error!(file, line, payload = panic_message(info.payload()), "panic");
            prior(info);
        }));
    });
}
