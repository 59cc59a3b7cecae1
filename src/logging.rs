//! Logger setup: console plus a size-rotated log file.

use chrono::Local;
use env_logger::{Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{DT_FORMAT, ParserConfig};

/// Append-only file that rolls over to `<name>.1 .. <name>.N` when full.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    size: u64,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            size,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count > 0 {
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0 && self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Copies every record to stderr and, when available, to the log file.
struct TeeWriter {
    file: Option<RotatingFile>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            // A broken log file must not take the console down with it.
            if let Err(e) = file.write_all(buf) {
                let _ = writeln!(io::stderr(), "Warning: could not write log file: {}", e);
                self.file = None;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Installs the global logger. `RUST_LOG` overrides the default `info` level.
pub fn configure_logging(config: &ParserConfig) {
    let file = open_log_file(&config.log_file(), config.log_max_bytes, config.log_backup_count);

    let _ = env_logger::Builder::from_env(Env::new().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "\"{} - [{}] - {}\"",
                Local::now().format(DT_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .try_init();
}

fn open_log_file(path: &Path, max_bytes: u64, backup_count: usize) -> Option<RotatingFile> {
    match RotatingFile::open(path, max_bytes, backup_count) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", path, e);
            None
        }
    }
}
