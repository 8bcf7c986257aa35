//! Log sinks.
//!
//! Access lines go to stdout or an append-only file; errors go to
//! stderr or their own file. The writer is installed once at startup
//! and never reconfigured afterwards.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe pair of access and error sinks.
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Info shares the access sink.
    pub fn write_info(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open or create a log file for appending, creating parent
/// directories as needed.
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn file_target(path: &str) -> io::Result<LogTarget> {
    Ok(LogTarget::File(Mutex::new(open_log_file(path)?)))
}

/// Install the global log writer. Called once at startup; fails if
/// the configured log files cannot be opened.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let access = match access_log_file {
        Some(path) => file_target(path)?,
        None => LogTarget::Stdout,
    };
    let error = match error_log_file {
        Some(path) => file_target(path)?,
        None => LogTarget::Stderr,
    };

    LOG_WRITER.set(LogWriter { access, error }).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "log writer already initialized")
    })
}

/// The global writer, if [`init`] has run.
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
