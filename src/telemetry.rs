use crate::feedback::error::Failure;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Receives raw failure details for operators. Never affects what the user sees.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &Failure);
}

/// Appends one timestamped line per failure.
pub struct FileReporter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl ErrorReporter for FileReporter {
    fn report(&self, failure: &Failure) {
        let _guard = self.lock.lock();
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(
                file,
                "{} - {} - {}",
                Local::now().to_rfc3339(),
                failure.kind,
                failure.detail
            );
        } else {
            tracing::warn!(path = %self.path.display(), "telemetry log not writable");
        }
    }
}
