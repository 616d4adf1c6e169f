use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const SETTINGS_FILE: &str = "snap_ticket.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Root of the ticketing service; the project path is appended to it.
    pub api_base_url: String,
    pub project_id: String,
    /// Version reported with each ticket. Defaults to the crate version.
    pub app_version: String,
    /// Overrides the detected host name sent as `device`.
    pub device_name: Option<String>,
    /// Overrides the detected operating system name sent as `osName`.
    pub os_name: Option<String>,
    /// `None` leaves ticket requests without a timeout.
    pub request_timeout_secs: Option<u64>,
    /// Pause between hiding the trigger and capturing the screen.
    pub capture_settle_ms: u64,
    /// Passed to the screen capture backend. The desktop backend ignores it.
    pub include_gpu_surfaces: bool,
    /// Where captured screenshots are written. Falls back to the platform
    /// cache directory.
    pub capture_dir: Option<String>,
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    pub toast_duration: f32,
    /// When enabled the application initialises the logger at debug level.
    pub debug_logging: bool,
    /// Directory for a rolling log file. Console only when unset.
    pub log_dir: Option<String>,
    /// File receiving capture and submission failures for diagnostics.
    pub telemetry_log: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://tickets.example.com/mobile".into(),
            project_id: "default".into(),
            app_version: env!("CARGO_PKG_VERSION").into(),
            device_name: None,
            os_name: None,
            request_timeout_secs: None,
            capture_settle_ms: 100,
            include_gpu_surfaces: false,
            capture_dir: None,
            enable_toasts: true,
            toast_duration: 3.0,
            debug_logging: false,
            log_dir: None,
            telemetry_log: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.capture_settle_ms)
    }

    pub fn capture_dir(&self) -> PathBuf {
        if let Some(dir) = &self.capture_dir {
            return PathBuf::from(dir);
        }
        dirs_next::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("snap_ticket")
            .join("captures")
    }
}
