//! Console logging with an optional JSON-lines event file
//!
//! While the terminal is in raw mode the console sink is muted and only the
//! JSON file (if any) receives events.

use chrono::Utc;
use serde_json::json;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

pub const LOG_JSON_ENV: &str = "TV_VISUAL_CHECK_LOG_JSON";

pub struct Logger {
    json_file: Option<File>,
    debug: bool,
    console_muted: bool,
}

impl Logger {
    /// `path` wins over the environment variable
    pub fn from_env(path: Option<PathBuf>, debug: bool) -> io::Result<Self> {
        let path = path.or_else(|| std::env::var(LOG_JSON_ENV).ok().map(PathBuf::from));
        Self::new(path, debug)
    }

    pub fn new(path: Option<PathBuf>, debug: bool) -> io::Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                Some(OpenOptions::new().create(true).append(true).open(path)?)
            }
            None => None,
        };
        Ok(Self {
            json_file,
            debug,
            console_muted: false,
        })
    }

    /// Console output off while the terminal is in raw mode
    pub fn set_console_muted(&mut self, muted: bool) {
        self.console_muted = muted;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        if !self.console_muted {
            println!("{}", message.as_ref());
        }
        self.event("info", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        if !self.console_muted {
            eprintln!("{}", message.as_ref());
        }
        self.event("warn", message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        if !self.console_muted {
            eprintln!("{}", message.as_ref());
        }
        self.event("error", message.as_ref());
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        if !self.debug {
            return;
        }
        if !self.console_muted {
            eprintln!("[debug] {}", message.as_ref());
        }
        self.event("debug", message.as_ref());
    }

    pub fn event(&mut self, level: &str, message: &str) {
        let Some(file) = &mut self.json_file else {
            return;
        };

        let entry = json!({
            "ts_ms": Utc::now().timestamp_millis(),
            "level": level,
            "message": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}
