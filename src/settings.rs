//! Persisted settings and the shared UI-mode context
//!
//! Settings live in a single JSON file. Every field carries a serde default,
//! so files written by older versions load with missing fields defaulted and
//! unknown fields ignored. After loading, the schema version is bumped and
//! calibration values are clamped into range.

use crate::calibration::CalibrationProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const SCHEMA_VERSION: u32 = 2;

pub const SAFE_MARGIN_TV_PX: u32 = 48;
pub const SAFE_MARGIN_DESKTOP_PX: u32 = 24;
pub const SAFE_MARGIN_TOUCH_PX: u32 = 16;

#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "settings file {}: {}", path.display(), source)
            }
            SettingsError::Parse { path, source } => {
                write!(f, "settings file {} is not valid JSON: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    Tv,
    Desktop,
    Touch,
}

impl UiMode {
    pub fn safe_margin(&self) -> u32 {
        match self {
            UiMode::Tv => SAFE_MARGIN_TV_PX,
            UiMode::Desktop => SAFE_MARGIN_DESKTOP_PX,
            UiMode::Touch => SAFE_MARGIN_TOUCH_PX,
        }
    }

    /// Guess from the terminal size: very wide terminals are usually a TV
    /// across the room, very narrow ones a phone or tablet.
    pub fn detect(columns: u16) -> Self {
        match columns {
            0..=59 => UiMode::Touch,
            60..=199 => UiMode::Desktop,
            _ => UiMode::Tv,
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UiMode::Tv => "tv",
            UiMode::Desktop => "desktop",
            UiMode::Touch => "touch",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    pub calibration: CalibrationProfile,
    pub ui_mode_override: Option<UiMode>,
    pub high_contrast: bool,
    pub test_count: u32,
    pub last_test_date: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_version: SCHEMA_VERSION,
            calibration: CalibrationProfile::default(),
            ui_mode_override: None,
            high_contrast: false,
            test_count: 0,
            last_test_date: None,
        }
    }
}

/// Where loaded settings came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// No file on disk
    Defaults,
    Current,
    Migrated { from: u32 },
}

#[derive(Clone, Debug)]
pub struct Loaded {
    pub settings: Settings,
    pub source: LoadSource,
}

impl Settings {
    /// Read settings from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Loaded, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Loaded {
                    settings: Settings::default(),
                    source: LoadSource::Defaults,
                });
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_json(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse and migrate a settings document
    pub fn from_json(content: &str) -> Result<Loaded, serde_json::Error> {
        // Files written before versioning carry no schema_version at all
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let stored_version = raw
            .get("schema_version")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
            .unwrap_or(1);

        let settings: Settings = serde_json::from_value(raw)?;
        let (settings, source) = settings.migrate(stored_version);
        Ok(Loaded { settings, source })
    }

    fn migrate(mut self, stored_version: u32) -> (Settings, LoadSource) {
        let source = if stored_version < SCHEMA_VERSION {
            // The correction factor did not exist before version 2
            self.calibration.correction_factor = CalibrationProfile::default().correction_factor;
            LoadSource::Migrated {
                from: stored_version,
            }
        } else {
            LoadSource::Current
        };

        self.schema_version = SCHEMA_VERSION;
        self.calibration = self.calibration.clamped();
        (self, source)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Back to default calibration; the UI-mode override survives
    pub fn reset(&mut self) {
        let ui_mode_override = self.ui_mode_override;
        *self = Settings {
            ui_mode_override,
            test_count: self.test_count,
            last_test_date: self.last_test_date,
            high_contrast: self.high_contrast,
            ..Settings::default()
        };
    }

    pub fn full_reset(&mut self) {
        *self = Settings::default();
    }

    /// Count a finished test or chart session
    pub fn record_test(&mut self, at: DateTime<Utc>) {
        self.test_count = self.test_count.saturating_add(1);
        self.last_test_date = Some(at);
    }
}

#[derive(Debug)]
struct UiModeState {
    detected: UiMode,
    promoted: Option<UiMode>,
    override_mode: Option<UiMode>,
}

/// Write side of the UI-mode context, held by whoever owns the settings
#[derive(Debug)]
pub struct UiModeWriter {
    state: Rc<RefCell<UiModeState>>,
}

/// Read side of the UI-mode context; cheap to clone and hand out
#[derive(Clone, Debug)]
pub struct UiModeReader {
    state: Rc<RefCell<UiModeState>>,
}

/// Create a context seeded with the detected mode and the persisted override
pub fn ui_mode_context(detected: UiMode, override_mode: Option<UiMode>) -> (UiModeWriter, UiModeReader) {
    let state = Rc::new(RefCell::new(UiModeState {
        detected,
        promoted: None,
        override_mode,
    }));
    (
        UiModeWriter {
            state: Rc::clone(&state),
        },
        UiModeReader { state },
    )
}

impl UiModeWriter {
    pub fn set_override(&self, mode: Option<UiMode>) {
        self.state.borrow_mut().override_mode = mode;
    }

    /// Mirror the override stored in `settings`
    pub fn sync(&self, settings: &Settings) {
        self.set_override(settings.ui_mode_override);
    }

    pub fn reader(&self) -> UiModeReader {
        UiModeReader {
            state: Rc::clone(&self.state),
        }
    }
}

impl UiModeReader {
    /// Override, then session promotion, then detection
    pub fn mode(&self) -> UiMode {
        let state = self.state.borrow();
        state
            .override_mode
            .or(state.promoted)
            .unwrap_or(state.detected)
    }

    pub fn override_mode(&self) -> Option<UiMode> {
        self.state.borrow().override_mode
    }

    pub fn detected(&self) -> UiMode {
        self.state.borrow().detected
    }

    pub fn safe_margin(&self) -> u32 {
        self.mode().safe_margin()
    }

    /// Session-only promotion after remote-style navigation; no effect under an override
    pub fn promote_to_tv(&self) {
        self.promote(UiMode::Tv);
    }

    pub fn promote_to_touch(&self) {
        self.promote(UiMode::Touch);
    }

    fn promote(&self, mode: UiMode) {
        let mut state = self.state.borrow_mut();
        if state.override_mode.is_none() {
            state.promoted = Some(mode);
        }
    }
}
