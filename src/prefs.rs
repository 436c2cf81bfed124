use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::clock::*;
use crate::error::PrefsError;

use log::debug;
use serde::{Deserialize, Serialize};

/// The color theme.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// Display preferences persisted across sessions.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub player1_name: String,
    pub player2_name: String,
    pub theme: Theme,
    pub accent_color: String,
    /// The last selected time format.
    pub time_format: TimeFormat,
}

impl Preferences {
    /// Returns the display name of a side.
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::First => &self.player1_name,
            Side::Second => &self.player2_name,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            player1_name: Side::First.to_string(),
            player2_name: Side::Second.to_string(),
            theme: Theme::Dark,
            accent_color: "#3498DB".into(),
            time_format: TimeFormat::default(),
        }
    }
}

/// A store for preferences.
pub trait PrefsRepository {
    /// Loads the stored preferences, or the defaults if nothing is stored.
    fn load(&self) -> Result<Preferences, PrefsError>;

    /// Stores the preferences.
    fn save(&mut self, prefs: &Preferences) -> Result<(), PrefsError>;
}

/// Preferences stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Constructs a repository backed by a file path.
    pub fn new(path: impl Into<PathBuf>) -> JsonFileRepository {
        JsonFileRepository { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrefsRepository for JsonFileRepository {
    fn load(&self) -> Result<Preferences, PrefsError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no preferences at {}, using defaults", self.path.display());
                Ok(Preferences::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, prefs: &Preferences) -> Result<(), PrefsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(prefs)?)?;
        Ok(())
    }
}

/// Preferences kept in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    stored: Option<Preferences>,
}

impl PrefsRepository for MemoryRepository {
    fn load(&self) -> Result<Preferences, PrefsError> {
        Ok(self.stored.clone().unwrap_or_default())
    }

    fn save(&mut self, prefs: &Preferences) -> Result<(), PrefsError> {
        self.stored = Some(prefs.clone());
        Ok(())
    }
}

/// Supplies time controls and keeps the preferences in sync with a repository.
pub struct ConfigurationProvider<R> {
    repo: R,
    prefs: Preferences,
}

impl<R: PrefsRepository> ConfigurationProvider<R> {
    /// Loads the preferences from a repository.
    pub fn load(repo: R) -> Result<Self, PrefsError> {
        let prefs = repo.load()?;
        Ok(ConfigurationProvider { repo, prefs })
    }

    /// Returns the standard presets.
    pub fn presets(&self) -> &'static [TimeControl] {
        &PRESETS
    }

    /// Returns the selected time format.
    pub fn format(&self) -> TimeFormat {
        self.prefs.time_format
    }

    /// Selects a time format and saves, returning its time control.
    pub fn select(&mut self, format: TimeFormat) -> Result<TimeControl, PrefsError> {
        self.prefs.time_format = format;
        self.repo.save(&self.prefs)?;
        Ok(format.time_control())
    }

    /// Selects a custom time control.
    pub fn select_custom(
        &mut self,
        minutes: u32,
        seconds: u32,
        increment: u32,
    ) -> Result<TimeControl, PrefsError> {
        self.select(TimeFormat::Custom(TimeControl::new(minutes, seconds, increment)))
    }

    /// Returns the preferences.
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Sets the display name of a side and saves.
    pub fn set_name(&mut self, side: Side, name: impl Into<String>) -> Result<(), PrefsError> {
        let name = name.into();
        match side {
            Side::First => self.prefs.player1_name = name,
            Side::Second => self.prefs.player2_name = name,
        }
        self.repo.save(&self.prefs)
    }

    /// Sets the theme and saves.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PrefsError> {
        self.prefs.theme = theme;
        self.repo.save(&self.prefs)
    }

    /// Sets the accent color and saves.
    pub fn set_accent_color(&mut self, color: impl Into<String>) -> Result<(), PrefsError> {
        self.prefs.accent_color = color.into();
        self.repo.save(&self.prefs)
    }

    /// Returns the repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }
}
