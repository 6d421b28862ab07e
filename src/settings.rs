//! Game settings
//!
//! Loaded once per session from an optional JSON file and validated before
//! the first tick. The simulation only ever sees a [`ValidatedSettings`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::collision::TieBreak;

/// Smallest play area the layout code supports
pub const MIN_SCREEN: (f32, f32) = (400.0, 300.0);
/// Largest play area accepted
pub const MAX_SCREEN: (f32, f32) = (3840.0, 2160.0);

/// All tunables for one session. Distances are in world units, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,
    /// Horizontal margin the fleet may not cross
    pub side_margin: f32,

    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: f32,
    /// Frame deltas above this are clamped
    pub max_frame_secs: f32,
    /// Maximum ticks run for a single rendered frame
    pub max_substeps: u32,
    /// How long LEVEL_CLEAR lasts before the next fleet arrives
    pub level_transition_secs: f32,

    // === Ship ===
    pub ship_width: f32,
    pub ship_height: f32,
    pub ship_speed: f32,
    /// Distance between the ship's bottom edge and the bottom of the screen
    pub ship_bottom_margin: f32,
    pub fire_cooldown: f32,
    pub starting_lives: u32,

    // === Bullets ===
    pub bullet_width: f32,
    pub bullet_height: f32,
    pub bullet_speed: f32,
    pub projectile_cap: usize,

    // === Fleet ===
    pub fleet_rows: usize,
    pub fleet_cols: usize,
    pub alien_width: f32,
    pub alien_height: f32,
    /// Gap between neighbouring aliens, both axes
    pub alien_gap: f32,
    /// Distance from the top of the screen to the first row
    pub fleet_top: f32,
    pub fleet_speed: f32,
    pub drop_step: f32,
    pub alien_points: u32,
    /// Fleet speed multiplier applied per level
    pub speedup_scale: f32,
    /// Extra speed as the fleet thins out; 0 disables it
    pub thinning_boost: f32,
    pub tie_break: TieBreak,

    // === HUD ===
    pub show_fps: bool,

    // === Sound ===
    /// Effect volume, 0.0 to 1.0. Only used with the `audio` feature.
    pub sound_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 1200.0,
            screen_height: 800.0,
            side_margin: 0.0,

            tick_rate: 60.0,
            max_frame_secs: 0.25,
            max_substeps: 8,
            level_transition_secs: 1.0,

            ship_width: 60.0,
            ship_height: 48.0,
            ship_speed: 300.0,
            ship_bottom_margin: 10.0,
            fire_cooldown: 0.25,
            starting_lives: 3,

            bullet_width: 3.0,
            bullet_height: 15.0,
            bullet_speed: 600.0,
            projectile_cap: 3,

            fleet_rows: 4,
            fleet_cols: 8,
            alien_width: 60.0,
            alien_height: 40.0,
            alien_gap: 60.0,
            fleet_top: 40.0,
            fleet_speed: 60.0,
            drop_step: 10.0,
            alien_points: 50,
            speedup_scale: 1.1,
            thinning_boost: 1.0,
            tie_break: TieBreak::InsertionOrder,

            show_fps: true,

            sound_volume: 0.3,
        }
    }
}

/// Reasons a settings bundle is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// A value that must be strictly positive (and finite) is not
    NotPositive { field: &'static str, value: f32 },
    /// A value that must be zero or more is negative or not finite
    Negative { field: &'static str, value: f32 },
    /// A multiplier that must not shrink anything is below 1
    BelowOne { field: &'static str, value: f32 },
    /// A fraction is outside 0 to 1
    NotAFraction { field: &'static str, value: f32 },
    /// A count that must be at least one is zero
    ZeroCount { field: &'static str },
    /// The play area is outside the supported range
    ScreenOutOfRange { width: f32, height: f32 },
    /// The fleet grid is wider than the space between the margins
    FleetTooWide { required: f32, available: f32 },
    /// The ship does not fit on screen
    ShipDoesNotFit,
    /// The fleet starts at or below the player's row
    FleetTooTall { fleet_bottom: f32, player_top: f32 },
    /// The settings file could not be read
    Io(String),
    /// The settings file is not valid JSON for [`Settings`]
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::NotPositive { field, value } => {
                write!(f, "{field} must be greater than zero (got {value})")
            }
            SettingsError::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            SettingsError::BelowOne { field, value } => {
                write!(f, "{field} must be 1 or more (got {value})")
            }
            SettingsError::NotAFraction { field, value } => {
                write!(f, "{field} must be between 0 and 1 (got {value})")
            }
            SettingsError::ZeroCount { field } => write!(f, "{field} must be at least 1"),
            SettingsError::ScreenOutOfRange { width, height } => write!(
                f,
                "screen {width}x{height} outside supported range {}x{} to {}x{}",
                MIN_SCREEN.0, MIN_SCREEN.1, MAX_SCREEN.0, MAX_SCREEN.1
            ),
            SettingsError::FleetTooWide {
                required,
                available,
            } => write!(
                f,
                "fleet needs {required} units of width but only {available} fit between the margins"
            ),
            SettingsError::ShipDoesNotFit => write!(f, "ship does not fit inside the screen"),
            SettingsError::FleetTooTall {
                fleet_bottom,
                player_top,
            } => write!(
                f,
                "fleet bottom edge {fleet_bottom} starts at or below the player row {player_top}"
            ),
            SettingsError::Io(msg) => write!(f, "could not read settings: {msg}"),
            SettingsError::Parse(msg) => write!(f, "invalid settings file: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// A settings bundle that passed [`Settings::validate`]. Immutable for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(Settings);

impl std::ops::Deref for ValidatedSettings {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.0
    }
}

impl ValidatedSettings {
    /// Fixed simulation step in seconds
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.0.tick_rate
    }

    /// Number of ticks LEVEL_CLEAR lasts, never less than one
    pub fn level_transition_ticks(&self) -> u32 {
        ((self.0.level_transition_secs * self.0.tick_rate).round() as u32).max(1)
    }

    /// Top-left corner where the ship (re)spawns: bottom centre of the screen
    pub fn ship_spawn(&self) -> (f32, f32) {
        let s = &self.0;
        (
            (s.screen_width - s.ship_width) / 2.0,
            s.screen_height - s.ship_bottom_margin - s.ship_height,
        )
    }

    /// Horizontal band the fleet moves in
    pub fn fleet_bounds(&self) -> (f32, f32) {
        (self.0.side_margin, self.0.screen_width - self.0.side_margin)
    }

    pub fn into_inner(self) -> Settings {
        self.0
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Negative { field, value })
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), SettingsError> {
    if value == 0 {
        Err(SettingsError::ZeroCount { field })
    } else {
        Ok(())
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|err| SettingsError::Io(format!("{}: {err}", path.display())))?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|err| SettingsError::Parse(err.to_string()))
    }

    /// Width the fleet grid occupies, including the leading gap
    pub fn fleet_width(&self) -> f32 {
        self.alien_gap + self.fleet_cols as f32 * (self.alien_width + self.alien_gap)
    }

    /// Bottom edge of the lowest row at spawn
    pub fn fleet_bottom(&self) -> f32 {
        self.fleet_top + self.fleet_rows as f32 * (self.alien_height + self.alien_gap)
            - self.alien_gap
    }

    /// Check every rule and hand back a bundle the simulation can use
    pub fn validate(self) -> Result<ValidatedSettings, SettingsError> {
        positive("screen_width", self.screen_width)?;
        positive("screen_height", self.screen_height)?;
        if self.screen_width < MIN_SCREEN.0
            || self.screen_height < MIN_SCREEN.1
            || self.screen_width > MAX_SCREEN.0
            || self.screen_height > MAX_SCREEN.1
        {
            return Err(SettingsError::ScreenOutOfRange {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        non_negative("side_margin", self.side_margin)?;

        positive("tick_rate", self.tick_rate)?;
        positive("max_frame_secs", self.max_frame_secs)?;
        at_least_one("max_substeps", self.max_substeps as usize)?;
        non_negative("level_transition_secs", self.level_transition_secs)?;

        positive("ship_width", self.ship_width)?;
        positive("ship_height", self.ship_height)?;
        positive("ship_speed", self.ship_speed)?;
        non_negative("ship_bottom_margin", self.ship_bottom_margin)?;
        non_negative("fire_cooldown", self.fire_cooldown)?;
        at_least_one("starting_lives", self.starting_lives as usize)?;

        positive("bullet_width", self.bullet_width)?;
        positive("bullet_height", self.bullet_height)?;
        positive("bullet_speed", self.bullet_speed)?;
        at_least_one("projectile_cap", self.projectile_cap)?;

        at_least_one("fleet_rows", self.fleet_rows)?;
        at_least_one("fleet_cols", self.fleet_cols)?;
        positive("alien_width", self.alien_width)?;
        positive("alien_height", self.alien_height)?;
        non_negative("alien_gap", self.alien_gap)?;
        non_negative("fleet_top", self.fleet_top)?;
        positive("fleet_speed", self.fleet_speed)?;
        positive("drop_step", self.drop_step)?;
        // Each level must be at least as fast as the one before
        if !(self.speedup_scale.is_finite() && self.speedup_scale >= 1.0) {
            return Err(SettingsError::BelowOne {
                field: "speedup_scale",
                value: self.speedup_scale,
            });
        }
        non_negative("thinning_boost", self.thinning_boost)?;
        if !(0.0..=1.0).contains(&self.sound_volume) {
            return Err(SettingsError::NotAFraction {
                field: "sound_volume",
                value: self.sound_volume,
            });
        }

        if self.ship_width > self.screen_width
            || self.ship_height + self.ship_bottom_margin > self.screen_height
        {
            return Err(SettingsError::ShipDoesNotFit);
        }

        let available = self.screen_width - 2.0 * self.side_margin;
        let required = self.fleet_width();
        if required > available {
            return Err(SettingsError::FleetTooWide {
                required,
                available,
            });
        }

        let player_top = self.screen_height - self.ship_bottom_margin - self.ship_height;
        let fleet_bottom = self.fleet_bottom();
        if fleet_bottom >= player_top {
            return Err(SettingsError::FleetTooTall {
                fleet_bottom,
                player_top,
            });
        }

        Ok(ValidatedSettings(self))
    }
}
