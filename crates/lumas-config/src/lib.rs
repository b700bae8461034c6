//! Shared configuration for LUMAS tools.
//!
//! TOML profiles (one per airfield), default data locations, and
//! translation to `lumas_core::ControllerConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumas_core::{ControllerConfig, DEFAULT_ZONES, GeoPoint, RunwaySpec};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named airfield profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Name used when neither a flag nor the config picks a profile.
pub const DEFAULT_PROFILE: &str = "default";

impl Config {
    /// Look up a profile by name.
    ///
    /// The default profile resolves to built-in settings when it has not
    /// been written yet; any other missing name is an error.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.clone());
        }
        if name == DEFAULT_PROFILE {
            return Ok(Profile::default());
        }
        Err(ConfigError::ProfileNotFound {
            name: name.into(),
            available: self.profile_names(),
        })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named airfield profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Light table location. Defaults to `<data dir>/<profile>/lights.json`.
    pub data_file: Option<PathBuf>,

    /// Runway laid out by `lumas seed`.
    #[serde(default)]
    pub runway: RunwayProfile,

    /// Zones offered to the map editor.
    #[serde(default = "default_zones")]
    pub zones: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            data_file: None,
            runway: RunwayProfile::default(),
            zones: default_zones(),
        }
    }
}

fn default_zones() -> Vec<String> {
    DEFAULT_ZONES.iter().map(|z| (*z).to_owned()).collect()
}

/// Flat TOML form of a runway centerline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunwayProfile {
    pub name: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    /// Lights per side.
    pub pairs: usize,
    /// Lateral offset from the centerline, in degrees.
    pub offset: f64,
}

impl Default for RunwayProfile {
    fn default() -> Self {
        RunwayProfile::from(&RunwaySpec::default())
    }
}

impl From<&RunwaySpec> for RunwayProfile {
    fn from(spec: &RunwaySpec) -> Self {
        Self {
            name: spec.name.clone(),
            start_lat: spec.start.lat,
            start_lng: spec.start.lng,
            end_lat: spec.end.lat,
            end_lng: spec.end.lng,
            pairs: spec.pairs,
            offset: spec.offset,
        }
    }
}

impl RunwayProfile {
    /// Validate and convert to the core runway type.
    pub fn to_spec(&self) -> Result<RunwaySpec, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("runway.name", "must not be empty"));
        }
        if self.pairs < 2 {
            return Err(invalid(
                "runway.pairs",
                format!("need at least 2 lights per side, got {}", self.pairs),
            ));
        }
        if !self.offset.is_finite() {
            return Err(invalid("runway.offset", "must be a finite number"));
        }
        let start = GeoPoint::new(self.start_lat, self.start_lng)
            .map_err(|e| invalid("runway.start", e.to_string()))?;
        let end = GeoPoint::new(self.end_lat, self.end_lng)
            .map_err(|e| invalid("runway.end", e.to_string()))?;

        Ok(RunwaySpec {
            name: name.to_owned(),
            start,
            end,
            pairs: self.pairs,
            offset: self.offset,
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "lumas", "lumas")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where a profile keeps its light table when `data_file` is unset.
pub fn default_data_file(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    base.join(profile_name).join("lights.json")
}

fn dirs_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("lumas");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// `LUMAS_` variables override file values; nested keys use a double
/// underscore, e.g. `LUMAS_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LUMAS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile translation ─────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile, without CLI overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let runway = profile.runway.to_spec()?;

    let zones: Vec<String> = profile
        .zones
        .iter()
        .map(|z| z.trim().to_owned())
        .filter(|z| !z.is_empty())
        .collect();
    if zones.is_empty() {
        return Err(invalid("zones", "at least one zone is required"));
    }

    let data_path = profile
        .data_file
        .clone()
        .unwrap_or_else(|| default_data_file(profile_name));

    Ok(ControllerConfig {
        data_path: Some(data_path),
        runway,
        zones,
    })
}
