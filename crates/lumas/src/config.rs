//! CLI configuration -- thin wrapper around `lumas_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--profile, --data-file).

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use lumas_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use lumas_config::{
    Config, DEFAULT_PROFILE, Profile, RunwayProfile, config_path, load_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// Fill `--output` and `--color` from the config file's `[defaults]`
/// when neither a flag nor an env var set them.
pub fn apply_defaults(global: &mut GlobalOpts, matches: &ArgMatches) -> Result<(), CliError> {
    let from_clap_default =
        |id: &str| matches.value_source(id) == Some(ValueSource::DefaultValue);
    if !from_clap_default("output") && !from_clap_default("color") {
        return Ok(());
    }
    // An unreadable file is reported by the command that needs it.
    let Ok(cfg) = load_config() else {
        return Ok(());
    };

    if from_clap_default("output") {
        global.output = parse_default("defaults.output", &cfg.defaults.output)?;
    }
    if from_clap_default("color") {
        global.color = parse_default("defaults.color", &cfg.defaults.color)?;
    }
    Ok(())
}

fn parse_default<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Config {
        message: format!("invalid {field} '{value}': {reason}"),
        path: config_path().display().to_string(),
    })
}

/// Build a `ControllerConfig` from the config file, active profile, and
/// CLI overrides.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profile(&profile_name)?;

    let mut controller = lumas_config::profile_to_controller_config(&profile, &profile_name)?;

    // Data file (flag > env > profile > default location)
    if let Some(path) = &global.data_file {
        controller.data_path = Some(path.clone());
    }

    tracing::debug!(
        profile = %profile_name,
        data = ?controller.data_path,
        "resolved controller config"
    );
    Ok(controller)
}
