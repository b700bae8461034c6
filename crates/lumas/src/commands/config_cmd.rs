//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, DEFAULT_PROFILE, Profile, RunwayProfile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for a value, or take the default when prompts are skipped.
fn ask<T>(prompt: &str, default: T, skip: bool) -> Result<T, CliError>
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString,
{
    if skip {
        return Ok(default);
    }
    Input::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .map_err(prompt_err)
}

/// Guided profile setup. `skip` accepts every default.
fn init_profile(skip: bool) -> Result<(String, Profile), CliError> {
    let name: String = ask("Profile name", DEFAULT_PROFILE.to_owned(), skip)?;

    let default_data = lumas_config::default_data_file(&name);
    let data_file: String = ask("Light table file", default_data.display().to_string(), skip)?;

    let defaults = RunwayProfile::default();
    let runway = RunwayProfile {
        name: ask("Runway name", defaults.name, skip)?,
        start_lat: ask("Runway start latitude", defaults.start_lat, skip)?,
        start_lng: ask("Runway start longitude", defaults.start_lng, skip)?,
        end_lat: ask("Runway end latitude", defaults.end_lat, skip)?,
        end_lng: ask("Runway end longitude", defaults.end_lng, skip)?,
        pairs: ask("Lights per side", defaults.pairs, skip)?,
        offset: defaults.offset,
    };
    // Fail early rather than writing a profile that cannot seed.
    runway.to_spec()?;

    let data_file = PathBuf::from(data_file);
    let profile = Profile {
        data_file: (data_file != default_data).then_some(data_file),
        runway,
        ..Profile::default()
    };
    Ok((name, profile))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            if !global.yes {
                eprintln!("LUMAS configuration wizard");
                eprintln!("   Config path: {}\n", config_path.display());
            }

            let (profile_name, profile) = init_profile(global.yes)?;

            let mut cfg = config::load_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let written = config::save_config(&cfg)?;
            util::status(
                &format!(
                    "Configuration written to {}\n  Active profile: {profile_name}\n\n  \
                     Next: lumas seed",
                    written.display()
                ),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            let names = cfg.profile_names();
            if names.is_empty() {
                util::status("No profiles configured. Run: lumas config init", global.quiet);
            } else {
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if name == active { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            // Only the default profile resolves without an entry.
            if !cfg.profiles.contains_key(&name) {
                let profile = cfg.profile(&name)?;
                cfg.profiles.insert(name.clone(), profile);
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            util::status(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
