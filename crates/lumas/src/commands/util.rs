//! Shared helpers for command handlers.

use std::io::IsTerminal;

use lumas_core::{Controller, LightId};

use crate::error::CliError;

/// Resolve a light identifier (UUID or unique label) via snapshot lookup.
pub fn resolve_light_id(controller: &Controller, identifier: &str) -> Result<LightId, CliError> {
    if let Ok(id) = identifier.parse::<LightId>() {
        if controller.light(&id).is_some() {
            return Ok(id);
        }
        return Err(not_found(identifier));
    }

    let snap = controller.lights_snapshot();
    let matches: Vec<LightId> = snap
        .iter()
        .filter(|light| light.label == identifier)
        .map(|light| light.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(not_found(identifier)),
        _ => Err(CliError::Ambiguous {
            label: identifier.into(),
            count: matches.len(),
        }),
    }
}

fn not_found(identifier: &str) -> CliError {
    CliError::NotFound {
        resource_type: "light".into(),
        identifier: identifier.into(),
        list_command: "lights list".into(),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Emit a status line to stderr unless `--quiet`.
pub fn status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
