// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller's command processor applies each one to the LightStore and
// persists the result. Reads bypass the channel entirely.

pub mod requests;

use std::sync::Arc;

use crate::config::RunwaySpec;
use crate::error::CoreError;
use crate::model::{Light, LightId, LightState};
use crate::seed::SeedOutcome;

pub use requests::CreateLightRequest;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the light inventory.
#[derive(Debug, Clone)]
pub enum Command {
    CreateLight(CreateLightRequest),
    ToggleLight { id: LightId },
    SetLightStatus { id: LightId, is_on: bool },
    SetLightState { id: LightId, state: LightState },
    MoveLight { id: LightId, lat: f64, lng: f64 },
    RemoveLight { id: LightId },
    SeedLights { runway: RunwaySpec },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateLight(_) => "create",
            Self::ToggleLight { .. } => "toggle",
            Self::SetLightStatus { .. } => "set-status",
            Self::SetLightState { .. } => "set-state",
            Self::MoveLight { .. } => "move",
            Self::RemoveLight { .. } => "remove",
            Self::SeedLights { .. } => "seed",
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Created(LightId),
    Toggled(LightState),
    Removed(Arc<Light>),
    Seeded(SeedOutcome),
}
