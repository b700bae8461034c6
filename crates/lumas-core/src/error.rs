// ── Core error types ──
//
// User-facing errors from lumas-core. Seeding a populated store is not
// an error; it is reported through `SeedOutcome::AlreadySeeded`.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::LightId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Light not found: {id}")]
    LightNotFound { id: LightId },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Controller is not running")]
    ControllerStopped,

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Light table at {} could not be {action}: {message}", path.display())]
    Persistence {
        path: PathBuf,
        action: &'static str,
        message: String,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LightNotFound { .. })
    }
}
