//! Editor session handlers.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use lumas_core::{Controller, EditorController, EditorEvent, EditorOutcome};

use crate::cli::{EditorArgs, EditorCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

/// One replayed event and what it did.
#[derive(Debug, Serialize)]
struct ReplayStep {
    index: usize,
    event: &'static str,
    #[serde(flatten)]
    outcome: EditorOutcome,
}

#[derive(Tabled)]
struct ReplayRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Event")]
    event: &'static str,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

impl From<&ReplayStep> for ReplayRow {
    fn from(step: &ReplayStep) -> Self {
        Self {
            index: step.index,
            event: step.event,
            outcome: describe(&step.outcome),
        }
    }
}

fn describe(outcome: &EditorOutcome) -> String {
    match outcome {
        EditorOutcome::Ignored => "ignored".into(),
        EditorOutcome::ModeChanged => "mode changed".into(),
        EditorOutcome::Pending { position } => format!("pending at {position}"),
        EditorOutcome::Cancelled => "cancelled".into(),
        EditorOutcome::Created { id, label, zone } => format!("created {label} in {zone} ({id})"),
        EditorOutcome::Moved { id } => format!("moved {id}"),
        EditorOutcome::Deleted { id } => format!("deleted {id}"),
        EditorOutcome::Failed { message } => format!("failed: {message}"),
    }
}

fn read_events(path: &Path) -> Result<Vec<EditorEvent>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "events".into(),
        reason: format!("{}: {e}", path.display()),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EditorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EditorCommand::Replay { file, seed } => {
            let events = read_events(&file)?;
            let names: Vec<&'static str> = events.iter().map(EditorEvent::name).collect();

            let mut editor = EditorController::new(controller.clone())?;
            if let Some(seed) = seed {
                editor = editor.with_seed(seed);
            }
            // A replayed session starts in editor mode.
            editor.set_editor_mode(true);

            let outcomes = editor.replay(events).await;
            let steps: Vec<ReplayStep> = names
                .into_iter()
                .zip(outcomes)
                .enumerate()
                .map(|(i, (event, outcome))| ReplayStep {
                    index: i + 1,
                    event,
                    outcome,
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &steps,
                |s| ReplayRow::from(s),
                |s| describe(&s.outcome),
            )?;
            output::print_output(&out, global.quiet);

            let failed = steps
                .iter()
                .filter(|s| matches!(s.outcome, EditorOutcome::Failed { .. }))
                .count();
            if failed > 0 {
                return Err(CliError::ReplayFailed {
                    failed,
                    total: steps.len(),
                });
            }
            util::status(&format!("Replayed {} events", steps.len()), global.quiet);
            Ok(())
        }
    }
}
