//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod dashboard;
pub mod editor;
pub mod lights;
pub mod seed;
pub mod stats;
pub mod util;
pub mod zones;

use lumas_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Lights(args) => lights::handle(controller, args, global).await,
        Command::Stats => stats::handle(controller, global),
        Command::Zones => zones::handle(controller, global),
        Command::Dashboard => dashboard::handle(controller, global),
        Command::Seed(args) => seed::handle(controller, args, global).await,
        Command::Editor(args) => editor::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a controller".into(),
        )),
    }
}
