//! Runway seeding handler.

use lumas_core::Controller;

use crate::cli::{GlobalOpts, SeedArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: SeedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut runway = controller.config().runway.clone();
    if let Some(pairs) = args.pairs {
        runway.pairs = pairs;
    }

    let outcome = controller.seed_lights(Some(runway)).await?;
    let out = output::render_single(
        &global.output,
        &outcome,
        ToString::to_string,
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
