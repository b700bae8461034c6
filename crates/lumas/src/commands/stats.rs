//! System statistics handler.

use lumas_core::{Controller, SystemStats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub(crate) fn detail(stats: &SystemStats, color: bool) -> String {
    [
        format!("Total:        {}", stats.total),
        format!("Operational:  {}", stats.operational),
        format!("Failed:       {}", stats.failed),
        format!("Health:       {}", output::paint_health(stats.health, color)),
    ]
    .join("\n")
}

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = controller.stats();
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &stats,
        |s| detail(s, color),
        |s| s.health.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
