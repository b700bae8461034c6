//! Dashboard handler: stats, zone rollup, and critical alerts together.

use lumas_core::{Controller, DashboardView};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{lights, stats, zones};

fn detail(view: &DashboardView, global: &GlobalOpts, color: bool) -> Result<String, CliError> {
    let mut sections = vec![stats::detail(&view.stats, color)];

    if !view.zones.is_empty() {
        sections.push(zones::render_table(&view.zones, color));
    }

    if view.failed.is_empty() {
        sections.push("No critical alerts".into());
    } else {
        sections.push(format!("Critical alerts ({})", view.failed.len()));
        sections.push(lights::render_lights(&view.failed, global)?);
    }

    Ok(sections.join("\n\n"))
}

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let view = controller.dashboard();

    let out = match global.output {
        OutputFormat::Table => detail(&view, global, output::should_color(&global.color))?,
        _ => output::render_single(&global.output, &view, |_| String::new(), |v| {
            v.failed
                .iter()
                .map(|l| l.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        })?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
