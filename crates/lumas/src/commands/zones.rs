//! Zone rollup handler.

use serde::Serialize;
use tabled::Tabled;

use lumas_core::{Controller, ZoneIndex};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// One zone, flattened for list rendering.
#[derive(Debug, Serialize)]
pub(crate) struct ZoneEntry {
    zone: String,
    total: usize,
    operational: usize,
    health: u8,
    degraded: bool,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Operational")]
    operational: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ZoneRow {
    fn new(entry: &ZoneEntry, color: bool) -> Self {
        Self {
            zone: entry.zone.clone(),
            operational: format!("{}/{}", entry.operational, entry.total),
            health: output::paint_health(entry.health, color),
            status: if entry.degraded { "degraded" } else { "healthy" }.into(),
        }
    }
}

pub(crate) fn entries(zones: &ZoneIndex) -> Vec<ZoneEntry> {
    zones
        .iter()
        .map(|(name, summary)| ZoneEntry {
            zone: name.clone(),
            total: summary.total,
            operational: summary.operational,
            health: summary.health(),
            degraded: summary.is_degraded(),
        })
        .collect()
}

pub(crate) fn render_table(zones: &ZoneIndex, color: bool) -> String {
    let rows: Vec<ZoneRow> = entries(zones).iter().map(|e| ZoneRow::new(e, color)).collect();
    output::render_table(&rows)
}

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries(&controller.zones()),
        |e| ZoneRow::new(e, color),
        |e| e.zone.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
