//! Light command handlers.

use std::sync::Arc;

use tabled::Tabled;

use lumas_core::{Controller, CreateLightRequest, Light, LightState};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand, StateFlags};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lng")]
    lng: String,
}

impl LightRow {
    fn new(light: &Arc<Light>, color: bool) -> Self {
        Self {
            id: light.id.to_string(),
            label: light.label.clone(),
            zone: light.zone.clone(),
            state: output::paint_state(light.state, color),
            lat: format!("{:.6}", light.position.lat),
            lng: format!("{:.6}", light.position.lng),
        }
    }
}

fn detail(light: &Arc<Light>, color: bool) -> String {
    [
        format!("ID:       {}", light.id),
        format!("Label:    {}", light.label),
        format!("Zone:     {}", light.zone),
        format!("State:    {}", output::paint_state(light.state, color)),
        format!("Position: {}", light.position),
    ]
    .join("\n")
}

/// Render lights as a list in the selected format.
pub(crate) fn render_lights(lights: &[Arc<Light>], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        lights,
        |l| LightRow::new(l, color),
        |l| l.id.to_string(),
    )
}

fn print_light(light: &Arc<Light>, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        light,
        |l| detail(l, color),
        |l| l.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn fetch(controller: &Controller, identifier: &str) -> Result<Arc<Light>, CliError> {
    let id = util::resolve_light_id(controller, identifier)?;
    controller.light(&id).ok_or_else(|| CliError::NotFound {
        resource_type: "light".into(),
        identifier: identifier.into(),
        list_command: "lights list".into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LightsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LightsCommand::List { zone, failed } => {
            let snap = controller.lights_snapshot();
            let lights: Vec<Arc<Light>> = snap
                .iter()
                .filter(|l| zone.as_deref().is_none_or(|z| l.zone == z))
                .filter(|l| !failed || !l.is_on())
                .cloned()
                .collect();
            let out = render_lights(&lights, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightsCommand::Get { light } => print_light(&fetch(controller, &light)?, global),

        LightsCommand::Add {
            lat,
            lng,
            zone,
            label,
        } => {
            let id = controller
                .create_light(CreateLightRequest {
                    lat,
                    lng,
                    zone,
                    label,
                })
                .await?;
            util::status("Light created", global.quiet);
            print_light(&fetch(controller, &id.to_string())?, global)
        }

        LightsCommand::Toggle { light } => {
            let id = util::resolve_light_id(controller, &light)?;
            let state = controller.toggle_light(id).await?;
            util::status(&format!("Light {light} is now {state}"), global.quiet);
            Ok(())
        }

        LightsCommand::Set { light, state } => {
            let id = util::resolve_light_id(controller, &light)?;
            match target_state(&state) {
                LightState::Maintenance => {
                    controller
                        .set_light_state(id, LightState::Maintenance)
                        .await?;
                }
                other => controller.set_light_status(id, other.is_on()).await?,
            }
            util::status(
                &format!("Light {light} set to {}", target_state(&state)),
                global.quiet,
            );
            Ok(())
        }

        LightsCommand::Move { light, lat, lng } => {
            let id = util::resolve_light_id(controller, &light)?;
            controller.move_light(id, lat, lng).await?;
            util::status(&format!("Light {light} moved"), global.quiet);
            Ok(())
        }

        LightsCommand::Remove { light } => {
            let target = fetch(controller, &light)?;
            let prompt = format!("Remove light '{}' ({})?", target.label, target.zone);
            if !util::confirm(&prompt, "lights remove", global.yes)? {
                return Ok(());
            }
            controller.remove_light(target.id).await?;
            util::status("Light removed", global.quiet);
            Ok(())
        }
    }
}

fn target_state(flags: &StateFlags) -> LightState {
    if flags.maintenance {
        LightState::Maintenance
    } else {
        LightState::from_on(flags.on && !flags.off)
    }
}
