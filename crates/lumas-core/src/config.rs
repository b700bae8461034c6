// ── Runtime configuration ──
//
// These types describe *what* airfield a controller manages: where the
// light table lives, which runway to seed, and which zones the editor
// may place into. They never touch disk themselves. The CLI builds a
// `ControllerConfig` from a profile and hands it in.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::GeoPoint;

/// Zone candidates offered to the editor when none are configured.
pub const DEFAULT_ZONES: [&str; 6] = [
    "Runway 12-30",
    "Runway 08-26",
    "Taxiway Alpha",
    "Taxiway Bravo",
    "Apron A",
    "Apron B",
];

/// Centerline and layout parameters for seeding one runway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwaySpec {
    /// Runway designator; seeded zones are `"<name> Left"` / `"<name> Right"`.
    pub name: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Lights per side.
    pub pairs: usize,
    /// Lateral offset from the centerline, in degrees.
    pub offset: f64,
}

impl Default for RunwaySpec {
    fn default() -> Self {
        Self {
            name: "Runway 03/21".into(),
            start: GeoPoint {
                lat: 32.005_622,
                lng: 34.891_736,
            },
            end: GeoPoint {
                lat: 32.020_083,
                lng: 34.902_556,
            },
            pairs: 20,
            offset: 0.0002,
        }
    }
}

/// Configuration for one controller instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Where the `lights` table is persisted. `None` keeps it in memory.
    pub data_path: Option<PathBuf>,
    /// Runway used by the seed command.
    pub runway: RunwaySpec,
    /// Zones the editor may place new lights into.
    pub zones: Vec<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            runway: RunwaySpec::default(),
            zones: DEFAULT_ZONES.iter().map(|z| (*z).to_owned()).collect(),
        }
    }
}
