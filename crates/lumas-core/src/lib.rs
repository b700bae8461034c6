// lumas-core: Light inventory, derived views, and the map editing protocol.

pub mod aggregate;
pub mod command;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod model;
pub mod seed;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{DashboardView, SystemStats, ZoneIndex, ZoneSummary, failed_lights};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, DEFAULT_ZONES, RunwaySpec};
pub use controller::{Controller, ControllerState};
pub use editor::{EditorController, EditorEvent, EditorOutcome, PlacementMode, ZoneCatalog};
pub use error::CoreError;
pub use seed::SeedOutcome;
pub use store::LightStore;
pub use stream::{EntityStream, Snapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{GeoPoint, Light, LightId, LightRow, LightState};
