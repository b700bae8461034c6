// ── Domain model ──
//
// The light fixture is the only entity. Zones are plain string labels
// on a light, never records of their own.

pub mod entity_id;
pub mod geo;
pub mod light;

pub use entity_id::LightId;
pub use geo::GeoPoint;
pub use light::{Light, LightRow, LightState};
