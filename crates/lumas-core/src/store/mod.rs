// ── Reactive light store ──
//
// Concurrent entity storage with push-based change notification, plus
// the on-disk form of the `lights` table.

mod collection;
mod light_store;
mod persist;

pub use light_store::LightStore;
pub use persist::{load_lights, save_lights};
