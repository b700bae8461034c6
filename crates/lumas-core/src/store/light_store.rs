// ── Authoritative light store ──
//
// Thread-safe storage for every light fixture. Each successful mutation
// commits a new snapshot version that is broadcast to subscribers.
// Concurrent writers are last-write-wins; there are no version checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{GeoPoint, Light, LightId, LightState};
use crate::stream::{EntityStream, Snapshot};

/// Central reactive store for light fixtures.
///
/// All operations are atomic with respect to a single record. Reads
/// never block writers for longer than a `DashMap` shard lookup.
pub struct LightStore {
    pub(crate) lights: EntityCollection<LightId, Light>,
    pub(crate) last_mutation: watch::Sender<Option<DateTime<Utc>>>,
}

impl LightStore {
    pub fn new() -> Self {
        let (last_mutation, _) = watch::channel(None);

        Self {
            lights: EntityCollection::new(),
            last_mutation,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Every light, in insertion order.
    pub fn list(&self) -> Snapshot<Light> {
        self.lights.snapshot()
    }

    /// Look up a light. A missing id is `None`, never an error.
    pub fn get(&self, id: &LightId) -> Option<Arc<Light>> {
        self.lights.get(id)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Version of the latest committed snapshot.
    pub fn version(&self) -> u64 {
        self.lights.version()
    }

    pub fn last_mutation(&self) -> Option<DateTime<Utc>> {
        *self.last_mutation.borrow()
    }

    pub fn subscribe(&self) -> EntityStream<Light> {
        EntityStream::new(self.lights.subscribe())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert a new, operational light and return its id.
    ///
    /// Zone and label must be non-blank; both are stored trimmed. There
    /// is no duplicate detection.
    pub fn create(
        &self,
        lat: f64,
        lng: f64,
        zone: &str,
        label: &str,
    ) -> Result<LightId, CoreError> {
        let position = GeoPoint::new(lat, lng)?;
        let zone = required("zone", zone)?;
        let label = required("label", label)?;

        let id = LightId::generate();
        self.lights.insert(
            id,
            Light {
                id,
                position,
                zone,
                label,
                state: LightState::Operational,
            },
        );
        self.touch();
        debug!(%id, "light created");
        Ok(id)
    }

    /// Flip a light between on and off. Returns the new state.
    pub fn toggle(&self, id: &LightId) -> Result<LightState, CoreError> {
        let mut next = LightState::Operational;
        self.apply(id, |light| {
            next = light.state.toggled();
            Some(Light {
                state: next,
                ..light.clone()
            })
        })?;
        Ok(next)
    }

    /// Set on/off directly. Setting the current value changes nothing.
    pub fn set_status(&self, id: &LightId, is_on: bool) -> Result<(), CoreError> {
        self.set_state(id, LightState::from_on(is_on))
    }

    pub fn set_state(&self, id: &LightId, state: LightState) -> Result<(), CoreError> {
        self.apply(id, |light| {
            (light.state != state).then(|| Light {
                state,
                ..light.clone()
            })
        })
    }

    /// Overwrite coordinates only. No check against any zone's extent.
    pub fn update_position(&self, id: &LightId, lat: f64, lng: f64) -> Result<(), CoreError> {
        let position = GeoPoint::new(lat, lng)?;
        self.apply(id, |light| {
            (light.position != position).then(|| Light {
                position,
                ..light.clone()
            })
        })
    }

    pub fn remove(&self, id: &LightId) -> Result<Arc<Light>, CoreError> {
        let removed = self
            .lights
            .remove(id)
            .ok_or(CoreError::LightNotFound { id: *id })?;
        self.touch();
        debug!(%id, "light removed");
        Ok(removed)
    }

    /// Replace the entire table, e.g. after loading it from disk.
    pub fn restore(&self, lights: Vec<Light>) {
        let count = lights.len();
        self.lights
            .replace_all(lights.into_iter().map(|l| (l.id, l)).collect());
        debug!(count, "light table restored");
    }

    /// Insert `lights` only if the store is empty, as one atomic step.
    pub(crate) fn insert_all_if_empty(&self, lights: Vec<Light>) -> bool {
        let inserted = self
            .lights
            .insert_all_if_empty(lights.into_iter().map(|l| (l.id, l)).collect());
        if inserted {
            self.touch();
        }
        inserted
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn apply(&self, id: &LightId, f: impl FnOnce(&Light) -> Option<Light>) -> Result<(), CoreError> {
        match self.lights.update(id, f) {
            None => Err(CoreError::LightNotFound { id: *id }),
            Some(changed) => {
                if changed {
                    self.touch();
                    debug!(%id, "light updated");
                }
                Ok(())
            }
        }
    }

    fn touch(&self) {
        self.last_mutation.send_replace(Some(Utc::now()));
    }
}

impl Default for LightStore {
    fn default() -> Self {
        Self::new()
    }
}

fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with(n: usize) -> (LightStore, Vec<LightId>) {
        let store = LightStore::new();
        let ids = (0..n)
            .map(|i| {
                let offset = f64::from(u32::try_from(i).unwrap()) * 0.001;
                store
                    .create(32.0 + offset, 34.9, "Apron A", &format!("A-{i}"))
                    .unwrap()
            })
            .collect();
        (store, ids)
    }

    fn labels(store: &LightStore) -> Vec<String> {
        store.list().iter().map(|l| l.label.clone()).collect()
    }

    #[test]
    fn create_defaults_to_operational() {
        let (store, ids) = store_with(1);
        let light = store.get(&ids[0]).unwrap();
        assert_eq!(light.state, LightState::Operational);
        assert!(light.is_on());
        assert_eq!(light.zone, "Apron A");
    }

    #[test]
    fn list_is_insertion_ordered() {
        let (store, _) = store_with(4);
        assert_eq!(labels(&store), vec!["A-0", "A-1", "A-2", "A-3"]);
    }

    #[test]
    fn create_rejects_bad_input_without_mutating() {
        let store = LightStore::new();
        assert!(matches!(
            store.create(f64::NAN, 34.0, "Apron A", "x"),
            Err(CoreError::ValidationFailed { .. })
        ));
        assert!(store.create(32.0, 34.0, "   ", "x").is_err());
        assert!(store.create(32.0, 34.0, "Apron A", "").is_err());
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
        assert!(store.last_mutation().is_none());
    }

    #[test]
    fn create_trims_zone_and_label() {
        let store = LightStore::new();
        let id = store.create(1.0, 2.0, "  Apron B ", " B-1").unwrap();
        let light = store.get(&id).unwrap();
        assert_eq!((light.zone.as_str(), light.label.as_str()), ("Apron B", "B-1"));
    }

    #[test]
    fn toggle_twice_restores_state() {
        let (store, ids) = store_with(1);
        assert_eq!(store.toggle(&ids[0]).unwrap(), LightState::Offline);
        assert_eq!(store.toggle(&ids[0]).unwrap(), LightState::Operational);
        assert!(store.get(&ids[0]).unwrap().is_on());
    }

    #[test]
    fn toggle_never_moves_the_light() {
        let (store, ids) = store_with(1);
        let before = store.get(&ids[0]).unwrap().position;
        store.toggle(&ids[0]).unwrap();
        assert_eq!(store.get(&ids[0]).unwrap().position, before);
    }

    #[test]
    fn set_status_is_idempotent() {
        let (store, ids) = store_with(1);
        let version = store.version();
        store.set_status(&ids[0], true).unwrap();
        assert_eq!(store.version(), version);

        store.set_status(&ids[0], false).unwrap();
        store.set_status(&ids[0], false).unwrap();
        assert_eq!(store.version(), version + 1);
        assert!(!store.get(&ids[0]).unwrap().is_on());
    }

    #[test]
    fn update_position_only_touches_coordinates() {
        let (store, ids) = store_with(1);
        store.toggle(&ids[0]).unwrap();
        store.update_position(&ids[0], 31.5, 35.1).unwrap();

        let light = store.get(&ids[0]).unwrap();
        assert_eq!(light.position, GeoPoint { lat: 31.5, lng: 35.1 });
        assert_eq!(light.state, LightState::Offline);
        assert_eq!(light.label, "A-0");
    }

    #[test]
    fn update_position_rejects_non_finite() {
        let (store, ids) = store_with(1);
        assert!(store.update_position(&ids[0], 1.0, f64::NAN).is_err());
    }

    #[test]
    fn mutations_on_missing_ids_are_not_found() {
        let store = LightStore::new();
        let ghost = LightId::generate();
        assert!(store.toggle(&ghost).unwrap_err().is_not_found());
        assert!(store.set_status(&ghost, true).unwrap_err().is_not_found());
        assert!(store.update_position(&ghost, 1.0, 1.0).unwrap_err().is_not_found());
        assert!(store.remove(&ghost).unwrap_err().is_not_found());
        assert!(store.get(&ghost).is_none());
    }

    #[test]
    fn create_then_remove_restores_prior_snapshot() {
        let (store, _) = store_with(3);
        let before: Vec<Light> = store.list().iter().map(|l| (**l).clone()).collect();

        let id = store.create(0.0, 0.0, "Taxiway Bravo", "TMP").unwrap();
        store.remove(&id).unwrap();

        let after: Vec<Light> = store.list().iter().map(|l| (**l).clone()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn removed_lights_are_not_resurrected_by_moves() {
        let (store, ids) = store_with(2);
        store.remove(&ids[0]).unwrap();
        assert!(store.update_position(&ids[0], 1.0, 1.0).unwrap_err().is_not_found());
        assert!(store.get(&ids[0]).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mutations_record_a_timestamp() {
        let (store, ids) = store_with(1);
        let first = store.last_mutation().unwrap();
        store.toggle(&ids[0]).unwrap();
        assert!(store.last_mutation().unwrap() >= first);
    }

    #[tokio::test]
    async fn subscribers_are_notified_of_each_mutation() {
        let (store, ids) = store_with(1);
        let mut stream = store.subscribe();
        let seen = stream.current().version();

        store.toggle(&ids[0]).unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.version(), seen + 1);
        assert!(!snap.items()[0].is_on());
    }
}
