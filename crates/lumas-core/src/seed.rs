// ── Runway seeding ──
//
// Deterministic bootstrap of a runway's edge lights from its two
// endpoints. Seeding only ever touches an empty store.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::config::RunwaySpec;
use crate::error::CoreError;
use crate::model::{GeoPoint, Light, LightId, LightState};
use crate::store::LightStore;

/// Result of a seed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The store already held lights; nothing was inserted.
    AlreadySeeded,
    Seeded { count: usize },
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySeeded => write!(f, "Already seeded"),
            Self::Seeded { count } => write!(f, "Seeded {count} lights"),
        }
    }
}

/// Lay out `2 * pairs` lights along the runway centerline.
///
/// For each step `i` the centerline point is interpolated at
/// `i / (pairs - 1)`. The left light sits at `(+offset, -offset)` from
/// it and the right light at `(-offset, +offset)`. Lights come out in
/// the order L-1, R-1, L-2, R-2, ...
pub fn plan(spec: &RunwaySpec) -> Result<Vec<Light>, CoreError> {
    let name = spec.name.trim();
    if name.is_empty() {
        return Err(CoreError::validation("runway name", "must not be empty"));
    }
    if spec.pairs < 2 {
        return Err(CoreError::validation(
            "pairs",
            format!("need at least 2 lights per side, got {}", spec.pairs),
        ));
    }
    if !spec.offset.is_finite() {
        return Err(CoreError::validation("offset", "must be a finite number"));
    }
    let start = GeoPoint::new(spec.start.lat, spec.start.lng)?;
    let end = GeoPoint::new(spec.end.lat, spec.end.lng)?;

    let left_zone = format!("{name} Left");
    let right_zone = format!("{name} Right");
    let last = spec.pairs - 1;
    let d = spec.offset;

    let mut lights = Vec::with_capacity(spec.pairs * 2);
    for i in 0..spec.pairs {
        let ratio = ratio(i, last);
        let center = start.lerp(&end, ratio);
        let n = i + 1;

        lights.push(Light {
            id: LightId::generate(),
            position: center.offset(d, -d),
            zone: left_zone.clone(),
            label: format!("L-{n}"),
            state: LightState::Operational,
        });
        lights.push(Light {
            id: LightId::generate(),
            position: center.offset(-d, d),
            zone: right_zone.clone(),
            label: format!("R-{n}"),
            state: LightState::Operational,
        });
    }
    Ok(lights)
}

/// Seed `store` with the runway layout unless it already holds lights.
///
/// The emptiness check and the batch insert are one atomic step, so two
/// concurrent seeds never double a runway.
pub fn seed(store: &LightStore, spec: &RunwaySpec) -> Result<SeedOutcome, CoreError> {
    if !store.is_empty() {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let lights = plan(spec)?;
    let count = lights.len();
    if !store.insert_all_if_empty(lights) {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    info!(runway = %spec.name, count, "runway seeded");
    Ok(SeedOutcome::Seeded { count })
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn ratio(i: usize, last: usize) -> f64 {
    i as f64 / last as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregate::{SystemStats, ZoneIndex};
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_runway_seeds_forty_healthy_lights() {
        let store = LightStore::new();
        let outcome = seed(&store, &RunwaySpec::default()).unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded { count: 40 });
        assert_eq!(outcome.to_string(), "Seeded 40 lights");

        let snap = store.list();
        let stats = SystemStats::from_lights(snap.iter());
        assert_eq!((stats.total, stats.operational, stats.health), (40, 40, 100));

        let zones = ZoneIndex::from_lights(snap.iter());
        let names: Vec<_> = zones.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Runway 03/21 Left", "Runway 03/21 Right"]);
        assert!(zones.iter().all(|(_, z)| z.total == 20 && z.is_fully_healthy()));
    }

    #[test]
    fn reseeding_is_a_no_op() {
        let store = LightStore::new();
        seed(&store, &RunwaySpec::default()).unwrap();
        let version = store.version();

        assert_eq!(
            seed(&store, &RunwaySpec::default()).unwrap(),
            SeedOutcome::AlreadySeeded
        );
        assert_eq!(store.len(), 40);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn seed_skips_stores_with_manual_lights() {
        let store = LightStore::new();
        store.create(1.0, 1.0, "Apron A", "A-1").unwrap();
        assert_eq!(
            seed(&store, &RunwaySpec::default()).unwrap(),
            SeedOutcome::AlreadySeeded
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn plan_interpolates_endpoints_and_alternates_sides() {
        let spec = RunwaySpec {
            name: "RWY 09".into(),
            start: GeoPoint { lat: 10.0, lng: 20.0 },
            end: GeoPoint { lat: 11.0, lng: 22.0 },
            pairs: 3,
            offset: 0.5,
        };
        let lights = plan(&spec).unwrap();
        let labels: Vec<_> = lights.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["L-1", "R-1", "L-2", "R-2", "L-3", "R-3"]);

        // First pair brackets the start point, last pair the end point.
        assert!(close(lights[0].position.lat, 10.5) && close(lights[0].position.lng, 19.5));
        assert!(close(lights[1].position.lat, 9.5) && close(lights[1].position.lng, 20.5));
        assert!(close(lights[4].position.lat, 11.5) && close(lights[4].position.lng, 21.5));
        assert!(close(lights[5].position.lat, 10.5) && close(lights[5].position.lng, 22.5));
        // Middle pair straddles the midpoint.
        assert!(close(lights[2].position.lat, 11.0) && close(lights[2].position.lng, 20.5));

        assert_eq!(lights[0].zone, "RWY 09 Left");
        assert_eq!(lights[1].zone, "RWY 09 Right");
    }

    #[test]
    fn plan_is_deterministic_apart_from_ids() {
        let a = plan(&RunwaySpec::default()).unwrap();
        let b = plan(&RunwaySpec::default()).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!((&x.label, &x.zone, x.position), (&y.label, &y.zone, y.position));
        }
    }

    #[test]
    fn plan_rejects_degenerate_runways() {
        let one = RunwaySpec {
            pairs: 1,
            ..RunwaySpec::default()
        };
        assert!(plan(&one).is_err());

        let unnamed = RunwaySpec {
            name: "  ".into(),
            ..RunwaySpec::default()
        };
        assert!(plan(&unnamed).is_err());

        let bad_end = RunwaySpec {
            end: GeoPoint { lat: f64::NAN, lng: 0.0 },
            ..RunwaySpec::default()
        };
        assert!(plan(&bad_end).is_err());
    }

    #[test]
    fn invalid_spec_on_empty_store_inserts_nothing() {
        let store = LightStore::new();
        let spec = RunwaySpec {
            pairs: 0,
            ..RunwaySpec::default()
        };
        assert!(seed(&store, &spec).is_err());
        assert!(store.is_empty());
    }
}
