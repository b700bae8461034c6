// ── Derived views ──
//
// Pure functions of a light snapshot. Nothing here is cached: every
// notification recomputes from the full snapshot, which is fine at
// airfield scale (tens to low hundreds of fixtures).

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::Light;
use crate::stream::Snapshot;

/// Round `part / whole * 100` half-up, in integer arithmetic.
/// Returns 0 for an empty whole.
fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part.min(whole) * 200 + whole) / (whole * 2);
    u8::try_from(rounded).unwrap_or(100)
}

// ── StatsAggregator ─────────────────────────────────────────────────

/// System-wide health figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub total: usize,
    pub operational: usize,
    pub failed: usize,
    /// Percentage operational, rounded half-up. 0 when there are no lights.
    pub health: u8,
}

impl SystemStats {
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Arc<Light>>) -> Self {
        let (total, operational) = lights
            .into_iter()
            .fold((0, 0), |(t, o), l| (t + 1, o + usize::from(l.is_on())));
        Self {
            total,
            operational,
            failed: total - operational,
            health: percent(operational, total),
        }
    }
}

// ── ZoneIndex ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    pub total: usize,
    pub operational: usize,
}

impl ZoneSummary {
    pub fn is_fully_healthy(&self) -> bool {
        self.operational == self.total
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_fully_healthy()
    }

    pub fn health(&self) -> u8 {
        percent(self.operational, self.total)
    }
}

/// Per-zone rollup, in first-seen zone order.
///
/// Zones exist only through membership, so every entry has `total >= 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ZoneIndex(IndexMap<String, ZoneSummary>);

impl ZoneIndex {
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Arc<Light>>) -> Self {
        let mut zones: IndexMap<String, ZoneSummary> = IndexMap::new();
        for light in lights {
            let entry = zones.entry(light.zone.clone()).or_insert(ZoneSummary {
                total: 0,
                operational: 0,
            });
            entry.total += 1;
            entry.operational += usize::from(light.is_on());
        }
        Self(zones)
    }

    pub fn get(&self, zone: &str) -> Option<&ZoneSummary> {
        self.0.get(zone)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ZoneSummary)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all zone totals; equals the system total for the same snapshot.
    pub fn total(&self) -> usize {
        self.0.values().map(|z| z.total).sum()
    }
}

/// Every light that is not operational, in snapshot order.
pub fn failed_lights<'a>(lights: impl IntoIterator<Item = &'a Arc<Light>>) -> Vec<Arc<Light>> {
    lights
        .into_iter()
        .filter(|l| !l.is_on())
        .map(Arc::clone)
        .collect()
}

// ── Dashboard ───────────────────────────────────────────────────────

/// All derived views for one snapshot version.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub version: u64,
    pub stats: SystemStats,
    pub zones: ZoneIndex,
    pub failed: Vec<Arc<Light>>,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &Snapshot<Light>) -> Self {
        Self {
            version: snapshot.version(),
            stats: SystemStats::from_lights(snapshot.iter()),
            zones: ZoneIndex::from_lights(snapshot.iter()),
            failed: failed_lights(snapshot.iter()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{GeoPoint, LightId, LightState};
    use pretty_assertions::assert_eq;

    fn light(zone: &str, state: LightState) -> Arc<Light> {
        Arc::new(Light {
            id: LightId::generate(),
            position: GeoPoint { lat: 0.0, lng: 0.0 },
            zone: zone.into(),
            label: "x".into(),
            state,
        })
    }

    fn fleet(on: usize, off: usize) -> Vec<Arc<Light>> {
        let mut lights: Vec<_> = (0..on).map(|_| light("Z", LightState::Operational)).collect();
        lights.extend((0..off).map(|_| light("Z", LightState::Offline)));
        lights
    }

    #[test]
    fn empty_snapshot_has_zero_health() {
        let none: Vec<Arc<Light>> = Vec::new();
        assert_eq!(SystemStats::from_lights(&none), SystemStats::default());
        assert!(ZoneIndex::from_lights(&none).is_empty());
    }

    #[test]
    fn thirty_five_of_forty_is_eighty_eight() {
        let stats = SystemStats::from_lights(&fleet(35, 5));
        assert_eq!(
            stats,
            SystemStats {
                total: 40,
                operational: 35,
                failed: 5,
                health: 88,
            }
        );
    }

    #[test]
    fn health_rounds_half_up() {
        // 1/8 = 12.5% -> 13, 7/8 = 87.5% -> 88
        assert_eq!(SystemStats::from_lights(&fleet(1, 7)).health, 13);
        assert_eq!(SystemStats::from_lights(&fleet(7, 1)).health, 88);
        // 1/3 = 33.33% -> 33, 2/3 = 66.67% -> 67
        assert_eq!(SystemStats::from_lights(&fleet(1, 2)).health, 33);
        assert_eq!(SystemStats::from_lights(&fleet(2, 1)).health, 67);
    }

    #[test]
    fn stats_invariants_hold_across_mixes() {
        for total in 0..30 {
            for on in 0..=total {
                let stats = SystemStats::from_lights(&fleet(on, total - on));
                assert_eq!(stats.operational + stats.failed, stats.total);
                assert!(stats.health <= 100);
                if total > 0 {
                    let expected = (on as f64 / total as f64 * 100.0).round();
                    assert!((f64::from(stats.health) - expected).abs() < f64::EPSILON);
                }
            }
        }
    }

    #[test]
    fn maintenance_counts_as_failed() {
        let lights = vec![
            light("Z", LightState::Operational),
            light("Z", LightState::Maintenance),
        ];
        let stats = SystemStats::from_lights(&lights);
        assert_eq!((stats.operational, stats.failed, stats.health), (1, 1, 50));
        assert_eq!(failed_lights(&lights).len(), 1);
    }

    #[test]
    fn zones_keep_first_seen_order_and_sum_to_total() {
        let lights = vec![
            light("Taxiway Bravo", LightState::Operational),
            light("Apron A", LightState::Offline),
            light("Taxiway Bravo", LightState::Offline),
            light("Apron A", LightState::Operational),
            light("Apron B", LightState::Operational),
        ];
        let zones = ZoneIndex::from_lights(&lights);

        let names: Vec<_> = zones.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Taxiway Bravo", "Apron A", "Apron B"]);
        assert_eq!(zones.total(), SystemStats::from_lights(&lights).total);

        let bravo = zones.get("Taxiway Bravo").unwrap();
        assert_eq!((bravo.operational, bravo.total), (1, 2));
        assert!(bravo.is_degraded());
        assert_eq!(bravo.health(), 50);
        assert!(zones.get("Apron B").unwrap().is_fully_healthy());
        assert!(zones.iter().all(|(_, z)| z.total >= 1));
    }

    #[test]
    fn zone_index_serializes_as_ordered_map() {
        let lights = vec![light("B", LightState::Operational), light("A", LightState::Offline)];
        let json = serde_json::to_string(&ZoneIndex::from_lights(&lights)).unwrap();
        assert_eq!(
            json,
            r#"{"B":{"total":1,"operational":1},"A":{"total":1,"operational":0}}"#
        );
    }
}
