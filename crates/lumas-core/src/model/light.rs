// ── Light domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::LightId;
use super::geo::GeoPoint;

/// Operational state of a fixture.
///
/// This is the only state a light carries. `is_on()` is derived from it,
/// so the on/off flag and the status label can never disagree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum LightState {
    #[default]
    Operational,
    #[serde(alias = "failed")]
    Offline,
    /// Taken out of service on purpose. Counts as not operational.
    Maintenance,
}

impl LightState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::Operational)
    }

    pub fn from_on(is_on: bool) -> Self {
        if is_on { Self::Operational } else { Self::Offline }
    }

    /// The state a toggle moves to. Anything not lit comes back on.
    pub fn toggled(self) -> Self {
        Self::from_on(!self.is_on())
    }
}

/// A single runway or taxiway edge light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "LightRow", try_from = "LightRow")]
pub struct Light {
    pub id: LightId,
    pub position: GeoPoint,
    pub zone: String,
    pub label: String,
    pub state: LightState,
}

impl Light {
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}

/// Wire and table shape of a light.
///
/// Both `isOn` and `status` are written. On read `status` wins when
/// present; rows without one fall back to `isOn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightRow {
    pub id: LightId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub is_on: bool,
    pub zone: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LightState>,
}

impl From<Light> for LightRow {
    fn from(light: Light) -> Self {
        Self {
            id: light.id,
            lat: light.position.lat,
            lng: light.position.lng,
            is_on: light.is_on(),
            zone: light.zone,
            label: light.label,
            status: Some(light.state),
        }
    }
}

impl TryFrom<LightRow> for Light {
    type Error = String;

    fn try_from(row: LightRow) -> Result<Self, Self::Error> {
        let position = GeoPoint::new(row.lat, row.lng).map_err(|e| e.to_string())?;
        if row.zone.trim().is_empty() {
            return Err(format!("light {} has an empty zone", row.id));
        }
        if row.label.trim().is_empty() {
            return Err(format!("light {} has an empty label", row.id));
        }
        Ok(Self {
            id: row.id,
            position,
            zone: row.zone,
            label: row.label,
            state: row.status.unwrap_or_else(|| LightState::from_on(row.is_on)),
        })
    }
}
