// ── Typed request structs for Command payloads ──

use serde::{Deserialize, Serialize};

/// Fields needed to create a light. New lights always start operational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLightRequest {
    pub lat: f64,
    pub lng: f64,
    pub zone: String,
    pub label: String,
}
