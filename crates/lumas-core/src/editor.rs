// ── Map editor ──
//
// Turns map gestures into store commands. The editor holds only
// presentation state (modes, a pending placement, the last failure);
// the light table itself is always read back from the next snapshot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::command::CreateLightRequest;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{GeoPoint, LightId};

const QUICK_LABEL_RANGE: std::ops::Range<u32> = 10_000..100_000;

// ── Modes ────────────────────────────────────────────────────────

/// How a click in editor mode places a light.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlacementMode {
    /// Capture the point, then wait for a label and zone.
    #[default]
    Confirm,
    /// Create immediately with a generated label and a random zone.
    Quick,
}

// ── ZoneCatalog ──────────────────────────────────────────────────

/// The finite set of zones the editor may place lights into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCatalog(Vec<String>);

impl ZoneCatalog {
    /// Build a catalog from configured names. Blank entries and
    /// duplicates are dropped; at least one zone must remain.
    pub fn new<I, S>(zones: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for zone in zones {
            let zone = zone.as_ref().trim();
            if !zone.is_empty() && !names.iter().any(|n| n == zone) {
                names.push(zone.to_owned());
            }
        }
        if names.is_empty() {
            return Err(CoreError::validation("zones", "at least one zone is required"));
        }
        Ok(Self(names))
    }

    pub fn contains(&self, zone: &str) -> bool {
        self.0.iter().any(|z| z == zone)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn pick(&self, rng: &mut impl Rng) -> &str {
        &self.0[rng.random_range(0..self.0.len())]
    }
}

// ── Events & outcomes ────────────────────────────────────────────

/// One operator gesture. Deserialisable so sessions can be scripted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    SetEditorMode { enabled: bool },
    SetPlacementMode { mode: PlacementMode },
    Click { lat: f64, lng: f64 },
    Confirm { label: String, zone: String },
    Cancel,
    DragEnd { id: LightId, lat: f64, lng: f64 },
    Delete { id: LightId },
}

impl EditorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetEditorMode { .. } => "set_editor_mode",
            Self::SetPlacementMode { .. } => "set_placement_mode",
            Self::Click { .. } => "click",
            Self::Confirm { .. } => "confirm",
            Self::Cancel => "cancel",
            Self::DragEnd { .. } => "drag_end",
            Self::Delete { .. } => "delete",
        }
    }
}

/// What a gesture did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditorOutcome {
    /// The gesture had no effect in the current mode.
    Ignored,
    ModeChanged,
    /// A point is waiting for label and zone.
    Pending { position: GeoPoint },
    Cancelled,
    Created {
        id: LightId,
        label: String,
        zone: String,
    },
    Moved { id: LightId },
    Deleted { id: LightId },
    /// Only produced by [`EditorController::replay`].
    Failed { message: String },
}

// ── EditorController ─────────────────────────────────────────────

/// Editing session for one operator.
pub struct EditorController {
    controller: Controller,
    enabled: bool,
    placement: PlacementMode,
    pending: Option<GeoPoint>,
    zones: ZoneCatalog,
    rng: StdRng,
    notice: Option<String>,
}

impl EditorController {
    /// A session using the controller's configured zones. Starts with
    /// editor mode off and confirm placement.
    pub fn new(controller: Controller) -> Result<Self, CoreError> {
        let zones = ZoneCatalog::new(&controller.config().zones)?;
        Ok(Self {
            controller,
            enabled: false,
            placement: PlacementMode::default(),
            pending: None,
            zones,
            rng: StdRng::from_os_rng(),
            notice: None,
        })
    }

    /// Use a fixed seed for quick-add labels and zones.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn placement(&self) -> PlacementMode {
        self.placement
    }

    pub fn pending(&self) -> Option<GeoPoint> {
        self.pending
    }

    pub fn zones(&self) -> &ZoneCatalog {
        &self.zones
    }

    /// The most recent failure, kept until dismissed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    // ── Gestures ─────────────────────────────────────────────────

    pub fn set_editor_mode(&mut self, enabled: bool) -> EditorOutcome {
        if self.enabled == enabled {
            return EditorOutcome::Ignored;
        }
        self.enabled = enabled;
        self.pending = None;
        debug!(enabled, "editor mode changed");
        EditorOutcome::ModeChanged
    }

    pub fn set_placement_mode(&mut self, mode: PlacementMode) -> EditorOutcome {
        if self.placement == mode {
            return EditorOutcome::Ignored;
        }
        self.placement = mode;
        self.pending = None;
        debug!(%mode, "placement mode changed");
        EditorOutcome::ModeChanged
    }

    /// A map click. Inert unless editor mode is on.
    pub async fn click(&mut self, lat: f64, lng: f64) -> Result<EditorOutcome, CoreError> {
        if !self.enabled {
            return Ok(EditorOutcome::Ignored);
        }
        let position = self.surface(GeoPoint::new(lat, lng))?;

        match self.placement {
            PlacementMode::Confirm => {
                self.pending = Some(position);
                Ok(EditorOutcome::Pending { position })
            }
            PlacementMode::Quick => {
                let label = format!("Quick-{}", self.rng.random_range(QUICK_LABEL_RANGE));
                let zone = self.zones.pick(&mut self.rng).to_owned();
                self.create(position, label, zone).await
            }
        }
    }

    /// Complete a pending confirm-mode placement.
    ///
    /// The pending point is kept when validation or the create fails, so
    /// the operator can correct the form and retry.
    pub async fn confirm(&mut self, label: &str, zone: &str) -> Result<EditorOutcome, CoreError> {
        let Some(position) = self.pending else {
            return self.surface(Err(CoreError::validation(
                "placement",
                "no pending position to confirm",
            )));
        };
        let label = label.trim();
        if label.is_empty() {
            return self.surface(Err(CoreError::validation("label", "must not be empty")));
        }
        let zone = zone.trim();
        if !self.zones.contains(zone) {
            return self.surface(Err(CoreError::validation(
                "zone",
                format!("'{zone}' is not a configured zone"),
            )));
        }

        let outcome = self.create(position, label.to_owned(), zone.to_owned()).await?;
        self.pending = None;
        Ok(outcome)
    }

    pub fn cancel(&mut self) -> EditorOutcome {
        match self.pending.take() {
            Some(_) => EditorOutcome::Cancelled,
            None => EditorOutcome::Ignored,
        }
    }

    /// Drop a dragged fixture at its final coordinate.
    pub async fn drag_end(
        &mut self,
        id: LightId,
        lat: f64,
        lng: f64,
    ) -> Result<EditorOutcome, CoreError> {
        if !self.enabled {
            return Ok(EditorOutcome::Ignored);
        }
        let result = self.controller.move_light(id, lat, lng).await;
        self.surface(result)?;
        Ok(EditorOutcome::Moved { id })
    }

    pub async fn delete(&mut self, id: LightId) -> Result<EditorOutcome, CoreError> {
        if !self.enabled {
            return Ok(EditorOutcome::Ignored);
        }
        let result = self.controller.remove_light(id).await;
        self.surface(result)?;
        Ok(EditorOutcome::Deleted { id })
    }

    /// Dispatch one event to the matching gesture.
    pub async fn apply(&mut self, event: EditorEvent) -> Result<EditorOutcome, CoreError> {
        match event {
            EditorEvent::SetEditorMode { enabled } => Ok(self.set_editor_mode(enabled)),
            EditorEvent::SetPlacementMode { mode } => Ok(self.set_placement_mode(mode)),
            EditorEvent::Click { lat, lng } => self.click(lat, lng).await,
            EditorEvent::Confirm { label, zone } => self.confirm(&label, &zone).await,
            EditorEvent::Cancel => Ok(self.cancel()),
            EditorEvent::DragEnd { id, lat, lng } => self.drag_end(id, lat, lng).await,
            EditorEvent::Delete { id } => self.delete(id).await,
        }
    }

    /// Apply events in order. A failed event is reported and the session
    /// carries on with the next one; nothing is retried.
    pub async fn replay(&mut self, events: Vec<EditorEvent>) -> Vec<EditorOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            let outcome = match self.apply(event).await {
                Ok(outcome) => outcome,
                Err(e) => EditorOutcome::Failed {
                    message: e.to_string(),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    // ── Private helpers ──────────────────────────────────────────

    async fn create(
        &mut self,
        position: GeoPoint,
        label: String,
        zone: String,
    ) -> Result<EditorOutcome, CoreError> {
        let result = self
            .controller
            .create_light(CreateLightRequest {
                lat: position.lat,
                lng: position.lng,
                zone: zone.clone(),
                label: label.clone(),
            })
            .await;
        let id = self.surface(result)?;
        Ok(EditorOutcome::Created { id, label, zone })
    }

    /// Record a failure as the current notice and pass the result through.
    fn surface<T>(&mut self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e) = &result {
            warn!(error = %e, "editor action failed");
            self.notice = Some(e.to_string());
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use pretty_assertions::assert_eq;

    async fn editor() -> EditorController {
        let controller = Controller::new(ControllerConfig::default());
        controller.start().await.unwrap();
        let mut editor = EditorController::new(controller).unwrap().with_seed(7);
        editor.set_editor_mode(true);
        editor
    }

    #[test]
    fn catalog_trims_dedupes_and_rejects_empty() {
        let catalog = ZoneCatalog::new([" Apron A ", "Apron A", "", "Apron B"]).unwrap();
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["Apron A", "Apron B"]);
        assert!(ZoneCatalog::new(["  "]).is_err());
        assert!(ZoneCatalog::new(Vec::<String>::new()).is_err());
    }

    #[tokio::test]
    async fn gestures_are_inert_with_editor_off() {
        let mut editor = editor().await;
        let id = editor
            .controller
            .create_light(CreateLightRequest {
                lat: 1.0,
                lng: 1.0,
                zone: "Apron A".into(),
                label: "A-1".into(),
            })
            .await
            .unwrap();
        editor.set_editor_mode(false);
        let version = editor.controller.store().version();

        assert_eq!(editor.click(2.0, 2.0).await.unwrap(), EditorOutcome::Ignored);
        assert_eq!(editor.drag_end(id, 3.0, 3.0).await.unwrap(), EditorOutcome::Ignored);
        assert_eq!(editor.delete(id).await.unwrap(), EditorOutcome::Ignored);
        assert_eq!(editor.controller.store().version(), version);
        assert!(editor.pending().is_none());
    }

    #[tokio::test]
    async fn confirm_flow_creates_after_form() {
        let mut editor = editor().await;
        let outcome = editor.click(32.01, 34.89).await.unwrap();
        assert!(matches!(outcome, EditorOutcome::Pending { .. }));
        assert!(editor.controller.store().is_empty());

        let outcome = editor.confirm("TWY-A7", "Taxiway Alpha").await.unwrap();
        let EditorOutcome::Created { id, label, zone } = outcome else {
            panic!("expected a created light");
        };
        assert_eq!((label.as_str(), zone.as_str()), ("TWY-A7", "Taxiway Alpha"));
        let light = editor.controller.light(&id).unwrap();
        assert!(light.is_on());
        assert_eq!(light.position, GeoPoint { lat: 32.01, lng: 34.89 });
        assert!(editor.pending().is_none());
    }

    #[tokio::test]
    async fn cancel_discards_pending_without_side_effects() {
        let mut editor = editor().await;
        editor.click(1.0, 2.0).await.unwrap();
        assert_eq!(editor.cancel(), EditorOutcome::Cancelled);
        assert_eq!(editor.cancel(), EditorOutcome::Ignored);
        assert!(editor.controller.store().is_empty());
        assert_eq!(editor.controller.store().version(), 0);
    }

    #[tokio::test]
    async fn unknown_zone_is_rejected_and_pending_kept() {
        let mut editor = editor().await;
        editor.click(1.0, 2.0).await.unwrap();

        let err = editor.confirm("X", "Hangar 9").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(editor.notice().unwrap().contains("Hangar 9"));
        assert!(editor.pending().is_some());
        assert!(editor.controller.store().is_empty());

        editor.confirm("X", "Apron B").await.unwrap();
        assert_eq!(editor.controller.store().len(), 1);
    }

    #[tokio::test]
    async fn quick_mode_creates_immediately_from_catalog() {
        let mut editor = editor().await;
        editor.set_placement_mode(PlacementMode::Quick);

        let EditorOutcome::Created { label, zone, .. } = editor.click(1.0, 2.0).await.unwrap()
        else {
            panic!("expected a created light");
        };
        let digits = label.strip_prefix("Quick-").unwrap();
        assert_eq!(digits.len(), 5);
        assert!(digits.parse::<u32>().is_ok());
        assert!(editor.zones().contains(&zone));
        assert!(editor.pending().is_none());
    }

    #[tokio::test]
    async fn seeded_sessions_are_reproducible() {
        let mut a = editor().await;
        let mut b = editor().await;
        a.set_placement_mode(PlacementMode::Quick);
        b.set_placement_mode(PlacementMode::Quick);

        fn placed(outcome: EditorOutcome) -> (String, String) {
            match outcome {
                EditorOutcome::Created { label, zone, .. } => (label, zone),
                other => panic!("expected a created light, got {other:?}"),
            }
        }

        for _ in 0..3 {
            let left = placed(a.click(0.0, 0.0).await.unwrap());
            let right = placed(b.click(0.0, 0.0).await.unwrap());
            assert_eq!(left, right);
        }
    }

    #[tokio::test]
    async fn stale_ids_surface_not_found() {
        let mut editor = editor().await;
        editor.click(1.0, 1.0).await.unwrap();
        let EditorOutcome::Created { id, .. } = editor.confirm("A", "Apron A").await.unwrap()
        else {
            panic!("expected a created light");
        };

        assert_eq!(
            editor.drag_end(id, 5.0, 6.0).await.unwrap(),
            EditorOutcome::Moved { id }
        );
        assert_eq!(editor.delete(id).await.unwrap(), EditorOutcome::Deleted { id });

        let err = editor.drag_end(id, 7.0, 8.0).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(editor.notice().is_some());
        assert!(editor.controller.light(&id).is_none());
        assert!(editor.dismiss_notice().is_some());
        assert!(editor.notice().is_none());
    }

    #[tokio::test]
    async fn replay_continues_past_failures() {
        let events: Vec<EditorEvent> = serde_json::from_str(
            r#"[
                {"event": "set_placement_mode", "mode": "confirm"},
                {"event": "click", "lat": 32.0, "lng": 34.9},
                {"event": "confirm", "label": "X", "zone": "Nowhere"},
                {"event": "delete", "id": "00000000-0000-0000-0000-000000000000"},
                {"event": "confirm", "label": "APN-1", "zone": "Apron A"},
                {"event": "cancel"}
            ]"#,
        )
        .unwrap();

        let mut editor = editor().await;
        let outcomes = editor.replay(events).await;

        assert_eq!(outcomes.len(), 6);
        assert_eq!(outcomes[0], EditorOutcome::Ignored);
        assert!(matches!(outcomes[1], EditorOutcome::Pending { .. }));
        assert!(matches!(outcomes[2], EditorOutcome::Failed { .. }));
        assert!(matches!(outcomes[3], EditorOutcome::Failed { .. }));
        assert!(matches!(outcomes[4], EditorOutcome::Created { .. }));
        assert_eq!(outcomes[5], EditorOutcome::Ignored);
        assert_eq!(editor.controller.store().len(), 1);
    }

    #[test]
    fn events_parse_from_snake_case_json() {
        let event: EditorEvent =
            serde_json::from_str(r#"{"event": "set_editor_mode", "enabled": true}"#).unwrap();
        assert_eq!(event, EditorEvent::SetEditorMode { enabled: true });
        assert_eq!(event.name(), "set_editor_mode");
        assert_eq!("QUICK".parse::<PlacementMode>().unwrap(), PlacementMode::Quick);
    }
}
