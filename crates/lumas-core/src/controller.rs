// ── Controller abstraction ──
//
// Lifecycle management for one light inventory: loads the persisted
// table, routes commands through a single processor task, persists
// after every committed mutation, and exposes reactive views.

use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::{DashboardView, SystemStats, ZoneIndex};
use crate::command::{Command, CommandEnvelope, CommandResult, CreateLightRequest};
use crate::config::{ControllerConfig, RunwaySpec};
use crate::error::CoreError;
use crate::model::{Light, LightId, LightState};
use crate::seed::{self, SeedOutcome};
use crate::store::{self, LightStore};
use crate::stream::{EntityStream, Snapshot};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ControllerState ──────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Starting,
    Running,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every clone shares the
/// same store, so any number of operator sessions can mutate and
/// observe one inventory. Writes are last-write-wins.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<LightStore>,
    state: watch::Sender<ControllerState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT load or
    /// accept commands -- call [`start()`](Self::start) first.
    pub fn new(config: ControllerConfig) -> Self {
        let (state, _) = watch::channel(ControllerState::Stopped);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(LightStore::new()),
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<LightStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load the persisted light table (if configured) and spawn the
    /// command processor.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.inner.state.send_replace(ControllerState::Starting);

        if let Some(path) = &self.inner.config.data_path {
            match store::load_lights(path) {
                Ok(lights) => self.inner.store.restore(lights),
                Err(e) => {
                    self.inner.state.send_replace(ControllerState::Failed);
                    return Err(e);
                }
            }
        }

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        self.inner.state.send_replace(ControllerState::Running);
        info!(lights = self.inner.store.len(), "controller running");
        Ok(())
    }

    /// Stop the command processor. Commands still queued are dropped and
    /// their callers receive [`CoreError::ControllerStopped`].
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(ControllerState::Stopped);
        debug!("controller stopped");
    }

    /// One-shot: start, run closure, shut down.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.start().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    pub fn state(&self) -> watch::Receiver<ControllerState> {
        self.inner.state.subscribe()
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command through the processor task and await its result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.state.borrow() != ControllerState::Running {
            return Err(CoreError::ControllerStopped);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;

        rx.await.map_err(|_| CoreError::ControllerStopped)?
    }

    pub async fn create_light(&self, request: CreateLightRequest) -> Result<LightId, CoreError> {
        match self.execute(Command::CreateLight(request)).await? {
            CommandResult::Created(id) => Ok(id),
            other => Err(unexpected("create", &other)),
        }
    }

    pub async fn toggle_light(&self, id: LightId) -> Result<LightState, CoreError> {
        match self.execute(Command::ToggleLight { id }).await? {
            CommandResult::Toggled(state) => Ok(state),
            other => Err(unexpected("toggle", &other)),
        }
    }

    pub async fn set_light_status(&self, id: LightId, is_on: bool) -> Result<(), CoreError> {
        self.execute(Command::SetLightStatus { id, is_on }).await?;
        Ok(())
    }

    pub async fn set_light_state(&self, id: LightId, state: LightState) -> Result<(), CoreError> {
        self.execute(Command::SetLightState { id, state }).await?;
        Ok(())
    }

    pub async fn move_light(&self, id: LightId, lat: f64, lng: f64) -> Result<(), CoreError> {
        self.execute(Command::MoveLight { id, lat, lng }).await?;
        Ok(())
    }

    pub async fn remove_light(&self, id: LightId) -> Result<Arc<Light>, CoreError> {
        match self.execute(Command::RemoveLight { id }).await? {
            CommandResult::Removed(light) => Ok(light),
            other => Err(unexpected("remove", &other)),
        }
    }

    /// Seed the configured runway, or `runway` if given.
    pub async fn seed_lights(&self, runway: Option<RunwaySpec>) -> Result<SeedOutcome, CoreError> {
        let runway = runway.unwrap_or_else(|| self.inner.config.runway.clone());
        match self.execute(Command::SeedLights { runway }).await? {
            CommandResult::Seeded(outcome) => Ok(outcome),
            other => Err(unexpected("seed", &other)),
        }
    }

    // ── Reads (bypass the command channel) ───────────────────────

    pub fn lights_snapshot(&self) -> Snapshot<Light> {
        self.inner.store.list()
    }

    pub fn light(&self, id: &LightId) -> Option<Arc<Light>> {
        self.inner.store.get(id)
    }

    pub fn stats(&self) -> SystemStats {
        SystemStats::from_lights(self.lights_snapshot().iter())
    }

    pub fn zones(&self) -> ZoneIndex {
        ZoneIndex::from_lights(self.lights_snapshot().iter())
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::from_snapshot(&self.lights_snapshot())
    }

    // ── Streams ──────────────────────────────────────────────────

    pub fn lights(&self) -> EntityStream<Light> {
        self.inner.store.subscribe()
    }

    /// Dashboard views recomputed for every new snapshot version.
    pub fn dashboard_updates(&self) -> impl Stream<Item = DashboardView> + Send + 'static {
        self.lights()
            .into_stream()
            .map(|snap| DashboardView::from_snapshot(&snap))
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Process commands from the mpsc channel, one at a time.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command);
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Apply a command to the store, then persist if anything changed.
fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let store = &controller.inner.store;
    let name = cmd.name();
    let prior = store.list();
    let before = prior.version();

    let result = match cmd {
        Command::CreateLight(req) => store
            .create(req.lat, req.lng, &req.zone, &req.label)
            .map(CommandResult::Created),
        Command::ToggleLight { id } => store.toggle(&id).map(CommandResult::Toggled),
        Command::SetLightStatus { id, is_on } => {
            store.set_status(&id, is_on).map(|()| CommandResult::Ok)
        }
        Command::SetLightState { id, state } => {
            store.set_state(&id, state).map(|()| CommandResult::Ok)
        }
        Command::MoveLight { id, lat, lng } => store
            .update_position(&id, lat, lng)
            .map(|()| CommandResult::Ok),
        Command::RemoveLight { id } => store.remove(&id).map(CommandResult::Removed),
        Command::SeedLights { runway } => seed::seed(store, &runway).map(CommandResult::Seeded),
    };

    match &result {
        Ok(_) => debug!(command = name, "command applied"),
        Err(e) => warn!(command = name, error = %e, "command rejected"),
    }
    let result = result?;

    if store.version() != before {
        if let Some(path) = &controller.inner.config.data_path {
            if let Err(e) = store::save_lights(path, store) {
                // Roll back so memory never runs ahead of the table on disk.
                warn!(command = name, error = %e, "save failed, rolling back");
                store.restore(prior.iter().map(|l| (**l).clone()).collect());
                return Err(e);
            }
        }
    }

    Ok(result)
}

// ── Helpers ──────────────────────────────────────────────────────

fn unexpected(operation: &str, result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("{operation} returned unexpected result {result:?}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(label: &str) -> CreateLightRequest {
        CreateLightRequest {
            lat: 32.01,
            lng: 34.89,
            zone: "Taxiway Alpha".into(),
            label: label.into(),
        }
    }

    async fn running(config: ControllerConfig) -> Controller {
        let controller = Controller::new(config);
        controller.start().await.unwrap();
        controller
    }

    #[tokio::test]
    async fn commands_require_a_running_controller() {
        let controller = Controller::new(ControllerConfig::default());
        let err = controller.create_light(request("A")).await.unwrap_err();
        assert!(matches!(err, CoreError::ControllerStopped));
    }

    #[tokio::test]
    async fn forty_light_runway_reports_expected_stats() {
        let controller = running(ControllerConfig::default()).await;
        assert_eq!(
            controller.seed_lights(None).await.unwrap(),
            SeedOutcome::Seeded { count: 40 }
        );

        let ids: Vec<LightId> = controller.lights_snapshot().iter().map(|l| l.id).take(5).collect();
        for id in ids {
            controller.toggle_light(id).await.unwrap();
        }

        assert_eq!(
            controller.stats(),
            SystemStats {
                total: 40,
                operational: 35,
                failed: 5,
                health: 88,
            }
        );
        assert_eq!(controller.zones().total(), 40);
        assert_eq!(controller.dashboard().failed.len(), 5);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn not_found_is_surfaced_and_state_untouched() {
        let controller = running(ControllerConfig::default()).await;
        let id = controller.create_light(request("A")).await.unwrap();
        controller.remove_light(id).await.unwrap();
        let version = controller.store().version();

        let err = controller.move_light(id, 1.0, 1.0).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(controller.light(&id).is_none());
        assert_eq!(controller.store().version(), version);
    }

    #[tokio::test]
    async fn mutations_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = ControllerConfig {
            data_path: Some(dir.path().join("lights.json")),
            ..ControllerConfig::default()
        };

        let id = Controller::oneshot(config.clone(), |c| async move {
            let id = c.create_light(request("TWY-A1")).await?;
            c.set_light_state(id, LightState::Maintenance).await?;
            Ok(id)
        })
        .await
        .unwrap();

        let reloaded = running(config).await;
        let light = reloaded.light(&id).unwrap();
        assert_eq!(light.label, "TWY-A1");
        assert_eq!(light.state, LightState::Maintenance);
        reloaded.shutdown().await;
    }

    #[tokio::test]
    async fn rejected_commands_do_not_write_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        let controller = running(ControllerConfig {
            data_path: Some(path.clone()),
            ..ControllerConfig::default()
        })
        .await;

        assert!(controller.toggle_light(LightId::generate()).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_save_rolls_the_mutation_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        let controller = running(ControllerConfig {
            data_path: Some(path.clone()),
            ..ControllerConfig::default()
        })
        .await;
        let id = controller.create_light(request("TWY-A1")).await.unwrap();
        let stats = controller.stats();

        // A directory in place of the table makes every save fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = controller.create_light(request("TWY-A2")).await.unwrap_err();
        assert!(matches!(err, CoreError::Persistence { .. }));
        assert_eq!(controller.store().len(), 1);
        assert_eq!(controller.stats(), stats);

        assert!(controller.toggle_light(id).await.is_err());
        assert!(controller.light(&id).unwrap().is_on());
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn corrupt_table_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights.json");
        std::fs::write(&path, "[").unwrap();

        let controller = Controller::new(ControllerConfig {
            data_path: Some(path),
            ..ControllerConfig::default()
        });
        assert!(controller.start().await.is_err());
        assert_eq!(*controller.state().borrow(), ControllerState::Failed);
    }

    #[tokio::test]
    async fn commands_after_shutdown_are_refused() {
        let controller = running(ControllerConfig::default()).await;
        controller.shutdown().await;
        assert!(matches!(
            controller.seed_lights(None).await,
            Err(CoreError::ControllerStopped)
        ));
    }

    #[tokio::test]
    async fn dashboard_updates_follow_each_commit() {
        let controller = running(ControllerConfig::default()).await;
        let mut updates = Box::pin(controller.dashboard_updates());

        let id = controller.create_light(request("A")).await.unwrap();
        let view = updates.next().await.unwrap();
        assert_eq!(view.stats.total, 1);

        controller.set_light_status(id, false).await.unwrap();
        let view = updates.next().await.unwrap();
        assert_eq!((view.stats.failed, view.failed.len()), (1, 1));
        assert!(view.version > 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sessions_share_one_inventory() {
        let controller = running(ControllerConfig::default()).await;

        let mut handles = Vec::new();
        for session in 0..8 {
            let c = controller.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..10 {
                    c.create_light(request(&format!("S{session}-{n}"))).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let snap = controller.lights_snapshot();
        assert_eq!(snap.len(), 80);
        assert_eq!(snap.version(), 80);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_seeds_never_double_the_runway() {
        let controller = running(ControllerConfig::default()).await;
        let mut handles = Vec::new();
        for _ in 0..6 {
            let c = controller.clone();
            handles.push(tokio::spawn(async move { c.seed_lights(None).await.unwrap() }));
        }

        let mut seeded = 0;
        for h in handles {
            if matches!(h.await.unwrap(), SeedOutcome::Seeded { .. }) {
                seeded += 1;
            }
        }
        assert_eq!(seeded, 1);
        assert_eq!(controller.store().len(), 40);
    }
}
