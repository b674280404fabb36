//! Workbench orchestrator: composes panels, clock, selection and the active
//! dataset, and fans state changes out to panel sinks.
//!
//! ARCHITECTURE
//! ============
//! The orchestrator is the single writer of shared state. Panels never hold
//! a reference to each other; they subscribe a bounded frame sink and issue
//! commands. Every public mutation here:
//!
//! 1. validates and applies the change through the owning service
//! 2. broadcasts the resulting state as a `request` frame to every sink
//! 3. returns the change to the caller for the command reply
//!
//! DATASET CASCADE
//! ===============
//! `set_dataset` is synchronous and ordered: clock reset, selection clear,
//! structure deselect, overlay and scoped-cache invalidation, then the
//! `dataset:changed` frame. No panel can observe the new dataset next to the
//! old time or selection.
//!
//! Picking a structure inside the dataset is a smaller cascade: the selection
//! is cleared and the cavity and prediction overlays are reseeded for it.
//!
//! RESPONSIVE MODE
//! ===============
//! Below the compact width only one panel is visible (a tab strip picks it).
//! Switching modes never touches simulation or selection state. Entering the
//! single-panel mode releases any FullScreen lease.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, WorkbenchConfig};
use crate::frame::{Data, Frame};
use crate::services::clock::{Advance, ClockError, ClockTransition, SimulationClock};
use crate::services::command::{Action, Command, CommandError, parse_command};
use crate::services::dataset::{
    ActiveDatasetRegistry, CAVITIES_OVERLAY, DatasetError, DatasetProvider, DatasetScoped, OverlayStore,
    PREDICTIONS_OVERLAY, StaticCatalog, cavity_analysis, conformation_predictions,
};
use crate::services::panel::{HeadlessHost, LayoutChange, PanelController, PanelError, ViewportHost};
use crate::services::selection::{ListenerId, SelectionBus};
use crate::state::{
    Dataset, EntityId, LayoutState, METRICS_PANEL, Panel, STRUCTURE_VIEWER_PANEL, SelectionSet, SimulationState,
    TelemetrySample, default_manifest,
};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}

impl crate::frame::ErrorCode for WorkbenchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Clock(e) => e.error_code(),
        }
    }
}

/// Responsive layout mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Cockpit,
    SingleActivePanel,
}

impl LayoutMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cockpit => "cockpit",
            Self::SingleActivePanel => "single_active_panel",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Full serialisable view of the workbench, for late-joining panels.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchSnapshot {
    pub mode: LayoutMode,
    pub active_tab: String,
    pub viewport: Option<Viewport>,
    pub panels: Vec<Panel>,
    pub visible: Vec<String>,
    pub full_screen: Option<String>,
    pub simulation: SimulationState,
    pub telemetry: Option<TelemetrySample>,
    pub selection: SelectionSet,
    pub dataset: Option<Dataset>,
    pub dataset_generation: u64,
    pub structure: Option<String>,
    pub overlays: Vec<String>,
}

// =============================================================================
// WORKBENCH
// =============================================================================

pub struct Workbench {
    config: WorkbenchConfig,
    panels: PanelController,
    clock: SimulationClock,
    selection: SelectionBus,
    datasets: ActiveDatasetRegistry,
    provider: Box<dyn DatasetProvider>,
    overlays: OverlayStore,
    structure: Option<String>,
    caches: Vec<Arc<dyn DatasetScoped>>,
    mode: LayoutMode,
    active_tab: String,
    viewport: Option<Viewport>,
    sinks: Vec<(Uuid, mpsc::Sender<Frame>)>,
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("mode", &self.mode)
            .field("active_tab", &self.active_tab)
            .field("clock", &self.clock)
            .field("dataset", &self.datasets.current_id())
            .field("structure", &self.structure)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl Workbench {
    /// Build a workbench over the default panel manifest. The first record
    /// the provider lists becomes the active dataset.
    ///
    /// # Errors
    ///
    /// [`WorkbenchError`] when the config or the clock parameters are invalid.
    pub fn new(
        config: WorkbenchConfig,
        provider: Box<dyn DatasetProvider>,
        host: Arc<dyn ViewportHost>,
    ) -> Result<Self, WorkbenchError> {
        config.validate()?;
        let clock = SimulationClock::new(config.simulation)?;

        let mut datasets = ActiveDatasetRegistry::default();
        if let Some(first) = provider.list().into_iter().next() {
            datasets.replace(first);
        }

        info!(
            horizon = config.simulation.horizon,
            compact_width = config.compact_width,
            dataset = datasets.current_id().unwrap_or("-"),
            "workbench: mounted"
        );

        Ok(Self {
            config,
            panels: PanelController::with_manifest(host, default_manifest()),
            clock,
            selection: SelectionBus::new(),
            datasets,
            provider,
            overlays: OverlayStore::default(),
            structure: None,
            caches: Vec::new(),
            mode: LayoutMode::Cockpit,
            active_tab: STRUCTURE_VIEWER_PANEL.to_owned(),
            viewport: None,
            sinks: Vec::new(),
        })
    }

    /// Workbench with the built-in catalog and no host viewport.
    ///
    /// # Errors
    ///
    /// Same as [`Workbench::new`].
    pub fn headless(config: WorkbenchConfig) -> Result<Self, WorkbenchError> {
        Self::new(config, Box::new(StaticCatalog::builtin()), Arc::new(HeadlessHost))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    #[must_use]
    pub fn panels(&self) -> &PanelController {
        &self.panels
    }

    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    #[must_use]
    pub fn selection(&self) -> Arc<SelectionSet> {
        self.selection.snapshot()
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.datasets.current()
    }

    #[must_use]
    pub fn dataset_generation(&self) -> u64 {
        self.datasets.generation()
    }

    /// Every record the provider offers.
    #[must_use]
    pub fn datasets(&self) -> Vec<Dataset> {
        self.provider.list()
    }

    /// Structure picked inside the active dataset, if any.
    #[must_use]
    pub fn selected_structure(&self) -> Option<&str> {
        self.structure.as_deref()
    }

    #[must_use]
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    #[must_use]
    pub fn active_tab(&self) -> &str {
        &self.active_tab
    }

    #[must_use]
    pub fn overlay(&self, kind: &str) -> Option<&Value> {
        self.overlays.get(kind)
    }

    /// Panels currently on screen: all non-collapsed panels in cockpit mode,
    /// only the active tab in single-panel mode.
    #[must_use]
    pub fn visible_panels(&self) -> Vec<&Panel> {
        match self.mode {
            LayoutMode::Cockpit => self
                .panels
                .panels()
                .iter()
                .filter(|p| p.layout != LayoutState::Collapsed)
                .collect(),
            LayoutMode::SingleActivePanel => self.panels.panel(&self.active_tab).into_iter().collect(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> WorkbenchSnapshot {
        WorkbenchSnapshot {
            mode: self.mode,
            active_tab: self.active_tab.clone(),
            viewport: self.viewport,
            panels: self.panels.panels().to_vec(),
            visible: self.visible_panels().into_iter().map(|p| p.id.clone()).collect(),
            full_screen: self.panels.full_screen_panel().map(str::to_owned),
            simulation: *self.clock.state(),
            telemetry: self.clock.last_sample().copied(),
            selection: (*self.selection.snapshot()).clone(),
            dataset: self.datasets.current().cloned(),
            dataset_generation: self.datasets.generation(),
            structure: self.structure.clone(),
            overlays: self.overlays.kinds().into_iter().map(str::to_owned).collect(),
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a panel sink. Frames are delivered with `try_send`: a full
    /// sink misses frames rather than building a backlog.
    pub fn subscribe_sink(&mut self, sink: mpsc::Sender<Frame>) -> Uuid {
        let id = Uuid::new_v4();
        self.sinks.push((id, sink));
        info!(sink = %id, sinks = self.sinks.len(), "workbench: sink subscribed");
        id
    }

    pub fn unsubscribe_sink(&mut self, id: Uuid) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(existing, _)| *existing != id);
        self.sinks.len() != before
    }

    /// Synchronous selection listener, called in subscription order after
    /// every selection mutation.
    pub fn subscribe_selection<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Arc<SelectionSet>) + Send + 'static,
    {
        self.selection.subscribe(listener)
    }

    pub fn unsubscribe_selection(&mut self, id: ListenerId) -> bool {
        self.selection.unsubscribe(id)
    }

    /// Register a cache to be invalidated on every dataset change.
    pub fn register_cache(&mut self, cache: Arc<dyn DatasetScoped>) {
        self.caches.push(cache);
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Parse and execute one command record. Returns the reply payload.
    ///
    /// # Errors
    ///
    /// [`CommandError`] for unknown kinds, malformed payloads, and rejected
    /// operations. State is unchanged on error.
    pub fn dispatch(&mut self, command: &Command) -> Result<Data, CommandError> {
        let result = parse_command(command).and_then(|action| self.execute(action));
        if let Err(err) = &result {
            warn!(kind = %command.kind, error = %err, "workbench: command rejected");
        }
        result
    }

    /// Execute an already-validated action.
    ///
    /// # Errors
    ///
    /// [`CommandError`] wrapping the owning service's rejection.
    pub fn execute(&mut self, action: Action) -> Result<Data, CommandError> {
        debug!(action = ?action, "workbench: execute");
        match action {
            Action::ExpandPanel(id) => Ok(changes_data(&self.set_expanded(&id, true)?)),
            Action::CollapsePanel(id) => Ok(changes_data(&self.set_collapsed(&id, true)?)),
            Action::RestorePanel(id) => Ok(changes_data(&self.restore_panel(&id)?)),
            Action::FullScreenPanel(id) => Ok(changes_data(&self.set_full_screen(&id, true)?)),
            Action::ExitFullScreen(Some(id)) => Ok(changes_data(&self.set_full_screen(&id, false)?)),
            Action::ExitFullScreen(None) | Action::Escape => Ok(changes_data(&self.escape())),
            Action::ShowAnalysis => {
                let changes = self.set_expanded(METRICS_PANEL, true)?;
                if self.mode == LayoutMode::SingleActivePanel {
                    self.focus_panel(METRICS_PANEL)?;
                }
                Ok(changes_data(&changes))
            }
            Action::HighlightEntities(ids) => {
                let added = self.highlight_entities(&ids);
                Ok(self.selection_data().with("added", json!(added)))
            }
            Action::ToggleEntity(id) => {
                let selected = self.toggle_entity(id);
                Ok(self.selection_data().with("selected", json!(selected)))
            }
            Action::ClearSelection => {
                self.clear_selection();
                Ok(self.selection_data())
            }
            Action::SeekTime(time) => {
                self.seek(time)?;
                Ok(self.clock_data())
            }
            Action::Play => {
                self.play()?;
                Ok(self.clock_data())
            }
            Action::Pause => {
                self.pause()?;
                Ok(self.clock_data())
            }
            Action::Stop => {
                self.stop();
                Ok(self.clock_data())
            }
            Action::Reset => {
                self.reset();
                Ok(self.clock_data())
            }
            Action::SetSpeed(speed) => {
                self.set_speed(speed)?;
                Ok(self.clock_data())
            }
            Action::SelectDataset(id) => {
                self.select_dataset(&id)?;
                Ok(self.dataset_data())
            }
            Action::FocusPanel(id) => {
                self.focus_panel(&id)?;
                Ok(self.mode_data())
            }
            Action::SetOverlay { kind, payload } => {
                self.set_overlay(&kind, payload);
                Ok(Data::new().with("kind", json!(kind)))
            }
            Action::ResizeViewport { width, height } => {
                self.resize(width, height);
                Ok(self.mode_data())
            }
            Action::SelectStructure(structure) => {
                self.select_structure(structure.as_deref());
                Ok(self.structure_data())
            }
            Action::HighlightCavities => Ok(self.highlight_cavities()?),
            Action::ShowConformations => Ok(self.show_conformations()?),
        }
    }

    // =========================================================================
    // PANELS
    // =========================================================================

    /// # Errors
    ///
    /// See [`PanelController::set_full_screen`].
    pub fn set_full_screen(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        // EDGE: in single-panel mode the visible panel already fills the
        // viewport; a full-screen request selects the tab instead.
        if on && self.mode == LayoutMode::SingleActivePanel {
            if self.panels.panel(id).is_some_and(|p| !p.can_full_screen) {
                return Err(PanelError::FullScreenNotAllowed(id.to_owned()));
            }
            self.focus_panel(id)?;
            return Ok(Vec::new());
        }
        let changes = self.panels.set_full_screen(id, on)?;
        self.broadcast_layout(&changes);
        Ok(changes)
    }

    /// # Errors
    ///
    /// See [`PanelController::set_expanded`].
    pub fn set_expanded(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        let changes = self.panels.set_expanded(id, on)?;
        self.broadcast_layout(&changes);
        Ok(changes)
    }

    /// # Errors
    ///
    /// See [`PanelController::set_collapsed`].
    pub fn set_collapsed(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        let changes = self.panels.set_collapsed(id, on)?;
        self.broadcast_layout(&changes);
        Ok(changes)
    }

    /// Return `id` to Normal from any state.
    ///
    /// # Errors
    ///
    /// [`PanelError::InvalidPanelReference`] for unknown ids.
    pub fn restore_panel(&mut self, id: &str) -> Result<Vec<LayoutChange>, PanelError> {
        match self.panels.get_state(id) {
            None => Err(PanelError::InvalidPanelReference(id.to_owned())),
            Some(LayoutState::Collapsed) => self.set_collapsed(id, false),
            Some(_) => self.set_expanded(id, false),
        }
    }

    /// Escape-key path.
    pub fn escape(&mut self) -> Vec<LayoutChange> {
        let changes = self.panels.escape();
        self.broadcast_layout(&changes);
        changes
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    pub fn toggle_entity(&mut self, id: EntityId) -> bool {
        let selected = self.selection.toggle(id);
        self.broadcast_selection();
        selected
    }

    /// Add every id not already selected. Returns how many were added.
    pub fn highlight_entities(&mut self, ids: &[EntityId]) -> usize {
        let added = self.selection.extend(ids);
        if added > 0 {
            self.broadcast_selection();
        }
        added
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.broadcast_selection();
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// # Errors
    ///
    /// See [`SimulationClock::play`].
    pub fn play(&mut self) -> Result<ClockTransition, ClockError> {
        let transition = self.clock.play()?;
        self.broadcast_clock();
        Ok(transition)
    }

    /// # Errors
    ///
    /// See [`SimulationClock::pause`].
    pub fn pause(&mut self) -> Result<ClockTransition, ClockError> {
        let transition = self.clock.pause()?;
        self.broadcast_clock();
        Ok(transition)
    }

    pub fn stop(&mut self) -> ClockTransition {
        let transition = self.clock.stop();
        self.broadcast_clock();
        transition
    }

    pub fn reset(&mut self) -> ClockTransition {
        let transition = self.clock.reset();
        self.broadcast_clock();
        transition
    }

    /// # Errors
    ///
    /// See [`SimulationClock::set_speed`].
    pub fn set_speed(&mut self, multiplier: f64) -> Result<f64, ClockError> {
        let previous = self.clock.set_speed(multiplier)?;
        self.broadcast_clock();
        Ok(previous)
    }

    /// # Errors
    ///
    /// See [`SimulationClock::seek`].
    pub fn seek(&mut self, time: f64) -> Result<(), ClockError> {
        self.clock.seek(time)?;
        self.broadcast_clock();
        Ok(())
    }

    /// Apply one tick of `delta` wall-clock seconds. Broadcasts the sample,
    /// and the status change when the horizon is reached.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidDelta`] for a negative or non-finite delta.
    pub fn on_tick(&mut self, delta: f64) -> Result<Option<Advance>, ClockError> {
        let Some(step) = self.clock.advance(delta)? else {
            return Ok(None);
        };
        self.broadcast("clock:telemetry", sample_data(&step.sample));
        if step.completed {
            self.broadcast_clock();
        }
        Ok(Some(step))
    }

    // =========================================================================
    // DATASET
    // =========================================================================

    /// Resolve `id` through the provider and make it the active dataset.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownDataset`]; nothing changes.
    pub fn select_dataset(&mut self, id: &str) -> Result<(), DatasetError> {
        let record = self.provider.get(id)?;
        self.set_dataset(record);
        Ok(())
    }

    /// Replace the active dataset and run the cascade. Re-selecting the
    /// current dataset still cascades.
    pub fn set_dataset(&mut self, record: Dataset) {
        let previous = self.datasets.replace(record);

        // PHASE: CASCADE
        // WHY: the new record must never be visible next to state derived
        // from the old one.
        self.clock.reset();
        self.selection.clear();
        self.structure = None;
        let dropped = self.overlays.invalidate();
        if let Some(current) = self.datasets.current() {
            for cache in &self.caches {
                cache.invalidate(current);
            }
        }

        // PHASE: NOTIFY
        self.broadcast_clock();
        self.broadcast_selection();
        info!(
            from = previous.as_ref().map_or("-", |d| d.id.as_str()),
            to = self.datasets.current_id().unwrap_or("-"),
            overlays_dropped = dropped,
            caches = self.caches.len(),
            "workbench: dataset changed"
        );
        let data = self.dataset_data();
        self.broadcast("dataset:changed", data);
    }

    /// Store a dataset-scoped overlay payload and broadcast it.
    pub fn set_overlay(&mut self, kind: &str, payload: Value) {
        self.overlays.set(kind, payload.clone());
        self.broadcast("overlay:changed", Data::new().with("kind", json!(kind)).with("payload", payload));
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Pick a structure inside the active dataset, or deselect with `None`.
    /// The selection is cleared either way; picking a structure also seeds
    /// its cavity and prediction overlays.
    pub fn select_structure(&mut self, structure: Option<&str>) {
        self.structure = structure.map(str::to_owned);
        self.selection.clear();
        self.broadcast_selection();
        if let Some(id) = structure {
            self.set_overlay(CAVITIES_OVERLAY, cavity_analysis(id));
            self.set_overlay(PREDICTIONS_OVERLAY, conformation_predictions(id));
        }
        info!(structure = structure.unwrap_or("-"), "workbench: structure selected");
        let data = self.structure_data();
        self.broadcast("structure:selected", data);
    }

    /// Push the stored cavity analysis to every sink.
    ///
    /// # Errors
    ///
    /// [`DatasetError::OverlayMissing`] until a structure has been selected.
    pub fn highlight_cavities(&mut self) -> Result<Data, DatasetError> {
        self.present_overlay(CAVITIES_OVERLAY)
    }

    /// Push the stored conformation predictions to every sink.
    ///
    /// # Errors
    ///
    /// [`DatasetError::OverlayMissing`] until a structure has been selected.
    pub fn show_conformations(&mut self) -> Result<Data, DatasetError> {
        self.present_overlay(PREDICTIONS_OVERLAY)
    }

    fn present_overlay(&mut self, kind: &str) -> Result<Data, DatasetError> {
        let payload = self.overlays.require(kind)?.clone();
        let data = Data::new().with("kind", json!(kind)).with("payload", payload);
        self.broadcast("overlay:highlight", data.clone());
        Ok(data)
    }

    // =========================================================================
    // RESPONSIVE MODE
    // =========================================================================

    /// Record the viewport size and switch layout mode at the compact width.
    pub fn resize(&mut self, width: u32, height: u32) -> LayoutMode {
        self.viewport = Some(Viewport { width, height });
        let next = if width < self.config.compact_width {
            LayoutMode::SingleActivePanel
        } else {
            LayoutMode::Cockpit
        };
        if next == self.mode {
            return next;
        }

        if next == LayoutMode::SingleActivePanel {
            let changes = self.panels.escape();
            self.broadcast_layout(&changes);
        }
        info!(from = self.mode.as_str(), to = next.as_str(), width, height, "workbench: layout mode changed");
        self.mode = next;
        let data = self.mode_data();
        self.broadcast("workbench:mode", data);
        next
    }

    /// Pick the panel shown in single-panel mode.
    ///
    /// # Errors
    ///
    /// [`PanelError::InvalidPanelReference`] for unknown ids.
    pub fn focus_panel(&mut self, id: &str) -> Result<(), PanelError> {
        if !self.panels.contains(id) {
            warn!(panel = %id, "workbench: focus on unregistered panel ignored");
            return Err(PanelError::InvalidPanelReference(id.to_owned()));
        }
        if self.active_tab != id {
            id.clone_into(&mut self.active_tab);
            let data = self.mode_data();
            self.broadcast("workbench:mode", data);
        }
        Ok(())
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    fn broadcast(&mut self, syscall: &str, data: Data) {
        if self.sinks.is_empty() {
            return;
        }
        let frame = Frame::request(syscall, data).with_dataset_id(self.datasets.current_id());
        self.sinks.retain(|(id, sink)| match sink.try_send(frame.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(sink = %id, syscall, "workbench: sink full, frame dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                info!(sink = %id, "workbench: closed sink pruned");
                false
            }
        });
    }

    fn broadcast_layout(&mut self, changes: &[LayoutChange]) {
        for change in changes {
            let data = Data::new()
                .with("panel", json!(change.panel_id))
                .with("from", json!(change.from.as_str()))
                .with("to", json!(change.to.as_str()));
            self.broadcast("panel:layout", data);
        }
    }

    fn broadcast_clock(&mut self) {
        let data = self.clock_data();
        self.broadcast("clock:status", data);
    }

    fn broadcast_selection(&mut self) {
        let data = self.selection_data();
        self.broadcast("selection:changed", data);
    }

    // =========================================================================
    // PAYLOADS
    // =========================================================================

    fn clock_data(&self) -> Data {
        let state = self.clock.state();
        Data::new()
            .with("status", json!(state.status.as_str()))
            .with("current_time", json!(state.current_time))
            .with("horizon", json!(state.horizon))
            .with("speed", json!(state.speed))
            .with("progress", json!(state.progress()))
    }

    fn selection_data(&self) -> Data {
        Data::new().with("selection", json!(self.selection.snapshot().ids()))
    }

    fn dataset_data(&self) -> Data {
        Data::new()
            .with("dataset", json!(self.datasets.current()))
            .with("generation", json!(self.datasets.generation()))
            .with("structure", json!(self.structure))
    }

    fn structure_data(&self) -> Data {
        Data::new().with("structure", json!(self.structure))
    }

    fn mode_data(&self) -> Data {
        Data::new()
            .with("mode", json!(self.mode.as_str()))
            .with("active_tab", json!(self.active_tab))
            .with("viewport", json!(self.viewport))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Builder-style insert for payload maps.
trait DataExt {
    fn with(self, key: &str, value: Value) -> Self;
}

impl DataExt for Data {
    fn with(mut self, key: &str, value: Value) -> Self {
        self.insert(key.to_owned(), value);
        self
    }
}

fn changes_data(changes: &[LayoutChange]) -> Data {
    Data::new().with("changes", json!(changes))
}

fn sample_data(sample: &TelemetrySample) -> Data {
    Data::new()
        .with("timestamp", json!(sample.timestamp))
        .with("rmsd", json!(sample.rmsd))
        .with("potential_energy", json!(sample.potential_energy))
        .with("temperature", json!(sample.temperature))
        .with("pressure", json!(sample.pressure))
        .with("progress", json!(sample.progress))
}

#[cfg(test)]
#[path = "workbench_test.rs"]
mod tests;
