//! Shared workbench model.
//!
//! DESIGN
//! ======
//! Typed records for everything the orchestrator shares across panels:
//! panel layout, simulation status, telemetry samples, the selection set,
//! and the active dataset. Each record spells out its optional fields so
//! panels never query an open-ended map.

use serde::{Deserialize, Serialize};

// =============================================================================
// PANEL
// =============================================================================

/// Semantic screen zone a panel is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Left,
    Center,
    Right,
    Top,
    Bottom,
}

/// Layout state of one panel.
///
/// A single enum keeps `Collapsed` exclusive with `Expanded`/`FullScreen`.
/// `FullScreen` implies expanded content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutState {
    #[default]
    Normal,
    Expanded,
    FullScreen,
    Collapsed,
}

impl LayoutState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Expanded => "expanded",
            Self::FullScreen => "full_screen",
            Self::Collapsed => "collapsed",
        }
    }
}

/// Static manifest entry for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub id: String,
    pub title: String,
    pub zone: Zone,
    #[serde(default)]
    pub can_full_screen: bool,
}

impl PanelConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>, zone: Zone, can_full_screen: bool) -> Self {
        Self { id: id.into(), title: title.into(), zone, can_full_screen }
    }
}

/// A registered panel and its current layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub zone: Zone,
    pub can_full_screen: bool,
    pub layout: LayoutState,
}

impl From<PanelConfig> for Panel {
    fn from(config: PanelConfig) -> Self {
        Self {
            id: config.id,
            title: config.title,
            zone: config.zone,
            can_full_screen: config.can_full_screen,
            layout: LayoutState::Normal,
        }
    }
}

/// Panel id of the structure viewer. Default tab in single-panel mode.
pub const STRUCTURE_VIEWER_PANEL: &str = "structure-viewer";

/// Panel id of the metric charts. Target of the assistant's `show-analysis`.
pub const METRICS_PANEL: &str = "metrics";

/// The cockpit's panel manifest, in render order.
#[must_use]
pub fn default_manifest() -> Vec<PanelConfig> {
    vec![
        PanelConfig::new("structure-browser", "Structure Browser", Zone::Left, false),
        PanelConfig::new("sequence-analyzer", "Sequence Analyzer", Zone::Left, true),
        PanelConfig::new(STRUCTURE_VIEWER_PANEL, "Molecular Viewer", Zone::Center, true),
        PanelConfig::new(METRICS_PANEL, "RMSD/RMSF Analysis", Zone::Right, true),
        PanelConfig::new("transport", "Simulation Controls", Zone::Right, false),
        PanelConfig::new("analysis-parameters", "Analysis Parameters", Zone::Right, false),
        PanelConfig::new("tools", "Tool Panel", Zone::Right, false),
        PanelConfig::new("assistant", "AI Assistant", Zone::Bottom, true),
    ]
}

// =============================================================================
// SIMULATION
// =============================================================================

/// Transport status of the simulation clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    #[default]
    Stopped,
    Running,
    Paused,
    Completed,
}

impl SimulationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

/// Simulated-time position and transport status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationState {
    pub status: SimulationStatus,
    /// Simulated time in ns. Always within `[0, horizon]`.
    pub current_time: f64,
    pub horizon: f64,
    pub speed: f64,
}

impl SimulationState {
    #[must_use]
    pub fn new(horizon: f64, speed: f64) -> Self {
        Self { status: SimulationStatus::Stopped, current_time: 0.0, horizon, speed }
    }

    /// Completion percentage in `[0, 100]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.current_time / self.horizon * 100.0).clamp(0.0, 100.0)
    }
}

/// One synthetic telemetry reading, produced per advance step while running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Simulated time the sample was taken at.
    pub timestamp: f64,
    /// Primary metric, backbone RMSD in Å.
    pub rmsd: f64,
    /// Potential energy in kJ/mol.
    pub potential_energy: f64,
    /// Temperature in K.
    pub temperature: f64,
    /// Pressure in bar.
    pub pressure: f64,
    /// Completion percentage at the time of the sample.
    pub progress: f64,
}

// =============================================================================
// SELECTION
// =============================================================================

/// Entity identifier shared across panels (residue index).
pub type EntityId = u32;

/// Ordered set of highlighted entities. Insertion order is kept for display;
/// ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<EntityId>,
}

impl SelectionSet {
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove `id` if present, append it otherwise. Returns whether `id` is
    /// selected afterwards.
    pub(crate) fn toggle(&mut self, id: EntityId) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| *existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }
}

// =============================================================================
// DATASET
// =============================================================================

/// Lifecycle status of a dataset record as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Active,
    Completed,
    Processing,
    Error,
}

/// The record currently under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub status: DatasetStatus,
    /// Human-readable size, e.g. `2.3 GB`.
    pub size: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
