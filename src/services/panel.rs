//! Panel service: per-panel layout state machine.
//!
//! DESIGN
//! ======
//! The controller is the only writer of panel layout. Panels live in
//! manifest order and are never removed while the workbench is mounted.
//!
//! FullScreen is exclusive across the workbench. Entering it acquires a
//! [`FullScreenLease`] (page scroll lock + escape-key listener) from the
//! [`ViewportHost`]; the lease is released by `Drop`, so every exit path
//! (explicit exit, escape, displacement by another panel, collapse, expand
//! toggle, controller teardown) releases both resources together.
//!
//! ERROR HANDLING
//! ==============
//! Operations on unregistered ids are logged and rejected without touching
//! any panel. Callers get the error back but are free to ignore it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::state::{LayoutState, Panel, PanelConfig};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("panel not registered: {0}")]
    InvalidPanelReference(String),
    #[error("panel already registered: {0}")]
    DuplicatePanel(String),
    #[error("panel cannot go full screen: {0}")]
    FullScreenNotAllowed(String),
}

impl crate::frame::ErrorCode for PanelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPanelReference(_) => "E_PANEL_UNKNOWN",
            Self::DuplicatePanel(_) => "E_PANEL_DUPLICATE",
            Self::FullScreenNotAllowed(_) => "E_PANEL_NO_FULL_SCREEN",
        }
    }
}

/// One layout transition applied to one panel.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LayoutChange {
    pub panel_id: String,
    pub from: LayoutState,
    pub to: LayoutState,
}

// =============================================================================
// VIEWPORT HOST
// =============================================================================

/// Page-level side effects of full-screen mode, provided by the host surface.
pub trait ViewportHost: Send + Sync {
    fn lock_scroll(&self, panel_id: &str);
    fn unlock_scroll(&self, panel_id: &str);
    fn install_escape_listener(&self, panel_id: &str);
    fn remove_escape_listener(&self, panel_id: &str);
}

/// Host with no page to lock. Used when the workbench runs headless.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl ViewportHost for HeadlessHost {
    fn lock_scroll(&self, _panel_id: &str) {}
    fn unlock_scroll(&self, _panel_id: &str) {}
    fn install_escape_listener(&self, _panel_id: &str) {}
    fn remove_escape_listener(&self, _panel_id: &str) {}
}

/// Scroll lock + escape listener held on behalf of the full-screen panel.
pub struct FullScreenLease {
    panel_id: String,
    host: Arc<dyn ViewportHost>,
}

impl FullScreenLease {
    fn acquire(panel_id: &str, host: Arc<dyn ViewportHost>) -> Self {
        host.lock_scroll(panel_id);
        host.install_escape_listener(panel_id);
        Self { panel_id: panel_id.to_owned(), host }
    }

    #[must_use]
    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }
}

impl Drop for FullScreenLease {
    fn drop(&mut self) {
        self.host.remove_escape_listener(&self.panel_id);
        self.host.unlock_scroll(&self.panel_id);
    }
}

impl std::fmt::Debug for FullScreenLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullScreenLease").field("panel_id", &self.panel_id).finish()
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct PanelController {
    /// Panels in manifest order.
    panels: Vec<Panel>,
    /// Panel id -> index into `panels`.
    index: HashMap<String, usize>,
    /// Held while exactly one panel is FullScreen.
    lease: Option<FullScreenLease>,
    host: Arc<dyn ViewportHost>,
}

impl PanelController {
    #[must_use]
    pub fn new(host: Arc<dyn ViewportHost>) -> Self {
        Self { panels: Vec::new(), index: HashMap::new(), lease: None, host }
    }

    /// Build a controller pre-populated from a manifest. Duplicate entries
    /// are logged and skipped.
    #[must_use]
    pub fn with_manifest(host: Arc<dyn ViewportHost>, manifest: Vec<PanelConfig>) -> Self {
        let mut controller = Self::new(host);
        for config in manifest {
            if let Err(err) = controller.register(config) {
                warn!(error = %err, "panel: manifest entry skipped");
            }
        }
        controller
    }

    /// Add a panel to the managed set.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::DuplicatePanel`] (logged, no-op) if the id is taken.
    pub fn register(&mut self, config: PanelConfig) -> Result<(), PanelError> {
        if self.index.contains_key(&config.id) {
            warn!(panel = %config.id, "panel: duplicate registration ignored");
            return Err(PanelError::DuplicatePanel(config.id));
        }
        self.index.insert(config.id.clone(), self.panels.len());
        info!(panel = %config.id, zone = ?config.zone, "panel: registered");
        self.panels.push(Panel::from(config));
        Ok(())
    }

    /// Current layout of `id`, `None` for unregistered ids.
    #[must_use]
    pub fn get_state(&self, id: &str) -> Option<LayoutState> {
        self.index.get(id).map(|&idx| self.panels[idx].layout)
    }

    #[must_use]
    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.index.get(id).map(|&idx| &self.panels[idx])
    }

    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Id of the panel currently holding FullScreen.
    #[must_use]
    pub fn full_screen_panel(&self) -> Option<&str> {
        self.lease.as_ref().map(FullScreenLease::panel_id)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Enter or leave FullScreen for `id`.
    ///
    /// Entering displaces any other FullScreen panel to Normal first, then
    /// acquires the lease for `id`. Leaving releases the lease and restores
    /// the panel to Expanded.
    ///
    /// # Errors
    ///
    /// [`PanelError::InvalidPanelReference`] for unknown ids and
    /// [`PanelError::FullScreenNotAllowed`] for panels without the capability.
    pub fn set_full_screen(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        let idx = self.lookup(id)?;
        let current = self.panels[idx].layout;

        if !on {
            if current != LayoutState::FullScreen {
                return Ok(Vec::new());
            }
            return Ok(self.transition(idx, LayoutState::Expanded).into_iter().collect());
        }

        if !self.panels[idx].can_full_screen {
            warn!(panel = %id, "panel: full screen not allowed");
            return Err(PanelError::FullScreenNotAllowed(id.to_owned()));
        }
        if current == LayoutState::FullScreen {
            return Ok(Vec::new());
        }

        let mut changes = Vec::new();
        // PHASE: DISPLACE PREVIOUS HOLDER
        // WHY: the previous lease must be released before the new one is
        // acquired so the host never sees two scroll locks.
        if let Some(holder) = self.full_screen_index() {
            changes.extend(self.transition(holder, LayoutState::Normal));
        }
        changes.extend(self.transition(idx, LayoutState::FullScreen));
        Ok(changes)
    }

    /// Escape-key path: exit whichever panel is FullScreen.
    pub fn escape(&mut self) -> Vec<LayoutChange> {
        let Some(holder) = self.full_screen_index() else {
            return Vec::new();
        };
        self.transition(holder, LayoutState::Expanded)
            .into_iter()
            .collect()
    }

    /// Toggle Expanded. Exits FullScreen first when needed.
    ///
    /// From Collapsed, `true` uncollapses straight to Expanded and `false`
    /// leaves the panel collapsed.
    ///
    /// # Errors
    ///
    /// [`PanelError::InvalidPanelReference`] for unknown ids.
    pub fn set_expanded(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        let idx = self.lookup(id)?;
        let current = self.panels[idx].layout;

        let target = match (current, on) {
            (LayoutState::Collapsed, false) => return Ok(Vec::new()),
            (_, true) => LayoutState::Expanded,
            (_, false) => LayoutState::Normal,
        };
        Ok(self.transition(idx, target).into_iter().collect())
    }

    /// Toggle Collapsed. Entering Collapsed clears Expanded/FullScreen.
    ///
    /// # Errors
    ///
    /// [`PanelError::InvalidPanelReference`] for unknown ids.
    pub fn set_collapsed(&mut self, id: &str, on: bool) -> Result<Vec<LayoutChange>, PanelError> {
        let idx = self.lookup(id)?;
        let current = self.panels[idx].layout;

        let target = match (current, on) {
            (_, true) => LayoutState::Collapsed,
            (LayoutState::Collapsed, false) => LayoutState::Normal,
            (_, false) => return Ok(Vec::new()),
        };
        Ok(self.transition(idx, target).into_iter().collect())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn lookup(&self, id: &str) -> Result<usize, PanelError> {
        match self.index.get(id) {
            Some(&idx) => Ok(idx),
            None => {
                warn!(panel = %id, "panel: operation on unregistered panel ignored");
                Err(PanelError::InvalidPanelReference(id.to_owned()))
            }
        }
    }

    fn full_screen_index(&self) -> Option<usize> {
        let holder = self.lease.as_ref()?;
        self.index.get(holder.panel_id()).copied()
    }

    /// Apply one transition and keep the lease in step with it.
    fn transition(&mut self, idx: usize, to: LayoutState) -> Option<LayoutChange> {
        let from = self.panels[idx].layout;
        if from == to {
            return None;
        }

        if from == LayoutState::FullScreen {
            // Dropping the lease unlocks scroll and removes the listener.
            self.lease = None;
        }
        if to == LayoutState::FullScreen {
            self.lease = Some(FullScreenLease::acquire(&self.panels[idx].id, Arc::clone(&self.host)));
        }

        let panel = &mut self.panels[idx];
        panel.layout = to;
        info!(panel = %panel.id, from = from.as_str(), to = to.as_str(), "panel: layout changed");
        Some(LayoutChange { panel_id: panel.id.clone(), from, to })
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
