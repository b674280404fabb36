//! Command table: opaque `{kind, payload}` records parsed into typed actions.
//!
//! DESIGN
//! ======
//! Every outside trigger (assistant output, transport buttons, CLI input)
//! arrives as a [`Command`]. Parsing is separate from execution: a command
//! either becomes a fully-validated [`Action`] or is rejected before any
//! state is touched. The orchestrator executes actions.
//!
//! ERROR HANDLING
//! ==============
//! Unknown kinds and malformed payloads are reported as [`CommandError`] and
//! never tear down the session. Execution failures from the panel, clock,
//! and dataset services are wrapped so every failure carries one error code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::clock::ClockError;
use crate::services::dataset::DatasetError;
use crate::services::panel::PanelError;
use crate::state::EntityId;

// =============================================================================
// TYPES
// =============================================================================

/// Opaque command record. `payload` shape depends on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Command {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self { kind: kind.into(), payload }
    }

    /// Command with no payload.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command kind: {0}")]
    UnknownCommandKind(String),
    #[error("invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: String, reason: String },
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl crate::frame::ErrorCode for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCommandKind(_) => "E_COMMAND_UNKNOWN_KIND",
            Self::InvalidPayload { .. } => "E_COMMAND_INVALID_PAYLOAD",
            Self::Panel(e) => e.error_code(),
            Self::Clock(e) => e.error_code(),
            Self::Dataset(e) => e.error_code(),
        }
    }
}

/// A validated command, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ExpandPanel(String),
    CollapsePanel(String),
    /// Back to Normal from Expanded, FullScreen, or Collapsed.
    RestorePanel(String),
    FullScreenPanel(String),
    /// Exit FullScreen for the named panel, or for whichever holds it.
    ExitFullScreen(Option<String>),
    Escape,
    /// Reveal the metric charts.
    ShowAnalysis,
    /// Add each listed entity that is not already selected.
    HighlightEntities(Vec<EntityId>),
    ToggleEntity(EntityId),
    ClearSelection,
    SeekTime(f64),
    Play,
    Pause,
    Stop,
    Reset,
    SetSpeed(f64),
    SelectDataset(String),
    FocusPanel(String),
    SetOverlay { kind: String, payload: Value },
    /// Pick a structure inside the active dataset; `None` deselects.
    SelectStructure(Option<String>),
    /// Send the stored cavity analysis to the viewers.
    HighlightCavities,
    /// Send the stored conformation predictions to the viewers.
    ShowConformations,
    ResizeViewport { width: u32, height: u32 },
}

// =============================================================================
// PARSING
// =============================================================================

/// Every command kind the workbench accepts.
pub const COMMAND_KINDS: &[&str] = &[
    "expand-panel",
    "collapse-panel",
    "restore-panel",
    "fullscreen-panel",
    "exit-fullscreen",
    "escape",
    "show-analysis",
    "highlight-entities",
    "toggle-entity",
    "clear-selection",
    "seek-time",
    "play",
    "pause",
    "stop",
    "reset",
    "set-speed",
    "select-dataset",
    "focus-panel",
    "set-overlay",
    "resize-viewport",
    "select-structure",
    "highlight-cavities",
    "show-conformations",
];

/// Validate `command` into an [`Action`].
///
/// # Errors
///
/// [`CommandError::UnknownCommandKind`] for kinds outside [`COMMAND_KINDS`]
/// and [`CommandError::InvalidPayload`] when a required field is missing or
/// has the wrong type.
pub fn parse_command(command: &Command) -> Result<Action, CommandError> {
    let kind = command.kind.trim();
    let payload = &command.payload;

    let action = match kind {
        "expand-panel" => Action::ExpandPanel(str_field(kind, payload, "panel")?.to_owned()),
        "collapse-panel" => Action::CollapsePanel(str_field(kind, payload, "panel")?.to_owned()),
        "restore-panel" => Action::RestorePanel(str_field(kind, payload, "panel")?.to_owned()),
        "fullscreen-panel" => Action::FullScreenPanel(str_field(kind, payload, "panel")?.to_owned()),
        "exit-fullscreen" => Action::ExitFullScreen(optional_str_field(kind, payload, "panel")?.map(str::to_owned)),
        "escape" => Action::Escape,
        "show-analysis" => Action::ShowAnalysis,
        "highlight-entities" => Action::HighlightEntities(entity_list(kind, payload)?),
        "toggle-entity" => Action::ToggleEntity(entity_id(kind, field(kind, payload, "id")?)?),
        "clear-selection" => Action::ClearSelection,
        "seek-time" => Action::SeekTime(f64_field(kind, payload, "time")?),
        "play" => Action::Play,
        "pause" => Action::Pause,
        "stop" => Action::Stop,
        "reset" => Action::Reset,
        "set-speed" => Action::SetSpeed(f64_field(kind, payload, "speed")?),
        "select-dataset" => Action::SelectDataset(str_field(kind, payload, "id")?.to_owned()),
        "focus-panel" => Action::FocusPanel(str_field(kind, payload, "panel")?.to_owned()),
        "set-overlay" => Action::SetOverlay {
            kind: str_field(kind, payload, "kind")?.to_owned(),
            payload: payload.get("payload").cloned().unwrap_or(Value::Null),
        },
        "resize-viewport" => Action::ResizeViewport {
            width: u32_field(kind, payload, "width")?,
            height: u32_field(kind, payload, "height")?,
        },
        "select-structure" => Action::SelectStructure(match field(kind, payload, "structure")? {
            Value::Null => None,
            _ => Some(str_field(kind, payload, "structure")?.to_owned()),
        }),
        "highlight-cavities" => Action::HighlightCavities,
        "show-conformations" => Action::ShowConformations,
        _ => return Err(CommandError::UnknownCommandKind(command.kind.clone())),
    };
    Ok(action)
}

// =============================================================================
// PAYLOAD HELPERS
// =============================================================================

fn invalid(kind: &str, reason: impl Into<String>) -> CommandError {
    CommandError::InvalidPayload { kind: kind.to_owned(), reason: reason.into() }
}

fn field<'a>(kind: &str, payload: &'a Value, key: &str) -> Result<&'a Value, CommandError> {
    payload.get(key).ok_or_else(|| invalid(kind, format!("missing field `{key}`")))
}

fn str_field<'a>(kind: &str, payload: &'a Value, key: &str) -> Result<&'a str, CommandError> {
    match field(kind, payload, key)?.as_str().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(invalid(kind, format!("`{key}` must be a non-empty string"))),
    }
}

fn optional_str_field<'a>(kind: &str, payload: &'a Value, key: &str) -> Result<Option<&'a str>, CommandError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => str_field(kind, payload, key).map(Some),
    }
}

fn f64_field(kind: &str, payload: &Value, key: &str) -> Result<f64, CommandError> {
    field(kind, payload, key)?
        .as_f64()
        .ok_or_else(|| invalid(kind, format!("`{key}` must be a number")))
}

fn u32_field(kind: &str, payload: &Value, key: &str) -> Result<u32, CommandError> {
    let value = field(kind, payload, key)?;
    let Some(raw) = value.as_u64() else {
        return Err(invalid(kind, format!("`{key}` must be a non-negative integer")));
    };
    u32::try_from(raw).map_err(|_| invalid(kind, format!("`{key}` out of range: {raw}")))
}

fn entity_id(kind: &str, value: &Value) -> Result<EntityId, CommandError> {
    let Some(raw) = value.as_u64() else {
        return Err(invalid(kind, format!("entity id must be a non-negative integer, got {value}")));
    };
    EntityId::try_from(raw).map_err(|_| invalid(kind, format!("entity id {raw} out of range")))
}

fn entity_list(kind: &str, payload: &Value) -> Result<Vec<EntityId>, CommandError> {
    let Some(items) = field(kind, payload, "ids")?.as_array() else {
        return Err(invalid(kind, "`ids` must be an array"));
    };
    items.iter().map(|item| entity_id(kind, item)).collect()
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
