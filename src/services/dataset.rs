//! Dataset service: catalog lookup, the active-dataset registry, and
//! dataset-scoped caches.
//!
//! DESIGN
//! ======
//! The orchestrator holds exactly one active dataset. Everything derived from
//! it (overlay payloads, panel caches) is scoped to its generation: replacing
//! the dataset bumps the generation and invalidates every scoped cache before
//! panels hear about the new record.
//!
//! Records come from a [`DatasetProvider`]. The built-in [`StaticCatalog`]
//! serves a fixed set; hosts with a real catalog implement the trait.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::info;

use crate::state::{Dataset, DatasetStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset not found: {0}")]
    UnknownDataset(String),
    #[error("no {0} overlay for the active dataset")]
    OverlayMissing(String),
}

impl crate::frame::ErrorCode for DatasetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownDataset(_) => "E_DATASET_UNKNOWN",
            Self::OverlayMissing(_) => "E_OVERLAY_MISSING",
        }
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Source of dataset records.
pub trait DatasetProvider: Send {
    /// All records, in display order.
    fn list(&self) -> Vec<Dataset>;

    /// One record by id.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownDataset`] when no record has `id`.
    fn get(&self, id: &str) -> Result<Dataset, DatasetError>;
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    records: Vec<Dataset>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(records: Vec<Dataset>) -> Self {
        Self { records }
    }

    /// The stock catalog of three molecular dynamics studies.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            record(
                "mudo_001",
                "Proteína Quinasa A - Análisis MD",
                "molecular_dynamics",
                DatasetStatus::Active,
                "2.3 GB",
                "Simulación de dinámica molecular de 100ns para PKA",
            ),
            record(
                "mudo_002",
                "Hemoglobina - Estudio Conformacional",
                "structural_analysis",
                DatasetStatus::Completed,
                "1.8 GB",
                "Análisis conformacional de hemoglobina humana",
            ),
            record(
                "mudo_003",
                "Complejo Enzima-Sustrato",
                "binding_analysis",
                DatasetStatus::Processing,
                "3.1 GB",
                "Análisis de unión enzima-sustrato con ChronosFold",
            ),
        ])
    }
}

fn record(id: &str, name: &str, kind: &str, status: DatasetStatus, size: &str, description: &str) -> Dataset {
    Dataset {
        id: id.to_owned(),
        name: name.to_owned(),
        kind: kind.to_owned(),
        status,
        size: Some(size.to_owned()),
        description: Some(description.to_owned()),
    }
}

impl DatasetProvider for StaticCatalog {
    fn list(&self) -> Vec<Dataset> {
        self.records.clone()
    }

    fn get(&self, id: &str) -> Result<Dataset, DatasetError> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| DatasetError::UnknownDataset(id.to_owned()))
    }
}

// =============================================================================
// ACTIVE DATASET
// =============================================================================

/// The single active dataset and its generation counter.
#[derive(Debug, Clone, Default)]
pub struct ActiveDatasetRegistry {
    current: Option<Dataset>,
    generation: u64,
}

impl ActiveDatasetRegistry {
    #[must_use]
    pub fn current(&self) -> Option<&Dataset> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|d| d.id.as_str())
    }

    /// Bumped on every replacement, including re-selecting the same id.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Install `next` as the active dataset. Returns the previous one.
    pub fn replace(&mut self, next: Dataset) -> Option<Dataset> {
        self.generation += 1;
        info!(dataset = %next.id, generation = self.generation, "dataset: active dataset replaced");
        self.current.replace(next)
    }
}

// =============================================================================
// SCOPED CACHES
// =============================================================================

/// A cache whose contents belong to one dataset. Invalidated synchronously
/// before panels are told about a new dataset.
pub trait DatasetScoped: Send + Sync {
    fn invalidate(&self, next: &Dataset);
}

/// Binding-site analysis for the selected structure.
pub const CAVITIES_OVERLAY: &str = "cavities";
/// Predicted conformational states for the selected structure.
pub const PREDICTIONS_OVERLAY: &str = "predictions";

/// Opaque overlay payloads keyed by overlay kind (e.g. [`CAVITIES_OVERLAY`],
/// [`PREDICTIONS_OVERLAY`]). Scoped to the active dataset.
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    overlays: BTreeMap<String, serde_json::Value>,
}

impl OverlayStore {
    /// Store `payload` under `kind`, returning the replaced payload.
    pub fn set(&mut self, kind: impl Into<String>, payload: serde_json::Value) -> Option<serde_json::Value> {
        self.overlays.insert(kind.into(), payload)
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&serde_json::Value> {
        self.overlays.get(kind)
    }

    /// Like `get`, but a missing payload is an error.
    ///
    /// # Errors
    ///
    /// [`DatasetError::OverlayMissing`] when nothing is stored under `kind`.
    pub fn require(&self, kind: &str) -> Result<&serde_json::Value, DatasetError> {
        self.overlays
            .get(kind)
            .ok_or_else(|| DatasetError::OverlayMissing(kind.to_owned()))
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.overlays.keys().map(String::as_str).collect()
    }

    /// Drop every payload. Returns how many were dropped.
    pub fn invalidate(&mut self) -> usize {
        let dropped = self.overlays.len();
        if dropped > 0 {
            info!(dropped, "dataset: overlay payloads invalidated");
        }
        self.overlays.clear();
        dropped
    }
}

// =============================================================================
// STRUCTURE ANALYSIS
// =============================================================================

/// Cavity detection result seeded when `structure` is selected.
#[must_use]
pub fn cavity_analysis(structure: &str) -> serde_json::Value {
    json!({
        "structure": structure,
        "cavities": 3,
        "volume": 234.5,
        "druggability": 87,
        "sites": [
            { "id": 1, "name": "Cavidad Principal", "volume": 234.5, "druggability": 87 },
            { "id": 2, "name": "Sitio Alostérico", "volume": 156.2, "druggability": 72 },
        ],
    })
}

/// Conformational state predictions seeded when `structure` is selected.
#[must_use]
pub fn conformation_predictions(structure: &str) -> serde_json::Value {
    json!({
        "structure": structure,
        "confidence": 89.3,
        "lddt": 0.87,
        "states": 15,
        "predictions": [
            { "state": "closed", "probability": 0.67, "description": "Estado basal" },
            { "state": "open", "probability": 0.28, "description": "Conformación activa" },
        ],
    })
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
