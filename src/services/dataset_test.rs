use super::*;
use crate::frame::ErrorCode;
use serde_json::json;

#[test]
fn builtin_catalog_lists_three_records_in_order() {
    let catalog = StaticCatalog::builtin();
    let ids: Vec<String> = catalog.list().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["mudo_001", "mudo_002", "mudo_003"]);
}

#[test]
fn catalog_get_resolves_known_ids() {
    let catalog = StaticCatalog::builtin();
    let record = catalog.get("mudo_002").unwrap();
    assert_eq!(record.kind, "structural_analysis");
    assert_eq!(record.status, DatasetStatus::Completed);
    assert_eq!(record.size.as_deref(), Some("1.8 GB"));
}

#[test]
fn catalog_get_unknown_id_errors() {
    let err = StaticCatalog::builtin().get("mudo_999").unwrap_err();
    assert_eq!(err, DatasetError::UnknownDataset("mudo_999".into()));
    assert_eq!(err.error_code(), "E_DATASET_UNKNOWN");
}

#[test]
fn registry_replace_bumps_generation_even_for_same_id() {
    let catalog = StaticCatalog::builtin();
    let mut registry = ActiveDatasetRegistry::default();
    assert!(registry.current().is_none());

    assert!(registry.replace(catalog.get("mudo_001").unwrap()).is_none());
    assert_eq!(registry.generation(), 1);

    let previous = registry.replace(catalog.get("mudo_001").unwrap());
    assert_eq!(previous.map(|d| d.id).as_deref(), Some("mudo_001"));
    assert_eq!(registry.generation(), 2);
    assert_eq!(registry.current_id(), Some("mudo_001"));
}

#[test]
fn overlay_store_set_get_invalidate() {
    let mut store = OverlayStore::default();
    assert!(store.set(CAVITIES_OVERLAY, json!({"cavities": 3})).is_none());
    store.set(PREDICTIONS_OVERLAY, json!({"states": 15}));
    assert_eq!(store.kinds(), vec![CAVITIES_OVERLAY, PREDICTIONS_OVERLAY]);
    assert_eq!(store.get(CAVITIES_OVERLAY), Some(&json!({"cavities": 3})));

    assert_eq!(store.invalidate(), 2);
    assert!(store.kinds().is_empty());
    assert_eq!(store.invalidate(), 0);
}

#[test]
fn require_reports_missing_overlay_kind() {
    let mut store = OverlayStore::default();
    let err = store.require(CAVITIES_OVERLAY).unwrap_err();
    assert_eq!(err, DatasetError::OverlayMissing("cavities".into()));
    assert_eq!(err.error_code(), "E_OVERLAY_MISSING");

    store.set(CAVITIES_OVERLAY, cavity_analysis("1ATP"));
    assert_eq!(store.require(CAVITIES_OVERLAY).unwrap()["structure"], "1ATP");
}

#[test]
fn structure_seeds_carry_the_structure_id() {
    let cavities = cavity_analysis("4HHB");
    assert_eq!(cavities["structure"], "4HHB");
    assert_eq!(cavities["sites"].as_array().map(Vec::len), Some(2));

    let predictions = conformation_predictions("4HHB");
    assert_eq!(predictions["structure"], "4HHB");
    assert_eq!(predictions["predictions"][0]["state"], "closed");
}
