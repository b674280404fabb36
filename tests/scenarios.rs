//! End-to-end behaviour of the workbench through its public API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use workbench::config::{SimulationConfig, WorkbenchConfig};
use workbench::frame::{Frame, Status};
use workbench::services::clock::{ClockError, SimulationClock};
use workbench::services::command::Command;
use workbench::services::panel::{PanelController, ViewportHost};
use workbench::services::selection::SelectionBus;
use workbench::session::spawn_session;
use workbench::state::{LayoutState, SimulationStatus, default_manifest};
use workbench::workbench::Workbench;

/// Host that records which panel holds the scroll lock and escape listener.
#[derive(Default)]
struct OwnershipHost {
    scroll_owner: Mutex<Option<String>>,
    escape_owner: Mutex<Option<String>>,
}

impl ViewportHost for OwnershipHost {
    fn lock_scroll(&self, panel_id: &str) {
        let mut owner = self.scroll_owner.lock().unwrap();
        assert!(owner.is_none(), "scroll locked twice");
        *owner = Some(panel_id.to_owned());
    }
    fn unlock_scroll(&self, panel_id: &str) {
        let mut owner = self.scroll_owner.lock().unwrap();
        assert_eq!(owner.as_deref(), Some(panel_id));
        *owner = None;
    }
    fn install_escape_listener(&self, panel_id: &str) {
        *self.escape_owner.lock().unwrap() = Some(panel_id.to_owned());
    }
    fn remove_escape_listener(&self, panel_id: &str) {
        let mut owner = self.escape_owner.lock().unwrap();
        assert_eq!(owner.as_deref(), Some(panel_id));
        *owner = None;
    }
}

#[test]
fn scenario_a_thousand_ticks_complete_exactly_once() {
    let config = SimulationConfig { horizon: 100.0, default_speed: 1.0, ..SimulationConfig::default() };
    let mut clock = SimulationClock::new(config).unwrap();
    clock.play().unwrap();

    let mut completions = 0;
    for _ in 0..1_000 {
        if let Some(step) = clock.advance(0.1).unwrap() {
            if step.completed {
                completions += 1;
            }
        }
    }

    assert!((clock.current_time() - 100.0).abs() < f64::EPSILON);
    assert_eq!(clock.status(), SimulationStatus::Completed);
    assert_eq!(completions, 1);
}

#[test]
fn scenario_b_full_screen_ownership_moves_between_panels() {
    let host = Arc::new(OwnershipHost::default());
    let mut panels = PanelController::with_manifest(host.clone(), default_manifest());

    panels.set_full_screen("metrics", true).unwrap();
    assert_eq!(host.scroll_owner.lock().unwrap().as_deref(), Some("metrics"));

    panels.set_full_screen("structure-viewer", true).unwrap();
    assert_eq!(panels.get_state("metrics"), Some(LayoutState::Normal));
    assert_eq!(panels.get_state("structure-viewer"), Some(LayoutState::FullScreen));
    assert_eq!(host.scroll_owner.lock().unwrap().as_deref(), Some("structure-viewer"));
    assert_eq!(host.escape_owner.lock().unwrap().as_deref(), Some("structure-viewer"));

    drop(panels);
    assert!(host.scroll_owner.lock().unwrap().is_none());
    assert!(host.escape_owner.lock().unwrap().is_none());
}

#[test]
fn scenario_c_toggle_sequence_leaves_single_entity() {
    let mut bus = SelectionBus::new();
    bus.toggle(42);
    bus.toggle(17);
    bus.toggle(42);
    assert_eq!(bus.snapshot().ids(), &[17]);
}

#[test]
fn scenario_d_out_of_bounds_speed_is_rejected() {
    let mut clock = SimulationClock::new(SimulationConfig::default()).unwrap();
    clock.set_speed(2.0).unwrap();

    let err = clock.set_speed(10.0).unwrap_err();
    assert!(matches!(err, ClockError::InvalidSpeedValue { .. }));
    assert!((clock.speed() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn reset_from_any_status_yields_stopped_at_zero() {
    let mut wb = Workbench::headless(WorkbenchConfig::default()).unwrap();
    for setup in [&[][..], &["play"][..], &["play", "pause"][..]] {
        for kind in setup {
            wb.dispatch(&Command::bare(*kind)).unwrap();
        }
        wb.on_tick(0.0).unwrap();
        wb.dispatch(&Command::bare("reset")).unwrap();
        assert_eq!(wb.clock().status(), SimulationStatus::Stopped);
        assert!(wb.clock().current_time().abs() < f64::EPSILON);
    }

    wb.play().unwrap();
    wb.on_tick(500.0).unwrap();
    assert_eq!(wb.clock().status(), SimulationStatus::Completed);
    wb.reset();
    assert_eq!(wb.clock().status(), SimulationStatus::Stopped);
}

#[test]
fn assistant_commands_drive_panels_and_selection() {
    let mut wb = Workbench::headless(WorkbenchConfig::default()).unwrap();
    let (tx, mut rx) = mpsc::channel::<Frame>(64);
    wb.subscribe_sink(tx);

    wb.dispatch(&Command::bare("show-analysis")).unwrap();
    wb.dispatch(&Command::new("highlight-entities", json!({"ids": [45, 67, 89]})))
        .unwrap();
    wb.dispatch(&Command::new("fullscreen-panel", json!({"panel": "structure-viewer"})))
        .unwrap();
    wb.dispatch(&Command::bare("escape")).unwrap();

    assert_eq!(wb.panels().get_state("metrics"), Some(LayoutState::Expanded));
    assert_eq!(wb.panels().get_state("structure-viewer"), Some(LayoutState::Expanded));
    assert_eq!(wb.selection().ids(), &[45, 67, 89]);

    let mut syscalls = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        syscalls.push(frame.syscall);
    }
    assert_eq!(
        syscalls,
        vec!["panel:layout", "selection:changed", "panel:layout", "panel:layout"]
    );
}

#[test]
fn structure_overlays_follow_structure_and_dataset() {
    let mut wb = Workbench::headless(WorkbenchConfig::default()).unwrap();

    wb.dispatch(&Command::new("select-structure", json!({"structure": "1ATP"})))
        .unwrap();
    wb.dispatch(&Command::new("toggle-entity", json!({"id": 12}))).unwrap();
    let cavities = wb.dispatch(&Command::bare("highlight-cavities")).unwrap();
    assert_eq!(cavities["payload"]["structure"], "1ATP");

    wb.dispatch(&Command::new("select-dataset", json!({"id": "mudo_003"})))
        .unwrap();

    assert_eq!(wb.selected_structure(), None);
    assert!(wb.selection().is_empty());
    let err = wb.dispatch(&Command::bare("show-conformations")).unwrap_err();
    assert_eq!(err.to_string(), "no predictions overlay for the active dataset");
}

#[tokio::test]
async fn session_runs_to_completion_and_replies_to_commands() {
    let mut config = WorkbenchConfig { tick_period: Duration::from_millis(5), ..WorkbenchConfig::default() };
    config.simulation.horizon = 0.1;
    let (handle, task) = spawn_session(Workbench::headless(config).unwrap());

    let reply = handle.dispatch(Command::new("set-speed", json!({"speed": 2.0}))).await.unwrap();
    assert_eq!(reply.status, Status::Done);
    let reply = handle.dispatch(Command::bare("play")).await.unwrap();
    assert_eq!(reply.data_str("status"), Some("running"));

    let completed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = handle.snapshot().await.unwrap();
            if snapshot.simulation.status == SimulationStatus::Completed {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("run never completed");
    assert!((completed.simulation.current_time - 0.1).abs() < f64::EPSILON);
    assert!(completed.telemetry.is_some());

    handle.shutdown().await.unwrap();
    let wb = task.await.unwrap();
    assert_eq!(wb.clock().status(), SimulationStatus::Completed);
}
