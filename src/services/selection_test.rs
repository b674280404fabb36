use super::*;
use std::sync::Mutex;

fn recorder(bus: &mut SelectionBus, label: &'static str, log: &Arc<Mutex<Vec<(&'static str, Vec<EntityId>)>>>) -> ListenerId {
    let log = Arc::clone(log);
    bus.subscribe(move |set| log.lock().unwrap().push((label, set.ids().to_vec())))
}

#[test]
fn toggle_adds_then_removes() {
    let mut bus = SelectionBus::new();
    assert!(bus.toggle(5));
    assert!(bus.contains(5));
    assert!(!bus.toggle(5));
    assert!(bus.is_empty());
}

#[test]
fn toggle_pairs_are_net_noops() {
    let mut bus = SelectionBus::new();
    bus.toggle(1);
    bus.toggle(2);
    let before = bus.snapshot();

    bus.toggle(9);
    bus.toggle(9);
    assert_eq!(*bus.snapshot(), *before);
    assert_eq!(bus.snapshot().ids(), &[1, 2]);
}

#[test]
fn clear_empties_and_notifies_even_when_empty() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut bus = SelectionBus::new();
    recorder(&mut bus, "a", &log);

    bus.clear();
    bus.toggle(3);
    bus.clear();

    assert!(bus.is_empty());
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn listeners_notified_in_subscription_order_once_per_mutation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut bus = SelectionBus::new();
    recorder(&mut bus, "first", &log);
    recorder(&mut bus, "second", &log);

    bus.toggle(42);

    assert_eq!(
        *log.lock().unwrap(),
        vec![("first", vec![42]), ("second", vec![42])]
    );
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut bus = SelectionBus::new();
    let first = recorder(&mut bus, "first", &log);
    recorder(&mut bus, "second", &log);

    assert!(bus.unsubscribe(first));
    assert!(!bus.unsubscribe(first));
    bus.toggle(1);

    assert_eq!(*log.lock().unwrap(), vec![("second", vec![1])]);
}

#[test]
fn old_snapshot_is_unaffected_by_later_mutation() {
    let mut bus = SelectionBus::new();
    bus.toggle(1);
    let held = bus.snapshot();
    bus.toggle(2);
    assert_eq!(held.ids(), &[1]);
    assert_eq!(bus.len(), 2);
}

#[test]
fn extend_adds_missing_ids_in_one_notification() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut bus = SelectionBus::new();
    bus.toggle(2);
    recorder(&mut bus, "a", &log);

    assert_eq!(bus.extend(&[1, 2, 3, 3]), 2);

    assert_eq!(bus.snapshot().ids(), &[2, 1, 3]);
    assert_eq!(*log.lock().unwrap(), vec![("a", vec![2, 1, 3])]);
}

#[test]
fn extend_with_nothing_new_does_not_notify() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut bus = SelectionBus::new();
    bus.toggle(7);
    recorder(&mut bus, "a", &log);

    assert_eq!(bus.extend(&[7]), 0);
    assert_eq!(bus.extend(&[]), 0);
    assert!(log.lock().unwrap().is_empty());
}
