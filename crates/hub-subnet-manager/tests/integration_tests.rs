//! Integration tests for subnet membership moves
//!
//! Covers the documented scenarios end to end: batch target moves, router
//! merges, hub departure, full evacuation, activation rules, and the full
//! nine-step reference run.

use std::collections::BTreeSet;
use std::sync::Arc;

use hub_subnet_manager::{
    Error, InMemorySink, RouterId, Scenario, SubnetEvent, SubnetId, SubnetManager,
    SubnetMessage, SubnetMessageKind, TargetId,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn routers(raw: &[u64]) -> BTreeSet<RouterId> {
    raw.iter().copied().map(RouterId::new).collect()
}

fn targets(raw: &[u64]) -> BTreeSet<TargetId> {
    raw.iter().copied().map(TargetId::new).collect()
}

fn subnet(raw: u64) -> Option<SubnetId> {
    Some(SubnetId::new(raw))
}

/// Routers {3,5,7,9} self-hosting subnets {2,4,6,8}; targets {1,2,3,4} unassigned
fn create_reference_network() -> (SubnetManager, Arc<InMemorySink>) {
    let sink = Arc::new(InMemorySink::new());
    let manager = SubnetManager::builder()
        .routers([3u64, 5, 7, 9])
        .targets([1u64, 2, 3, 4])
        .sink(sink.clone())
        .build()
        .unwrap();
    (manager, sink)
}

/// Events without sequence numbers, for comparing traces
fn messages(events: &[SubnetEvent]) -> Vec<(u64, SubnetMessage)> {
    events
        .iter()
        .map(|e| (e.subnet_id.get(), e.message.clone()))
        .collect()
}

fn add_targets(to: u64, ids: &[u64]) -> (u64, SubnetMessage) {
    (to, SubnetMessage::AddTargets { targets: targets(ids) })
}

fn remove_targets(from: u64, ids: &[u64]) -> (u64, SubnetMessage) {
    (from, SubnetMessage::RemoveTargets { targets: targets(ids) })
}

fn add_routers(to: u64, ids: &[u64]) -> (u64, SubnetMessage) {
    (to, SubnetMessage::AddRouters { routers: routers(ids) })
}

fn remove_routers(from: u64, ids: &[u64]) -> (u64, SubnetMessage) {
    (from, SubnetMessage::RemoveRouters { routers: routers(ids) })
}

fn activate(id: u64, router_ids: &[u64], target_ids: &[u64]) -> (u64, SubnetMessage) {
    (
        id,
        SubnetMessage::ActivateHub {
            routers: routers(router_ids),
            targets: targets(target_ids),
        },
    )
}

fn deactivate(id: u64) -> (u64, SubnetMessage) {
    (id, SubnetMessage::DeactivateHub)
}

// ============================================================================
// Target Moves
// ============================================================================

#[test]
fn test_batch_target_move() {
    let (mut manager, sink) = create_reference_network();

    manager.move_targets([1u64, 3], subnet(2)).unwrap();

    assert_eq!(messages(&sink.events()), vec![add_targets(2, &[1, 3])]);
    assert_eq!(manager.subnet_of_target(TargetId::new(1)).unwrap(), subnet(2));
    assert_eq!(manager.subnet_of_target(TargetId::new(2)).unwrap(), None);
    assert_eq!(manager.subnet_of_target(TargetId::new(3)).unwrap(), subnet(2));
    assert_eq!(manager.subnet_of_target(TargetId::new(4)).unwrap(), None);
}

#[test]
fn test_target_move_between_subnets() {
    let (mut manager, sink) = create_reference_network();
    manager.move_targets([1u64, 3], subnet(2)).unwrap();
    manager.move_targets([2u64], subnet(4)).unwrap();
    sink.clear();

    manager.move_targets([3u64, 2, 4], subnet(8)).unwrap();

    assert_eq!(
        messages(&sink.events()),
        vec![
            add_targets(8, &[2, 3, 4]),
            remove_targets(2, &[3]),
            remove_targets(4, &[2]),
        ]
    );
    assert_eq!(manager.targets_in(SubnetId::new(2)), targets(&[1]));
}

// ============================================================================
// Router Moves
// ============================================================================

#[test]
fn test_router_merge() {
    let (mut manager, sink) = create_reference_network();
    manager.move_targets([1u64, 3], subnet(2)).unwrap();
    manager.move_targets([2u64, 4], subnet(4)).unwrap();
    sink.clear();

    let summary = manager.move_routers([5u64, 7], subnet(2)).unwrap();

    assert_eq!(
        messages(&sink.events()),
        vec![add_routers(2, &[5, 7]), deactivate(4), deactivate(6)]
    );
    assert_eq!(summary.detached_targets, targets(&[2, 4]));
    assert_eq!(manager.routers_in(SubnetId::new(2)), routers(&[3, 5, 7]));
    assert_eq!(manager.subnet_of_target(TargetId::new(2)).unwrap(), None);
    assert_eq!(manager.subnet_of_target(TargetId::new(4)).unwrap(), None);
}

#[test]
fn test_hub_departure_forces_rebirth() {
    // subnet 2 hosted by hub 3, with extra router 5 and target 1
    let (mut manager, sink) = create_reference_network();
    manager.move_routers([5u64], subnet(2)).unwrap();
    manager.move_targets([1u64], subnet(2)).unwrap();
    sink.clear();

    manager.move_routers([3u64], subnet(8)).unwrap();

    let events = sink.events();
    let kinds: Vec<SubnetMessageKind> = events.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SubnetMessageKind::AddRouters,
            SubnetMessageKind::DeactivateHub,
            SubnetMessageKind::ActivateHub,
        ]
    );
    assert_eq!(events[1].subnet_id, SubnetId::new(2));
    assert_eq!(events[2].subnet_id, SubnetId::new(4));
    assert_eq!(
        events[2].message,
        SubnetMessage::ActivateHub {
            routers: routers(&[5]),
            targets: targets(&[1]),
        }
    );
    assert_eq!(manager.subnet_of_router(RouterId::new(5)).unwrap(), subnet(4));
    assert_eq!(manager.subnet_of_target(TargetId::new(1)).unwrap(), subnet(4));
    assert!(!manager.is_active(SubnetId::new(2)));
}

#[test]
fn test_full_evacuation_tears_down() {
    let (mut manager, sink) = create_reference_network();
    manager.move_targets([1u64], subnet(4)).unwrap();
    sink.clear();

    let summary = manager.move_routers([5u64], subnet(8)).unwrap();

    assert_eq!(
        messages(&sink.events()),
        vec![add_routers(8, &[5]), deactivate(4)]
    );
    assert!(summary.activated.is_empty());
    assert_eq!(manager.subnet_of_target(TargetId::new(1)).unwrap(), None);
    assert_eq!(
        manager.active_subnets(),
        [2u64, 6, 8].into_iter().map(SubnetId::new).collect::<BTreeSet<_>>()
    );
}

#[test]
fn test_new_subnet_requires_hub_present() {
    let (mut manager, sink) = create_reference_network();
    manager.move_routers([9u64], subnet(2)).unwrap();
    manager.move_targets([4u64], subnet(2)).unwrap();
    let before = manager.snapshot();
    let emitted = manager.events_emitted();
    sink.clear();

    // subnet 8 is inactive and its hub 9 is not part of the batch
    let err = manager.move_routers([5u64, 7], subnet(8)).unwrap_err();

    assert_eq!(
        err,
        Error::InvalidHubAssignment {
            subnet: SubnetId::new(8),
            hub: RouterId::new(9),
        }
    );
    assert!(sink.is_empty());
    assert_eq!(manager.snapshot(), before);
    assert_eq!(manager.events_emitted(), emitted);
}

#[test]
fn test_hub_reactivates_its_own_subnet() {
    let (mut manager, sink) = create_reference_network();
    manager.move_routers([5u64], subnet(2)).unwrap();
    sink.clear();

    manager.move_routers([5u64], subnet(4)).unwrap();

    assert_eq!(
        messages(&sink.events()),
        vec![
            activate(4, &[5], &[]),
            add_routers(4, &[5]),
            remove_routers(2, &[5]),
        ]
    );
}

#[test]
fn test_moving_router_into_its_current_subnet_changes_nothing_structural() {
    let (mut manager, sink) = create_reference_network();
    manager.move_routers([5u64], subnet(2)).unwrap();
    sink.clear();

    // 3 is the hub of 2 and already lives there
    manager.move_routers([3u64, 5], subnet(2)).unwrap();

    assert_eq!(messages(&sink.events()), vec![add_routers(2, &[3, 5])]);
    assert_eq!(manager.routers_in(SubnetId::new(2)), routers(&[3, 5]));
}

#[test]
fn test_detached_router_can_rehost() {
    let (mut manager, sink) = create_reference_network();
    manager.move_routers([9u64], None).unwrap();
    assert_eq!(manager.subnet_of_router(RouterId::new(9)).unwrap(), None);
    sink.clear();

    manager.move_routers([9u64], subnet(8)).unwrap();

    assert_eq!(
        messages(&sink.events()),
        vec![activate(8, &[9], &[]), add_routers(8, &[9])]
    );
    manager.check_invariants().unwrap();
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_queries_are_idempotent() {
    let (mut manager, _sink) = create_reference_network();
    manager.move_targets([1u64, 3], subnet(2)).unwrap();
    manager.move_routers([5u64, 7], subnet(2)).unwrap();

    let first = (
        manager.routers_in(SubnetId::new(2)),
        manager.targets_in(SubnetId::new(2)),
    );
    let second = (
        manager.routers_in(SubnetId::new(2)),
        manager.targets_in(SubnetId::new(2)),
    );
    assert_eq!(first, second);
    assert_eq!(manager.snapshot(), manager.snapshot());
}

#[test]
fn test_unknown_ids_rejected_in_queries() {
    let (manager, _sink) = create_reference_network();
    assert!(manager
        .subnet_of_router(RouterId::new(4))
        .unwrap_err()
        .is_unknown_entity());
    assert!(manager
        .subnet_of_target(TargetId::new(9))
        .unwrap_err()
        .is_unknown_entity());
    assert!(manager.routers_in(SubnetId::new(99)).is_empty());
}

// ============================================================================
// Reference Run
// ============================================================================

#[test]
fn test_reference_trace() {
    let report = Scenario::reference().run().unwrap();

    let per_step: Vec<Vec<(u64, SubnetMessage)>> = report
        .steps
        .iter()
        .map(|step| messages(&step.events))
        .collect();

    let expected = vec![
        // MOVING TARGETS [1, 3] TO SUBNET 2
        vec![add_targets(2, &[1, 3])],
        // MOVING TARGETS [2, 4] TO SUBNET 4
        vec![add_targets(4, &[2, 4])],
        // MOVING ROUTERS [5, 7] TO SUBNET 2
        vec![add_routers(2, &[5, 7]), deactivate(4), deactivate(6)],
        // MOVING TARGETS [2, 3, 4] TO SUBNET 8
        vec![add_targets(8, &[2, 3, 4]), remove_targets(2, &[3])],
        // MOVING ROUTERS [3] TO SUBNET 8
        vec![
            add_routers(8, &[3]),
            deactivate(2),
            activate(4, &[5, 7], &[1]),
        ],
        // MOVING ROUTERS [7] TO SUBNET 8
        vec![add_routers(8, &[7]), remove_routers(4, &[7])],
        // MOVING ROUTERS [9] TO SUBNET 4
        vec![
            add_routers(4, &[9]),
            deactivate(8),
            activate(2, &[3, 7], &[2, 3, 4]),
        ],
        // MOVING ROUTERS [5, 7] TO SUBNET 6
        vec![
            activate(6, &[5, 7], &[]),
            add_routers(6, &[5, 7]),
            remove_routers(2, &[7]),
            deactivate(4),
            activate(8, &[9], &[1]),
        ],
        // MOVING ROUTERS [5, 9] TO SUBNET 6
        vec![add_routers(6, &[5, 9]), deactivate(8)],
    ];

    assert_eq!(per_step, expected);

    let sequences: Vec<u64> = report.events().map(|e| e.sequence).collect();
    assert_eq!(sequences, (0..22).collect::<Vec<u64>>());

    let last = report.final_snapshot();
    assert_eq!(
        last.to_string(),
        "Subnet 2: [3] -> [2, 3, 4]\nSubnet 6: [5, 7, 9] -> []\nUnassigned targets: [1]\n"
    );
}

#[test]
fn test_reference_run_is_reproducible() {
    let first = Scenario::reference().run().unwrap();
    let second = Scenario::reference().run().unwrap();

    let a: Vec<&SubnetEvent> = first.events().collect();
    let b: Vec<&SubnetEvent> = second.events().collect();
    assert_eq!(a, b);
}
