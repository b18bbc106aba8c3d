// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

use super::*;

#[test]
fn get_on_missing_signal_returns_none_not_an_error() {
    let bus = SignalBus::new();
    assert!(bus.get(&RolloutId::new(), SignalName::AbortRollout).is_none());
}

#[test]
fn make_then_set_latches_it() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    bus.make(&id, SignalName::AbortRollout);

    assert!(!bus.is_set(&id, SignalName::AbortRollout));
    assert!(bus.set(&id, SignalName::AbortRollout));
    assert!(bus.is_set(&id, SignalName::AbortRollout));
}

#[test]
fn setting_an_already_set_signal_reports_false_not_an_error() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    bus.make(&id, SignalName::AbortRollout);

    assert!(bus.set(&id, SignalName::AbortRollout));
    assert!(!bus.set(&id, SignalName::AbortRollout));
    assert!(bus.is_set(&id, SignalName::AbortRollout));
}

#[test]
fn setting_a_missing_signal_reports_false() {
    let bus = SignalBus::new();
    assert!(!bus.set(&RolloutId::new(), SignalName::AbortRollout));
}

#[test]
fn destroy_removes_the_entry_and_is_set_becomes_false() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    bus.make(&id, SignalName::TermRollout);
    bus.set(&id, SignalName::TermRollout);
    assert!(bus.is_set(&id, SignalName::TermRollout));

    bus.destroy(&id, SignalName::TermRollout);
    assert!(!bus.is_set(&id, SignalName::TermRollout));
    assert!(bus.get(&id, SignalName::TermRollout).is_none());
}

#[test]
fn can_signal_is_true_only_while_present_and_unset() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    assert!(!bus.can_signal(&id, SignalName::SkipRollback));

    bus.make(&id, SignalName::SkipRollback);
    assert!(bus.can_signal(&id, SignalName::SkipRollback));

    bus.set(&id, SignalName::SkipRollback);
    assert!(!bus.can_signal(&id, SignalName::SkipRollback));
}

#[test]
fn make_all_and_destroy_all_cover_a_whole_phase() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    bus.make_all(&id, &SignalName::ROLLOUT_PHASE);
    for name in SignalName::ROLLOUT_PHASE {
        assert!(bus.get(&id, name).is_some());
    }

    bus.destroy_all(&id, &SignalName::ROLLOUT_PHASE);
    for name in SignalName::ROLLOUT_PHASE {
        assert!(bus.get(&id, name).is_none());
    }
}

#[test]
fn signals_for_different_rollouts_are_independent() {
    let bus = SignalBus::new();
    let a = RolloutId::new();
    let b = RolloutId::new();
    bus.make(&a, SignalName::AbortRollout);
    bus.make(&b, SignalName::AbortRollout);

    bus.set(&a, SignalName::AbortRollout);
    assert!(bus.is_set(&a, SignalName::AbortRollout));
    assert!(!bus.is_set(&b, SignalName::AbortRollout));
}

#[test]
fn remaking_a_signal_resets_it() {
    let bus = SignalBus::new();
    let id = RolloutId::new();
    bus.make(&id, SignalName::AbortRollback);
    bus.set(&id, SignalName::AbortRollback);
    assert!(bus.is_set(&id, SignalName::AbortRollback));

    bus.make(&id, SignalName::AbortRollback);
    assert!(!bus.is_set(&id, SignalName::AbortRollback));
}
