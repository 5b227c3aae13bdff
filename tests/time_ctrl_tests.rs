// tests/time_ctrl_tests.rs

//! Таймер хода: обратный отсчёт, информирующий режим и принудительный пас.

mod common;

use common::{engine_from, init_logging, p};
use nexus_casino::engine::{tick, MatchEngine, MatchEventKind, MatchStatus};
use nexus_casino::time_ctrl::{
    decide, AutoActionDecision, TimeoutPolicy, TimeoutState, TurnClock, TurnRules,
};

fn engine_with(policy: TimeoutPolicy) -> MatchEngine {
    init_logging();
    engine_from(
        &["a", "b"],
        vec![vec![p(5, 6), p(1, 1)], vec![p(3, 4), p(0, 0)]],
        p(3, 5),
        vec![p(2, 2)],
        0,
        TurnRules::new(30, policy),
    )
}

#[test]
fn clock_counts_down_and_saturates() {
    let rules = TurnRules::new(10, TimeoutPolicy::Advisory);
    let mut clock = TurnClock::new();
    assert_eq!(clock.elapse(1), TimeoutState::NoActivePlayer);

    clock.start_turn(2, &rules);
    assert_eq!(clock.elapse(4), TimeoutState::Ongoing { remaining_secs: 6 });
    assert!(!clock.is_expired());
    assert_eq!(clock.elapse(100), TimeoutState::Expired);
    assert!(clock.is_expired());
    assert_eq!(clock.remaining_secs, 0);

    clock.start_turn(0, &rules);
    assert_eq!(clock.remaining_secs, 10);
}

#[test]
fn decision_follows_policy() {
    assert_eq!(
        decide(TimeoutPolicy::Advisory, TimeoutState::Expired, Some(1)),
        AutoActionDecision::Advisory { seat: 1 }
    );
    assert_eq!(
        decide(TimeoutPolicy::ForcePass, TimeoutState::Expired, Some(1)),
        AutoActionDecision::ForcePass { seat: 1 }
    );
    assert_eq!(
        decide(TimeoutPolicy::ForcePass, TimeoutState::Ongoing { remaining_secs: 3 }, Some(1)),
        AutoActionDecision::None
    );
    assert_eq!(TurnRules::default().policy, TimeoutPolicy::Advisory);
}

#[test]
fn advisory_expiry_keeps_the_turn() {
    let mut engine = engine_with(TimeoutPolicy::Advisory);

    let outcome = tick(&mut engine, 10);
    assert_eq!(outcome.decision, AutoActionDecision::None);
    assert_eq!(engine.clock.remaining_secs, 20);

    let outcome = tick(&mut engine, 25);
    assert_eq!(outcome.decision, AutoActionDecision::Advisory { seat: 0 });
    assert_eq!(outcome.status, MatchStatus::Ongoing);
    assert_eq!(engine.turn, 0);
    assert_eq!(engine.hand(0).len(), 2);
}

#[test]
fn force_pass_skips_the_seat_without_touching_pieces() {
    let mut engine = engine_with(TimeoutPolicy::ForcePass);
    let board_before = engine.board.clone();

    let outcome = tick(&mut engine, 30);
    assert_eq!(outcome.decision, AutoActionDecision::ForcePass { seat: 0 });
    assert_eq!(engine.turn, 1);
    assert_eq!(engine.clock.current_seat, Some(1));
    assert_eq!(engine.clock.remaining_secs, 30);

    assert_eq!(engine.board, board_before);
    assert_eq!(engine.boneyard.len(), 1);
    assert_eq!(engine.hand(0).len(), 2);
    assert!(matches!(
        engine.history.events.last().map(|e| &e.kind),
        Some(MatchEventKind::TimedOut { seat: 0 })
    ));
}

#[test]
fn advisory_expiry_is_recorded_once_per_turn() {
    let mut engine = engine_with(TimeoutPolicy::Advisory);

    tick(&mut engine, 30);
    let outcome = tick(&mut engine, 5);
    assert_eq!(outcome.decision, AutoActionDecision::Advisory { seat: 0 });
    tick(&mut engine, 5);

    let expiries = engine
        .history
        .events
        .iter()
        .filter(|e| matches!(e.kind, MatchEventKind::TurnExpired { seat: 0 }))
        .count();
    assert_eq!(expiries, 1);
}
