//! Property-based tests for the chunk planner state machine

use contentcal::pipeline::{
    BatchWindow, ChunkPlanner, ChunkPolicy, PlannerAction, PlannerEvent, PlannerState,
};
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = ChunkPolicy> {
    (1usize..15, 0usize..40, 0usize..40, 0usize..10).prop_map(
        |(min_size, span, initial_offset, growth_step)| {
            let max_size = min_size + span;
            ChunkPolicy {
                initial_size: min_size + initial_offset.min(span),
                min_size,
                max_size,
                growth_step,
            }
        },
    )
}

/// Drive the planner, answering each send with the next scripted outcome
/// (success once the script runs out). Returns every sent window with its
/// outcome, and the final state.
fn drive(planner: &ChunkPlanner, outcomes: &[bool]) -> (Vec<(BatchWindow, bool)>, PlannerState) {
    let mut sent = Vec::new();
    let mut script = outcomes.iter().copied();
    let mut state = planner.initial_state();
    let mut event = PlannerEvent::Proceed;
    // Every send either advances or shrinks, so this bound is never hit.
    for _ in 0..100_000 {
        let (next, action) = planner.transition(state, event);
        state = next;
        event = match action {
            PlannerAction::Send(window) => {
                let ok = script.next().unwrap_or(true);
                sent.push((window, ok));
                if ok {
                    PlannerEvent::BatchSucceeded
                } else {
                    PlannerEvent::BatchFailed
                }
            }
            PlannerAction::Accept { .. } | PlannerAction::Shrink { .. } => PlannerEvent::Proceed,
            _ => break,
        };
    }
    (sent, state)
}

proptest! {
    #[test]
    fn test_successful_windows_partition_the_sequence(
        policy in policy_strategy(),
        total in 0usize..400,
        outcomes in proptest::collection::vec(any::<bool>(), 0..60),
    ) {
        let planner = ChunkPlanner::new(policy, total);
        let (sent, state) = drive(&planner, &outcomes);

        prop_assert!(state.is_terminal());
        if state == PlannerState::Complete {
            let mut cursor = 0;
            for (window, ok) in &sent {
                if *ok {
                    prop_assert_eq!(window.start, cursor);
                    cursor = window.end();
                }
            }
            prop_assert_eq!(cursor, total);
        }
    }

    #[test]
    fn test_failures_halve_and_successes_grow(
        policy in policy_strategy(),
        total in 1usize..400,
        outcomes in proptest::collection::vec(any::<bool>(), 0..60),
    ) {
        let planner = ChunkPlanner::new(policy, total);
        let (sent, _) = drive(&planner, &outcomes);

        for pair in sent.windows(2) {
            let ((prev, ok), (next, _)) = (pair[0], pair[1]);
            if ok {
                prop_assert_eq!(
                    next.requested,
                    (prev.requested + policy.growth_step).min(policy.max_size)
                );
                prop_assert!(next.requested <= policy.max_size);
            } else {
                prop_assert_eq!(next.start, prev.start);
                prop_assert_eq!(next.requested, (prev.len / 2).max(policy.min_size));
                prop_assert!(next.len < prev.len);
            }
        }
    }

    #[test]
    fn test_constant_failure_exhausts_at_the_floor(policy in policy_strategy(), total in 1usize..400) {
        let planner = ChunkPlanner::new(policy, total);
        let (sent, state) = drive(&planner, &vec![false; 1000]);

        match state {
            PlannerState::Exhausted { window } => {
                prop_assert!(window.len <= policy.min_size);
                prop_assert_eq!(window.start, 0);
            }
            other => prop_assert!(false, "expected exhaustion, got {:?}", other),
        }
        prop_assert!(sent.windows(2).all(|w| w[1].0.len < w[0].0.len));
    }
}

#[test]
fn test_dry_run_never_exceeds_max() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(policy_strategy(), 0usize..1000), |(policy, total)| {
            let windows = ChunkPlanner::new(policy, total).dry_run();
            prop_assert!(windows.iter().all(|w| w.requested <= policy.max_size));
            prop_assert_eq!(windows.iter().map(|w| w.len).sum::<usize>(), total);
            Ok(())
        })
        .unwrap();
}
