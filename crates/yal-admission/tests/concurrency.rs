// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrency and invariant tests for the admission controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use yal_admission::{Admission, AdmissionController, AdmissionMode};
use yal_core::types::{ShortId, UserId};

fn token(i: usize) -> ShortId {
    ShortId(format!("tok{i:09}"))
}

/// Many tasks hammer one user; the observed peak never exceeds the cap.
async fn peak_in_flight(mode: AdmissionMode, tasks: usize) -> usize {
    let ctl = Arc::new(AdmissionController::new(mode));
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..tasks)
        .map(|i| {
            let ctl = Arc::clone(&ctl);
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                for round in 0..20 {
                    let t = token(i * 100 + round);
                    if let Ok(guard) = ctl.admit_guard(UserId(7), t) {
                        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        current.fetch_sub(1, Ordering::SeqCst);
                        drop(guard);
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(ctl.in_flight(UserId(7)), 0);
    peak.load(Ordering::SeqCst)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_mode_never_exceeds_one() {
    let peak = peak_in_flight(AdmissionMode::Single, 32).await;
    assert!(peak <= 1, "peak was {peak}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_mode_never_exceeds_depth() {
    let peak = peak_in_flight(AdmissionMode::Bounded { max_depth: 3 }, 32).await;
    assert!(peak <= 3, "peak was {peak}");
    assert!(peak >= 1);
}

#[derive(Debug, Clone)]
enum Op {
    Admit(usize),
    Complete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6).prop_map(Op::Admit),
        (0usize..6).prop_map(Op::Complete),
    ]
}

proptest! {
    /// Sequential model check: the controller's count always matches the
    /// number of distinct admitted-and-not-completed tokens.
    #[test]
    fn bounded_count_matches_model(
        depth in 1usize..4,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let ctl = AdmissionController::new(AdmissionMode::Bounded { max_depth: depth });
        let mut model: Vec<usize> = Vec::new();
        let user = UserId(1);

        for op in ops {
            match op {
                Op::Admit(t) => {
                    if model.contains(&t) {
                        continue;
                    }
                    let expected = model.len() < depth;
                    let got = ctl.try_admit(user, token(t)) == Admission::Admitted;
                    prop_assert_eq!(got, expected);
                    if got {
                        model.push(t);
                    }
                }
                Op::Complete(t) => {
                    ctl.complete(user, &token(t));
                    model.retain(|m| *m != t);
                }
            }
            prop_assert!(ctl.in_flight(user) <= depth);
            prop_assert_eq!(ctl.in_flight(user), model.len());
        }
    }
}
