// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

#[test]
fn new_register_is_zeroed() {
    let register = TelemetryRegister::new();
    assert_eq!(register.snapshot(), TelemetrySnapshot::default());
}

#[test]
fn arrival_and_grant_balance_waiting_count() {
    let register = TelemetryRegister::new();
    register.record_arrival();
    register.record_arrival();
    assert_eq!(register.snapshot().currently_waiting, 2);

    register.record_grant(Duration::from_millis(5));
    let snap = register.snapshot();
    assert_eq!(snap.currently_waiting, 1);
    assert_eq!(snap.max_wait_time, Duration::from_millis(5));
    assert_eq!(snap.total_requests, 0, "granting is not completing");
}

#[test]
fn abandoned_waiter_leaves_queue_without_sample() {
    let register = TelemetryRegister::new();
    register.record_arrival();
    register.record_abandoned();

    let snap = register.snapshot();
    assert_eq!(snap.currently_waiting, 0);
    assert_eq!(snap.max_wait_time, Duration::ZERO);
}

#[test]
fn max_wait_time_keeps_largest_sample() {
    let register = TelemetryRegister::new();
    register.record_wait_sample(Duration::from_millis(300));
    register.record_wait_sample(Duration::from_millis(100));
    assert_eq!(register.snapshot().max_wait_time, Duration::from_millis(300));

    register.record_wait_sample(Duration::from_millis(400));
    assert_eq!(register.snapshot().max_wait_time_seconds(), 0.4);
}

#[test]
fn grants_and_samples_share_one_maximum() {
    let register = TelemetryRegister::new();
    register.record_arrival();
    register.record_grant(Duration::from_millis(250));
    register.record_wait_sample(Duration::from_millis(100));
    assert_eq!(register.snapshot().max_wait_time, Duration::from_millis(250));

    register.record_arrival();
    register.record_grant(Duration::from_millis(50));
    register.record_wait_sample(Duration::from_millis(600));
    register.record_arrival();
    register.record_grant(Duration::from_millis(400));

    let snap = register.snapshot();
    assert_eq!(snap.max_wait_time, Duration::from_millis(600));
    assert_eq!(snap.currently_waiting, 0);
}

#[test]
fn completions_and_close_failures_count_independently() {
    let register = TelemetryRegister::new();
    register.record_completion();
    register.record_completion();
    register.record_close_failure();

    let snap = register.snapshot();
    assert_eq!(snap.total_requests, 2);
    assert_eq!(snap.close_failures, 1);
}

#[test]
fn concurrent_samples_keep_global_maximum() {
    let register = Arc::new(TelemetryRegister::new());
    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let register = Arc::clone(&register);
            std::thread::spawn(move || {
                for i in 0..100u64 {
                    register.record_wait_sample(Duration::from_micros(t * 1_000 + i));
                    register.record_completion();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snap = register.snapshot();
    assert_eq!(snap.total_requests, 800);
    assert_eq!(snap.max_wait_time, Duration::from_micros(7_099));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn max_wait_time_never_decreases(samples in proptest::collection::vec(0u64..10_000, 1..50)) {
            let register = TelemetryRegister::new();
            let mut previous = Duration::ZERO;

            for ms in &samples {
                register.record_wait_sample(Duration::from_millis(*ms));
                let current = register.snapshot().max_wait_time;
                prop_assert!(current >= previous);
                previous = current;
            }

            let largest = samples.iter().copied().max().unwrap_or(0);
            prop_assert_eq!(previous, Duration::from_millis(largest));
        }
    }
}
