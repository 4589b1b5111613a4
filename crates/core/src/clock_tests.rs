// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[tokio::test(start_paused = true)]
async fn system_clock_follows_paused_runtime() {
    let clock = SystemClock;
    let t1 = clock.now();
    tokio::time::sleep(Duration::from_secs(3)).await;
    let elapsed = clock.now().duration_since(t1);
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_millis(3_005));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    let t2 = clock1.now();
    assert_eq!(t2.duration_since(t1), Duration::from_secs(30));
}
