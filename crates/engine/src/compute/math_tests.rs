// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual}"
    );
}

#[parameterized(
    zero = { 0.0, 0.0 },
    half = { 0.5, 0.520_499_877_8 },
    one = { 1.0, 0.842_700_792_9 },
    negative = { -1.0, -0.842_700_792_9 },
    large = { 6.0, 1.0 },
)]
fn erf_matches_table(x: f64, expected: f64) {
    close(erf(x), expected, 2e-7);
}

#[test]
fn erfinv_inverts_erf() {
    for x in [-0.9, -0.5, 0.0, 0.25, 0.7, 0.99] {
        close(erf(erfinv(x)), x, 1e-6);
    }
    assert_eq!(erfinv(1.0), f64::INFINITY);
    assert!(erfinv(1.5).is_nan());
}

#[parameterized(
    one = { 1.0, 0.0 },
    two = { 2.0, 0.0 },
    five = { 5.0, 24f64.ln() },
    half = { 0.5, 0.572_364_942_9 },
    negative_half = { -0.5, 1.265_512_123_5 },
)]
fn lgamma_matches_factorials(x: f64, expected: f64) {
    close(lgamma(x), expected, 1e-9);
}

#[test]
fn lgamma_poles_are_infinite() {
    assert_eq!(lgamma(0.0), f64::INFINITY);
    assert_eq!(lgamma(-3.0), f64::INFINITY);
}

#[test]
fn i0_known_values() {
    close(i0(0.0), 1.0, 1e-15);
    close(i0(1.0), 1.266_065_877_752_008, 1e-12);
    close(i0(-2.0), 2.279_585_302_336_067, 1e-12);
}

#[parameterized(
    both_positive = { 7.0, 3.0, 1.0 },
    negative_dividend = { -7.0, 3.0, 2.0 },
    negative_divisor = { 7.0, -3.0, -2.0 },
    exact = { 6.0, 3.0, 0.0 },
)]
fn remainder_takes_divisor_sign(a: f64, b: f64, expected: f64) {
    assert_eq!(remainder(a, b), expected);
}

#[test]
fn integer_helpers() {
    assert_eq!(gcd(12.0, 18.0), 6.0);
    assert_eq!(gcd(-4.0, 6.0), 2.0);
    assert_eq!(lcm(4.0, 6.0), 12.0);
    assert_eq!(lcm(0.0, 6.0), 0.0);
}

#[test]
fn min_max_propagate_nan() {
    assert!(maximum(f64::NAN, 1.0).is_nan());
    assert!(minimum(1.0, f64::NAN).is_nan());
    assert_eq!(maximum(-1.0, 2.0), 2.0);
    assert!(sign(f64::NAN).is_nan());
    assert_eq!(sign(-0.0), 0.0);
}
