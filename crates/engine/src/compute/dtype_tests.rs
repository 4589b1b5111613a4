// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    exact = { DType::Bfloat16, 2.0, 2.0 },
    rounds_mantissa = { DType::Bfloat16, 3.14159, 3.140625 },
    ties_to_even = { DType::Bfloat16, 1.0 + 1.0 / 256.0, 1.0 },
    float32 = { DType::Float32, 0.1, 0.1f32 as f64 },
    block_float = { DType::Bfloat8B, 3.14159, 3.140625 },
    uint8_saturates = { DType::Uint8, 300.0, 255.0 },
    uint8_floor_at_zero = { DType::Uint8, -4.0, 0.0 },
    uint16_rounds = { DType::Uint16, 2.6, 3.0 },
    int32_negative = { DType::Int32, -7.4, -7.0 },
    int32_ties_even = { DType::Int32, 2.5, 2.0 },
    uint32_max = { DType::Uint32, 1e12, u32::MAX as f64 },
)]
fn quantize(dtype: DType, input: f64, expected: f64) {
    assert_eq!(dtype.quantize(input), expected);
}

#[test]
fn bfloat16_keeps_non_finite() {
    assert!(DType::Bfloat16.quantize(f64::NAN).is_nan());
    assert_eq!(DType::Bfloat16.quantize(f64::INFINITY), f64::INFINITY);
    assert_eq!(DType::Int32.quantize(f64::NAN), 0.0);
}

#[test]
fn names_round_trip_and_unknown_falls_back() {
    for dtype in DType::ALL {
        assert_eq!(DType::parse(dtype.name()), dtype);
    }
    assert_eq!(DType::parse("float64"), DType::Bfloat16);
    assert_eq!(DType::parse(""), DType::Bfloat16);
}

#[parameterized(
    four_dims = { "1,1,32,32", &[1, 1, 32, 32] },
    spaces = { " 2 , 64 ", &[2, 64] },
    one_dim = { "32", &DEFAULT_SHAPE },
    garbage = { "1,x,3", &DEFAULT_SHAPE },
    empty = { "", &DEFAULT_SHAPE },
)]
fn shapes(input: &str, expected: &[usize]) {
    assert_eq!(parse_shape(input), expected);
}
