// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Element types and shapes

use std::fmt;

/// Shape used when none is given or the given one is unusable
pub const DEFAULT_SHAPE: [usize; 4] = [1, 1, 32, 32];

/// Device element type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DType {
    Uint8,
    Uint16,
    Int32,
    Uint32,
    Float32,
    #[default]
    Bfloat16,
    /// Block float, stored here at bfloat16 precision
    Bfloat8B,
    /// Block float, stored here at bfloat16 precision
    Bfloat4B,
}

impl DType {
    pub const ALL: [DType; 8] = [
        DType::Uint8,
        DType::Uint16,
        DType::Int32,
        DType::Uint32,
        DType::Float32,
        DType::Bfloat16,
        DType::Bfloat8B,
        DType::Bfloat4B,
    ];

    /// Parse a dtype name; unknown names fall back to bfloat16
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "uint8" => DType::Uint8,
            "uint16" => DType::Uint16,
            "int32" => DType::Int32,
            "uint32" => DType::Uint32,
            "float32" => DType::Float32,
            "bfloat8_b" => DType::Bfloat8B,
            "bfloat4_b" => DType::Bfloat4B,
            _ => DType::Bfloat16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Int32 => "int32",
            DType::Uint32 => "uint32",
            DType::Float32 => "float32",
            DType::Bfloat16 => "bfloat16",
            DType::Bfloat8B => "bfloat8_b",
            DType::Bfloat4B => "bfloat4_b",
        }
    }

    /// Round `x` to the nearest value this type can hold
    pub fn quantize(self, x: f64) -> f64 {
        match self {
            DType::Float32 => x as f32 as f64,
            DType::Bfloat16 | DType::Bfloat8B | DType::Bfloat4B => bfloat16(x as f32) as f64,
            DType::Uint8 => saturate(x, 0.0, u8::MAX as f64),
            DType::Uint16 => saturate(x, 0.0, u16::MAX as f64),
            DType::Uint32 => saturate(x, 0.0, u32::MAX as f64),
            DType::Int32 => saturate(x, i32::MIN as f64, i32::MAX as f64),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keep the top 16 bits of an f32, rounding to nearest even
fn bfloat16(x: f32) -> f32 {
    if x.is_nan() {
        return x;
    }
    let bits = x.to_bits();
    let lsb = (bits >> 16) & 1;
    f32::from_bits(bits.wrapping_add(0x7FFF + lsb) & 0xFFFF_0000)
}

fn saturate(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.round_ties_even().clamp(lo, hi)
    }
}

/// Parse `"1,1,32,32"`
///
/// Fewer than two dimensions or any unparsable dimension yields
/// [`DEFAULT_SHAPE`].
pub fn parse_shape(shape: &str) -> Vec<usize> {
    let dims: Result<Vec<usize>, _> = shape.split(',').map(|d| d.trim().parse()).collect();
    match dims {
        Ok(dims) if dims.len() >= 2 => dims,
        _ => DEFAULT_SHAPE.to_vec(),
    }
}

#[cfg(test)]
#[path = "dtype_tests.rs"]
mod tests;
