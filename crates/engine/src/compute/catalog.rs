// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation catalog and element kernels

use super::math::{self, truth};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

const UNARY: &[&str] = &[
    "abs", "acos", "acosh", "asin", "asinh", "atan", "atanh", "cbrt", "ceil", "celu", "clamp",
    "clip", "clone", "cos", "cosh", "deg2rad", "elu", "eqz", "erf", "erfc", "erfinv", "exp",
    "exp2", "expm1", "floor", "frac", "gelu", "gez", "gtz", "hardsigmoid", "hardswish",
    "hardtanh", "heaviside", "i0", "identity", "isfinite", "isinf", "isnan", "isneginf",
    "isposinf", "leaky_relu", "lez", "lgamma", "log", "log10", "log1p", "log2", "log_sigmoid",
    "logical_not", "logit", "ltz", "mish", "neg", "nez", "prelu", "rad2deg", "reciprocal",
    "relu", "relu6", "round", "rsqrt", "selu", "sigmoid", "sigmoid_accurate", "sign", "signbit",
    "silu", "sin", "sinh", "softplus", "softshrink", "softsign", "sqrt", "square", "swish", "tan",
    "tanh", "tanhshrink", "threshold", "tril", "triu", "trunc",
];

const BINARY: &[&str] = &[
    "add", "addalpha", "subalpha", "mul", "multiply", "subtract", "div", "divide", "div_no_nan",
    "floor_div", "remainder", "fmod", "gcd", "lcm", "logical_and", "logical_or", "logical_xor",
    "bitwise_and", "bitwise_or", "bitwise_xor", "logaddexp", "logaddexp2", "hypot", "xlogy",
    "squared_difference", "gt", "lt", "ge", "le", "eq", "ne", "isclose", "maximum", "minimum",
    "pow", "atan2",
];

const TERNARY: &[&str] = &["addcdiv", "addcmul", "mac", "where", "lerp"];

/// Operations sharing an arity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationGroup {
    pub category: String,
    pub operations: Vec<String>,
}

/// Every supported operation, grouped by arity
pub fn catalog() -> Vec<OperationGroup> {
    [
        ("Pointwise Unary", UNARY),
        ("Pointwise Binary", BINARY),
        ("Pointwise Ternary", TERNARY),
    ]
    .into_iter()
    .map(|(category, ops)| OperationGroup {
        category: category.to_string(),
        operations: ops.iter().map(|op| op.to_string()).collect(),
    })
    .collect()
}

/// Second optional parameter of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondParam {
    pub name: String,
    pub default: f64,
    pub description: String,
}

/// Optional scalar parameter(s) of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub operation: String,
    pub param_name: String,
    pub default: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<SecondParam>,
}

type ParamRow = (
    &'static str,
    &'static str,
    f64,
    &'static str,
    Option<(&'static str, f64, &'static str)>,
);

const PARAMS: &[ParamRow] = &[
    ("addalpha", "alpha", 1.0, "Scalar multiplier for second input", None),
    ("subalpha", "alpha", 1.0, "Scalar multiplier for second input", None),
    ("addcmul", "value", 1.0, "Scalar multiplier for product", None),
    ("addcdiv", "value", 1.0, "Scalar multiplier for division", None),
    ("elu", "alpha", 1.0, "Alpha value for ELU activation", None),
    ("celu", "alpha", 1.0, "Alpha value for CELU activation", None),
    (
        "threshold",
        "threshold",
        0.0,
        "Threshold value",
        Some(("value", 0.0, "Replacement value")),
    ),
    ("heaviside", "value", 0.0, "Value when input is zero", None),
    ("prelu", "weight", 0.25, "Negative slope coefficient", None),
    ("leaky_relu", "negative_slope", 0.01, "Slope for negative inputs", None),
    ("softshrink", "lambda", 0.5, "Shrink threshold", None),
    (
        "clamp",
        "min",
        -1.0,
        "Lower bound",
        Some(("max", 1.0, "Upper bound")),
    ),
    (
        "clip",
        "min",
        -1.0,
        "Lower bound",
        Some(("max", 1.0, "Upper bound")),
    ),
];

/// Operations that take optional scalar parameters
pub fn param_catalog() -> Vec<ParamSpec> {
    PARAMS
        .iter()
        .map(|&(operation, name, default, description, second)| ParamSpec {
            operation: operation.to_string(),
            param_name: name.to_string(),
            default,
            description: description.to_string(),
            second: second.map(|(name, default, description)| SecondParam {
                name: name.to_string(),
                default,
                description: description.to_string(),
            }),
        })
        .collect()
}

/// Resolved scalar parameters, defaults applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Params {
    pub first: f64,
    pub second: f64,
}

impl Params {
    pub(crate) fn resolve(operation: &str, first: Option<f64>, second: Option<f64>) -> Self {
        let row = PARAMS.iter().find(|row| row.0 == operation);
        let default_first = row.map_or(0.0, |row| row.2);
        let default_second = row.and_then(|row| row.4).map_or(0.0, |p| p.1);
        Self {
            first: first.unwrap_or(default_first),
            second: second.unwrap_or(default_second),
        }
    }
}

/// How an operation combines its inputs element by element
#[derive(Clone, Copy)]
pub(crate) enum Kernel {
    Unary(fn(f64, Params) -> f64),
    Binary(fn(f64, f64, Params) -> f64),
    Ternary(fn(f64, f64, f64, Params) -> f64),
    /// Keeps the element when `keep(row, col)`, zero otherwise
    Triangle(fn(usize, usize) -> bool),
}

impl Kernel {
    pub(crate) fn arity(&self) -> usize {
        match self {
            Kernel::Unary(_) | Kernel::Triangle(_) => 1,
            Kernel::Binary(_) => 2,
            Kernel::Ternary(_) => 3,
        }
    }
}

pub(crate) fn kernel(operation: &str) -> Option<Kernel> {
    use Kernel::{Binary, Ternary, Triangle, Unary};

    let k = match operation {
        "abs" => Unary(|x, _| x.abs()),
        "acos" => Unary(|x, _| x.acos()),
        "acosh" => Unary(|x, _| x.acosh()),
        "asin" => Unary(|x, _| x.asin()),
        "asinh" => Unary(|x, _| x.asinh()),
        "atan" => Unary(|x, _| x.atan()),
        "atanh" => Unary(|x, _| x.atanh()),
        "cbrt" => Unary(|x, _| x.cbrt()),
        "ceil" => Unary(|x, _| x.ceil()),
        "celu" => Unary(|x, p| x.max(0.0) + (p.first * ((x / p.first).exp() - 1.0)).min(0.0)),
        "clamp" | "clip" => Unary(|x, p| math::clamp(x, p.first, p.second)),
        "clone" | "identity" => Unary(|x, _| x),
        "cos" => Unary(|x, _| x.cos()),
        "cosh" => Unary(|x, _| x.cosh()),
        "deg2rad" => Unary(|x, _| x.to_radians()),
        "elu" => Unary(|x, p| if x > 0.0 { x } else { p.first * x.exp_m1() }),
        "eqz" => Unary(|x, _| truth(x == 0.0)),
        "erf" => Unary(|x, _| math::erf(x)),
        "erfc" => Unary(|x, _| math::erfc(x)),
        "erfinv" => Unary(|x, _| math::erfinv(x)),
        "exp" => Unary(|x, _| x.exp()),
        "exp2" => Unary(|x, _| x.exp2()),
        "expm1" => Unary(|x, _| x.exp_m1()),
        "floor" => Unary(|x, _| x.floor()),
        "frac" => Unary(|x, _| x.fract()),
        "gelu" => Unary(|x, _| math::gelu(x)),
        "gez" => Unary(|x, _| truth(x >= 0.0)),
        "gtz" => Unary(|x, _| truth(x > 0.0)),
        "hardsigmoid" => Unary(|x, _| math::clamp(x / 6.0 + 0.5, 0.0, 1.0)),
        "hardswish" => Unary(|x, _| x * math::clamp(x / 6.0 + 0.5, 0.0, 1.0)),
        "hardtanh" => Unary(|x, _| math::clamp(x, -1.0, 1.0)),
        "heaviside" => Unary(|x, p| {
            if x == 0.0 {
                p.first
            } else {
                truth(x > 0.0)
            }
        }),
        "i0" => Unary(|x, _| math::i0(x)),
        "isfinite" => Unary(|x, _| truth(x.is_finite())),
        "isinf" => Unary(|x, _| truth(x.is_infinite())),
        "isnan" => Unary(|x, _| truth(x.is_nan())),
        "isneginf" => Unary(|x, _| truth(x == f64::NEG_INFINITY)),
        "isposinf" => Unary(|x, _| truth(x == f64::INFINITY)),
        "leaky_relu" => Unary(|x, p| if x >= 0.0 { x } else { p.first * x }),
        "lez" => Unary(|x, _| truth(x <= 0.0)),
        "lgamma" => Unary(|x, _| math::lgamma(x)),
        "log" => Unary(|x, _| x.ln()),
        "log10" => Unary(|x, _| x.log10()),
        "log1p" => Unary(|x, _| x.ln_1p()),
        "log2" => Unary(|x, _| x.log2()),
        "log_sigmoid" => Unary(|x, _| -math::softplus(-x)),
        "logical_not" => Unary(|x, _| truth(x == 0.0)),
        "logit" => Unary(|x, _| (x / (1.0 - x)).ln()),
        "ltz" => Unary(|x, _| truth(x < 0.0)),
        "mish" => Unary(|x, _| x * math::softplus(x).tanh()),
        "neg" => Unary(|x, _| -x),
        "nez" => Unary(|x, _| truth(x != 0.0)),
        "prelu" => Unary(|x, p| if x >= 0.0 { x } else { p.first * x }),
        "rad2deg" => Unary(|x, _| x.to_degrees()),
        "reciprocal" => Unary(|x, _| x.recip()),
        "relu" => Unary(|x, _| if x > 0.0 { x } else { 0.0 }),
        "relu6" => Unary(|x, _| math::clamp(x, 0.0, 6.0)),
        "round" => Unary(|x, _| x.round_ties_even()),
        "rsqrt" => Unary(|x, _| x.sqrt().recip()),
        "selu" => Unary(|x, _| {
            const ALPHA: f64 = 1.673_263_242_354_377_3;
            const SCALE: f64 = 1.050_700_987_355_480_5;
            SCALE * if x > 0.0 { x } else { ALPHA * x.exp_m1() }
        }),
        "sigmoid" | "sigmoid_accurate" => Unary(|x, _| math::sigmoid(x)),
        "sign" => Unary(|x, _| math::sign(x)),
        "signbit" => Unary(|x, _| truth(x.is_sign_negative())),
        "silu" | "swish" => Unary(|x, _| x * math::sigmoid(x)),
        "sin" => Unary(|x, _| x.sin()),
        "sinh" => Unary(|x, _| x.sinh()),
        "softplus" => Unary(|x, _| math::softplus(x)),
        "softshrink" => Unary(|x, p| {
            if x > p.first {
                x - p.first
            } else if x < -p.first {
                x + p.first
            } else {
                0.0
            }
        }),
        "softsign" => Unary(|x, _| x / (1.0 + x.abs())),
        "sqrt" => Unary(|x, _| x.sqrt()),
        "square" => Unary(|x, _| x * x),
        "tan" => Unary(|x, _| x.tan()),
        "tanh" => Unary(|x, _| x.tanh()),
        "tanhshrink" => Unary(|x, _| x - x.tanh()),
        "threshold" => Unary(|x, p| if x > p.first { x } else { p.second }),
        "tril" => Triangle(|row, col| col <= row),
        "triu" => Triangle(|row, col| col >= row),
        "trunc" => Unary(|x, _| x.trunc()),

        "add" => Binary(|a, b, _| a + b),
        "addalpha" => Binary(|a, b, p| a + p.first * b),
        "subalpha" => Binary(|a, b, p| a - p.first * b),
        "mul" | "multiply" => Binary(|a, b, _| a * b),
        "subtract" => Binary(|a, b, _| a - b),
        "div" | "divide" => Binary(|a, b, _| a / b),
        "div_no_nan" => Binary(|a, b, _| if b == 0.0 { 0.0 } else { a / b }),
        "floor_div" => Binary(|a, b, _| (a / b).floor()),
        "remainder" => Binary(|a, b, _| math::remainder(a, b)),
        "fmod" => Binary(|a, b, _| a % b),
        "gcd" => Binary(|a, b, _| math::gcd(a, b)),
        "lcm" => Binary(|a, b, _| math::lcm(a, b)),
        "logical_and" => Binary(|a, b, _| truth(a != 0.0 && b != 0.0)),
        "logical_or" => Binary(|a, b, _| truth(a != 0.0 || b != 0.0)),
        "logical_xor" => Binary(|a, b, _| truth((a != 0.0) != (b != 0.0))),
        "bitwise_and" => Binary(|a, b, _| ((a as i64) & (b as i64)) as f64),
        "bitwise_or" => Binary(|a, b, _| ((a as i64) | (b as i64)) as f64),
        "bitwise_xor" => Binary(|a, b, _| ((a as i64) ^ (b as i64)) as f64),
        "logaddexp" => Binary(|a, b, _| math::maximum(a, b) + (-(a - b).abs()).exp().ln_1p()),
        "logaddexp2" => {
            Binary(|a, b, _| math::maximum(a, b) + (-(a - b).abs()).exp2().ln_1p() / LN_2)
        }
        "hypot" => Binary(|a, b, _| a.hypot(b)),
        "xlogy" => Binary(|a, b, _| {
            if b.is_nan() {
                b
            } else if a == 0.0 {
                0.0
            } else {
                a * b.ln()
            }
        }),
        "squared_difference" => Binary(|a, b, _| (a - b) * (a - b)),
        "gt" => Binary(|a, b, _| truth(a > b)),
        "lt" => Binary(|a, b, _| truth(a < b)),
        "ge" => Binary(|a, b, _| truth(a >= b)),
        "le" => Binary(|a, b, _| truth(a <= b)),
        "eq" => Binary(|a, b, _| truth(a == b)),
        "ne" => Binary(|a, b, _| truth(a != b)),
        "isclose" => Binary(|a, b, _| truth((a - b).abs() <= 1e-8 + 1e-5 * b.abs())),
        "maximum" => Binary(|a, b, _| math::maximum(a, b)),
        "minimum" => Binary(|a, b, _| math::minimum(a, b)),
        "pow" => Binary(|a, b, _| a.powf(b)),
        "atan2" => Binary(|a, b, _| a.atan2(b)),

        "addcdiv" => Ternary(|a, b, c, p| a + p.first * b / c),
        "addcmul" => Ternary(|a, b, c, p| a + p.first * b * c),
        "mac" => Ternary(|a, b, c, _| a * b + c),
        "where" => Ternary(|a, b, c, _| if a != 0.0 { b } else { c }),
        "lerp" => Ternary(|a, b, c, _| a + c * (b - a)),

        _ => return None,
    };
    Some(k)
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
