// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pointwise tensor operations run while the device is held
//!
//! Inputs are filled tensors: every element carries the same value, so an
//! operation is evaluated per element position only where the position
//! matters (`tril`, `triu`).

mod catalog;
mod dtype;
mod execute;
mod math;

pub use catalog::{catalog, param_catalog, OperationGroup, ParamSpec, SecondParam};
pub use dtype::{parse_shape, DType, DEFAULT_SHAPE};
pub use execute::execute;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from evaluating an operation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComputeError {
    #[error("Operation \"{0}\" not found")]
    UnknownOperation(String),
    #[error("{operation} takes {expected} input(s), got {got}")]
    Arity {
        operation: String,
        expected: usize,
        got: usize,
    },
    #[error("{operation}: input shapes {left:?} and {right:?} do not match")]
    ShapeMismatch {
        operation: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    #[error("{0} needs at least one tensor input")]
    NoTensorInput(String),
}

fn default_shape() -> String {
    "1,1,32,32".to_string()
}

fn default_dtype() -> String {
    "bfloat16".to_string()
}

/// One operand of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    /// Tensor of `shape` filled with `value`
    Tensor {
        value: f64,
        #[serde(default = "default_shape")]
        shape: String,
        #[serde(default = "default_dtype")]
        dtype: String,
    },
    Scalar { value: f64 },
}

impl Input {
    /// Default-shaped bfloat16 tensor
    pub fn tensor(value: f64) -> Self {
        Input::Tensor {
            value,
            shape: default_shape(),
            dtype: default_dtype(),
        }
    }

    pub fn scalar(value: f64) -> Self {
        Input::Scalar { value }
    }
}

/// An operation and its operands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub operation: String,
    #[serde(default)]
    pub inputs: Vec<Input>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_param: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_param_2: Option<f64>,
}

impl ComputeRequest {
    pub fn new(operation: impl Into<String>, inputs: Vec<Input>) -> Self {
        Self {
            operation: operation.into(),
            inputs,
            optional_param: None,
            optional_param_2: None,
        }
    }
}

/// Outcome of an operation
///
/// JSON has no NaN or infinity, so non-finite values appear as `None`;
/// `value_text` always carries the printed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub operation: String,
    pub shape: Vec<usize>,
    pub dtype: String,
    pub value: Option<f64>,
    pub value_text: String,
    /// Leading elements in row-major order, at most ten
    pub sample_values: Vec<Option<f64>>,
    /// Same operation on the host at float32, without input quantization
    pub reference_value: Option<f64>,
    pub device_id: u32,
    pub session: u64,
}
