// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluating a request against an open device

use super::catalog::{kernel, Kernel, Params};
use super::dtype::{parse_shape, DType};
use super::{ComputeError, ComputeRequest, ComputeResult, Input};
use dg_adapters::DeviceHandle;

const SAMPLE_LEN: usize = 10;

struct Operand {
    value: f64,
    /// `None` for scalars
    layout: Option<(Vec<usize>, DType)>,
}

impl Operand {
    fn from_input(input: &Input) -> Self {
        match input {
            Input::Tensor {
                value,
                shape,
                dtype,
            } => Operand {
                value: *value,
                layout: Some((parse_shape(shape), DType::parse(dtype))),
            },
            Input::Scalar { value } => Operand {
                value: *value,
                layout: None,
            },
        }
    }

    /// Value as stored on the device; scalars are passed through untouched
    fn on_device(&self) -> f64 {
        match &self.layout {
            Some((_, dtype)) => dtype.quantize(self.value),
            None => self.value,
        }
    }
}

/// Run `request` on the device behind `handle`
///
/// The output takes the shape and dtype of the first tensor operand. Scalars
/// broadcast; tensors must all share one shape.
pub fn execute(
    handle: &DeviceHandle,
    request: &ComputeRequest,
) -> Result<ComputeResult, ComputeError> {
    let operation = request.operation.trim();
    let kernel =
        kernel(operation).ok_or_else(|| ComputeError::UnknownOperation(operation.to_string()))?;

    if request.inputs.len() != kernel.arity() {
        return Err(ComputeError::Arity {
            operation: operation.to_string(),
            expected: kernel.arity(),
            got: request.inputs.len(),
        });
    }

    let operands: Vec<Operand> = request.inputs.iter().map(Operand::from_input).collect();
    let (shape, dtype) = output_layout(operation, &operands)?;
    let params = Params::resolve(operation, request.optional_param, request.optional_param_2);

    let device_inputs: Vec<f64> = operands.iter().map(Operand::on_device).collect();
    let host_inputs: Vec<f64> = operands.iter().map(|o| o.value).collect();

    let value = dtype.quantize(apply(kernel, &device_inputs, params, 0, 0));
    let reference = apply(kernel, &host_inputs, params, 0, 0) as f32 as f64;

    let numel = shape
        .iter()
        .try_fold(1usize, |n, &d| n.checked_mul(d))
        .unwrap_or(usize::MAX);
    let width = shape[shape.len() - 1];
    let height = shape[shape.len() - 2];
    let sample_values = (0..numel.min(SAMPLE_LEN))
        .map(|i| {
            let (row, col) = ((i / width) % height, i % width);
            finite(dtype.quantize(apply(kernel, &device_inputs, params, row, col)))
        })
        .collect();

    tracing::debug!(
        operation,
        dtype = %dtype,
        session = handle.session(),
        "operation evaluated"
    );

    Ok(ComputeResult {
        operation: operation.to_string(),
        shape,
        dtype: dtype.name().to_string(),
        value: finite(value),
        value_text: value.to_string(),
        sample_values,
        reference_value: finite(reference),
        device_id: handle.device_id(),
        session: handle.session(),
    })
}

fn output_layout(
    operation: &str,
    operands: &[Operand],
) -> Result<(Vec<usize>, DType), ComputeError> {
    let mut layouts = operands.iter().filter_map(|o| o.layout.as_ref());
    let (shape, dtype) = layouts
        .next()
        .ok_or_else(|| ComputeError::NoTensorInput(operation.to_string()))?;

    if let Some((other, _)) = layouts.find(|(other, _)| other != shape) {
        return Err(ComputeError::ShapeMismatch {
            operation: operation.to_string(),
            left: shape.clone(),
            right: other.clone(),
        });
    }
    Ok((shape.clone(), *dtype))
}

/// Evaluate one element; `inputs` already matches the kernel's arity
fn apply(kernel: Kernel, inputs: &[f64], params: Params, row: usize, col: usize) -> f64 {
    match (kernel, inputs) {
        (Kernel::Unary(f), [a]) => f(*a, params),
        (Kernel::Triangle(keep), [a]) => {
            if keep(row, col) {
                *a
            } else {
                0.0
            }
        }
        (Kernel::Binary(f), [a, b]) => f(*a, *b, params),
        (Kernel::Ternary(f), [a, b, c]) => f(*a, *b, *c, params),
        _ => f64::NAN,
    }
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
