// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run one operation on the device

use std::fmt;

use anyhow::{Context, Result};
use dg_engine::{ComputeRequest, ComputeResult, Input};
use serde::Serialize;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(clap::Args)]
pub struct ExecArgs {
    /// Operation name (see `dg ops`)
    pub operation: String,

    /// Inputs in order: a number is a filled tensor, `s:<number>` a scalar
    #[arg(allow_negative_numbers = true)]
    pub inputs: Vec<String>,

    /// Shape of every tensor input, comma separated
    #[arg(long, default_value = "1,1,32,32")]
    pub shape: String,

    /// Data type of every tensor input
    #[arg(long, default_value = "bfloat16")]
    pub dtype: String,

    /// First optional scalar parameter (see `dg ops`)
    #[arg(long, allow_negative_numbers = true)]
    pub param: Option<f64>,

    /// Second optional scalar parameter
    #[arg(long, allow_negative_numbers = true)]
    pub param2: Option<f64>,
}

impl ExecArgs {
    pub fn to_request(&self) -> Result<ComputeRequest> {
        let inputs = self
            .inputs
            .iter()
            .map(|raw| parse_input(raw, &self.shape, &self.dtype))
            .collect::<Result<Vec<_>>>()?;
        let mut request = ComputeRequest::new(&self.operation, inputs);
        request.optional_param = self.param;
        request.optional_param_2 = self.param2;
        Ok(request)
    }
}

/// `1.5` is a tensor filled with 1.5; `s:1.5` is the scalar 1.5
pub fn parse_input(raw: &str, shape: &str, dtype: &str) -> Result<Input> {
    match raw.strip_prefix("s:") {
        Some(value) => Ok(Input::scalar(parse_value(value)?)),
        None => Ok(Input::Tensor {
            value: parse_value(raw)?,
            shape: shape.to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

fn parse_value(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("invalid input value {:?}", raw))
}

#[derive(Serialize)]
struct Executed {
    request_id: String,
    elapsed_ms: u64,
    #[serde(flatten)]
    result: ComputeResult,
}

impl fmt::Display for Executed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        writeln!(f, "{} = {}", r.operation, r.value_text)?;
        writeln!(f, "  shape:     {:?}", r.shape)?;
        writeln!(f, "  dtype:     {}", r.dtype)?;
        if let Some(reference) = r.reference_value {
            writeln!(f, "  reference: {}", reference)?;
        }
        let samples: Vec<String> = r
            .sample_values
            .iter()
            .map(|v| v.map_or_else(|| "nan".to_string(), |v| v.to_string()))
            .collect();
        writeln!(f, "  samples:   [{}]", samples.join(", "))?;
        write!(
            f,
            "  device {} session {}, request {} in {}ms",
            r.device_id, r.session, self.request_id, self.elapsed_ms
        )
    }
}

pub async fn handle(args: ExecArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let request = args.to_request()?;
    let (request_id, elapsed_ms, result) = client.execute(request).await?;
    output::print(
        &Executed {
            request_id,
            elapsed_ms,
            result,
        },
        format,
    );
    Ok(())
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
