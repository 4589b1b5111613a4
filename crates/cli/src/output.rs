// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text or JSON rendering of command results

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One pretty-printed JSON document, for monitoring and scripts
    Json,
}

/// Render `value` as text or JSON
pub fn render<T: Serialize + std::fmt::Display>(
    value: &T,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(value.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(value),
    }
}

/// Print `value` to stdout in `format`
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match render(value, format) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => tracing::warn!(error = %e, "could not serialize command output"),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
