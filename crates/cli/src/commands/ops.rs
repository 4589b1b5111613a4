// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation catalog

use std::fmt;

use anyhow::Result;
use dg_engine::compute::{OperationGroup, ParamSpec};
use serde::Serialize;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct Catalog {
    categories: Vec<OperationGroup>,
    params: Vec<ParamSpec>,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.categories {
            writeln!(f, "{} ({})", group.category, group.operations.len())?;
            writeln!(f, "  {}", group.operations.join(" "))?;
        }
        writeln!(f)?;
        write!(f, "Parameters")?;
        for p in &self.params {
            write!(
                f,
                "\n  {:<12} --param  {}={} ({})",
                p.operation, p.param_name, p.default, p.description
            )?;
            if let Some(second) = &p.second {
                write!(
                    f,
                    "\n  {:<12} --param2 {}={} ({})",
                    "", second.name, second.default, second.description
                )?;
            }
        }
        Ok(())
    }
}

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (categories, params) = client.operations().await?;
    output::print(&Catalog { categories, params }, format);
    Ok(())
}
