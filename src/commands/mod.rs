pub mod build;
pub mod config;
pub mod validate;

use anyhow::Result;
use gcegraph::{BuildRequest, Deployment, GraphBuilder};
use std::path::Path;

use crate::Context;
use crate::input;

/// Read a request document and build its graph with the configured options
pub(crate) fn load_graph(ctx: &Context, path: &Path) -> Result<Deployment> {
    let document = input::read(path)?;
    let request = BuildRequest::from_value(&document).map_err(explain)?;

    log::info!(
        "{}: {} VMs, {} to stop first, {} firewall rules",
        path.display(),
        request.vms.len(),
        request.shutdown.len(),
        request.firewall_rules.len()
    );

    Ok(GraphBuilder::new(ctx.config.builder.clone()).build(&request))
}

/// Attach the category advice to a library error
pub(crate) fn explain(err: gcegraph::Error) -> anyhow::Error {
    let category = err.category();
    anyhow::Error::new(err).context(format!(
        "{}. {}",
        category.description(),
        category.advice()
    ))
}
