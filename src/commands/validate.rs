//! `vmgraph validate` and `vmgraph plan`

use anyhow::Result;
use colored::Colorize;
use gcegraph::{Deployment, Operation};

use crate::Context;
use crate::cli::InputArgs;
use crate::commands::{explain, load_graph};
use crate::ui;

/// Counts of descriptors by kind
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub instances: usize,
    pub firewall_rules: usize,
    pub actions: usize,
    pub edges: usize,
}

impl GraphSummary {
    pub fn of(deployment: &Deployment) -> Self {
        let mut summary = Self::default();
        for resource in deployment {
            match &resource.operation {
                Operation::Type(t) if t == gcegraph::types::INSTANCE_TYPE => summary.instances += 1,
                Operation::Type(_) => summary.firewall_rules += 1,
                Operation::Action(_) => summary.actions += 1,
            }
            summary.edges += resource.depends_on().len();
        }
        summary
    }
}

pub fn validate(ctx: &Context, args: InputArgs) -> Result<()> {
    let deployment = load_graph(ctx, &args.input)?;
    deployment.validate().map_err(explain)?;

    if ctx.quiet {
        return Ok(());
    }

    let summary = GraphSummary::of(&deployment);
    ui::header(&format!("{}", args.input.display()));
    ui::kv("Resources", &deployment.len().to_string());
    ui::kv("Instances", &summary.instances.to_string());
    ui::kv("Firewall rules", &summary.firewall_rules.to_string());
    ui::kv("Lifecycle actions", &summary.actions.to_string());
    ui::kv("Dependency edges", &summary.edges.to_string());
    println!();
    ui::success("Graph is valid");
    Ok(())
}

pub fn plan(ctx: &Context, args: InputArgs) -> Result<()> {
    let deployment = load_graph(ctx, &args.input)?;
    let waves = deployment.execution_order().map_err(explain)?;

    if deployment.is_empty() {
        ui::warn("Request produces no resources");
        return Ok(());
    }

    ui::header(&format!(
        "Execution plan ({}, {})",
        ui::count(deployment.len(), "resource"),
        ui::count(waves.len(), "wave")
    ));

    for (i, wave) in waves.iter().enumerate() {
        ui::step(i + 1, waves.len(), &ui::count(wave.len(), "resource"));
        for name in wave {
            let Some(resource) = deployment.get(name) else {
                continue;
            };
            let kind = match &resource.operation {
                Operation::Type(t) => t.as_str(),
                Operation::Action(a) => a.rsplit('.').next().unwrap_or(a),
            };
            let line = if resource.depends_on().is_empty() {
                format!("{} {}", name.bold(), kind.dimmed())
            } else {
                format!(
                    "{} {} {} {}",
                    name.bold(),
                    kind.dimmed(),
                    "after".dimmed(),
                    resource.depends_on().join(", ")
                )
            };
            println!("    {}", line);
        }
    }

    if ctx.verbose > 0 {
        println!();
        ui::dim("Resources within a wave have no ordering between them.");
    }

    Ok(())
}
