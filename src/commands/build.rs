//! `vmgraph build` - write the resource graph for a request document

use anyhow::{Context as AnyhowContext, Result};
use gcegraph::Deployment;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::BuildArgs;
use crate::commands::{explain, load_graph};
use crate::ui;

pub fn run(ctx: &Context, args: BuildArgs) -> Result<()> {
    let deployment = load_graph(ctx, &args.input)?;
    deployment.validate().map_err(explain)?;

    let pretty = ctx.config.output.pretty && !args.compact;
    let json = render(&deployment, pretty)?;

    match output_path(ctx, &args) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create {}", parent.display()))?;
            }
            fs::write(&path, json + "\n")
                .with_context(|| format!("Could not write {}", path.display()))?;
            if !ctx.quiet {
                ui::success(&format!(
                    "Wrote {} to {}",
                    ui::count(deployment.len(), "resource"),
                    path.display()
                ));
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Serialize the `{"resources": [...]}` document
pub fn render(deployment: &Deployment, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(deployment)
    } else {
        serde_json::to_string(deployment)
    };
    json.context("Failed to serialize resource graph")
}

/// Where to write the graph: `--output`, then the configured directory, else stdout
fn output_path(ctx: &Context, args: &BuildArgs) -> Option<PathBuf> {
    if let Some(path) = &args.output {
        return Some(path.clone());
    }
    let dir = ctx.config.output.directory_path()?;
    Some(dir.join(output_file_name(&args.input)))
}

fn output_file_name(input: &Path) -> String {
    match input.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if input.as_os_str() != "-" => format!("{}.json", stem),
        _ => "deployment.json".to_string(),
    }
}
