use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vmgraph")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Generate Deployment Manager resource graphs for GCE VMs and firewall rules",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/vmgraph/config.toml)
    #[arg(short, long, global = true, env = "VMGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the resource graph for a request document
    Build(BuildArgs),

    /// Check that a request document builds into a runnable graph
    Validate(InputArgs),

    /// Show the order in which the engine will run the graph
    Plan(InputArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct InputArgs {
    /// Request document (.json or .toml), or - for JSON on stdin
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Request document (.json or .toml), or - for JSON on stdin
    pub input: PathBuf,

    /// Write the graph to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}
