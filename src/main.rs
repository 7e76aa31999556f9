mod cli;
mod commands;
mod config;
mod input;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::VmgraphConfig;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: VmgraphConfig,
    pub config_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "vmgraph", &mut io::stdout());
        return Ok(());
    }

    let (config, config_path) = VmgraphConfig::load(cli.config.as_deref())?;

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
        config_path,
    };

    match cli.command {
        Command::Build(args) => commands::build::run(&ctx, args),
        Command::Validate(args) => commands::validate::validate(&ctx, args),
        Command::Plan(args) => commands::validate::plan(&ctx, args),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
        Command::Completions { .. } => Ok(()),
    }
}
