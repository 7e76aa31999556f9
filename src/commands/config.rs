use anyhow::Result;

use crate::Context;
use crate::cli::ConfigCommand;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");
    ui::kv("Config file", &ctx.config_path.display().to_string());
    if !ctx.config_path.exists() {
        ui::dim("Not found, using built-in defaults");
    }
    println!();
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}
