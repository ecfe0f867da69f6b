pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use clap::Parser;

use crate::commands::args::{Cli, Command};
use crate::commands::{AppState, CommandResult};
use crate::services::settings_service::SettingsService;

/// Entry point of the `productividad` binary. Returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    let as_json = cli.json;
    match try_run(cli) {
        Ok(()) => 0,
        Err(error) => {
            if as_json {
                match serde_json::to_string_pretty(&error) {
                    Ok(body) => eprintln!("{body}"),
                    Err(_) => eprintln!("{error}"),
                }
            } else {
                eprintln!("{error}");
            }
            error.exit_code()
        }
    }
}

fn try_run(cli: Cli) -> CommandResult<()> {
    let settings = SettingsService::new(cli.config.clone()).get()?;
    crate::utils::logger::init_logging(&settings)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(crate::error::AppError::from)?;

    runtime.block_on(execute(settings, cli))
}

async fn execute(settings: crate::models::settings::AppSettings, cli: Cli) -> CommandResult<()> {
    let state = AppState::new(settings)?;
    match cli.command {
        Command::Monitor(args) => commands::monitor::run(&state, args, cli.json).await,
        command => {
            let output = commands::run_command(&state, command, cli.json).await?;
            println!("{output}");
            Ok(())
        }
    }
}
