// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Status | Update | Checkout | Remove | Options | Inis
//! ```

use std::process::ExitCode;

use depsync::cli::global::GlobalOptions;
use depsync::cli::{self, Command};
use depsync::cmd::checkout::run_checkout_command;
use depsync::cmd::config::{run_inis_command, run_options_command};
use depsync::cmd::remove::run_remove_command;
use depsync::cmd::status::run_status_command;
use depsync::cmd::sync_context;
use depsync::cmd::update::run_update_command;
use depsync::config::Config;
use depsync::config::loader::ConfigLoader;
use depsync::config::types::GlobalConfig;
use depsync::error::{history_rewritten_hint, is_user_abort};
use depsync::logging::{LogConfig, LogLevel, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let config = load_config(&cli.global);
    let log_config = config.as_ref().map_or_else(
        |_| build_log_config(&cli.global),
        |config| log_config_from(config, &cli.global),
    );
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, config).await
}

/// Logging from CLI flags alone, used when the config does not load.
fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(|level| LogLevel::try_from(level).ok())
        .unwrap_or_default();

    let file_level = global
        .file_log_level
        .and_then(|level| LogLevel::try_from(level).ok())
        .unwrap_or(console_level);

    LogConfig::builder()
        .console_level(console_level)
        .file_level(file_level)
        .maybe_log_file(global.log_file.clone())
        .build()
}

/// Logging from the merged config; CLI flags are already folded in.
///
/// The file layer is only enabled when a log file was configured.
fn log_config_from(config: &Config, global: &GlobalOptions) -> LogConfig {
    let wants_file =
        global.log_file.is_some() || config.global.log_file != GlobalConfig::default().log_file;

    LogConfig::builder()
        .console_level(config.global.output_log_level)
        .file_level(config.global.file_log_level)
        .maybe_log_file(wants_file.then(|| config.global.log_file.clone()))
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: depsync::error::Result<Config>) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Inis) => {
            let loader = build_config_loader(&cli.global);
            run_inis_command(&loader.format_loaded_files());
            Ok(())
        }
        Some(Command::Options) => config.map(|config| run_options_command(&config)),
        Some(Command::Status(args)) => match with_context(config) {
            Ok((config, ctx)) => run_status_command(args, &config, ctx).await,
            Err(e) => Err(e),
        },
        Some(Command::Update(args)) => match with_context(config) {
            Ok((config, ctx)) => run_update_command(args, &config, ctx).await,
            Err(e) => Err(e),
        },
        Some(Command::Checkout(args)) => match with_context(config) {
            Ok((config, ctx)) => run_checkout_command(args, &config, ctx).await,
            Err(e) => Err(e),
        },
        Some(Command::Remove(args)) => match with_context(config) {
            Ok((config, ctx)) => run_remove_command(args, &config, ctx).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_user_abort(&e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(hint) = history_rewritten_hint(&e) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn with_context(
    config: depsync::error::Result<Config>,
) -> depsync::error::Result<(Config, std::sync::Arc<depsync::reconcile::SyncContext>)> {
    let config = config?;
    let ctx = sync_context(&config)?;
    Ok((config, ctx))
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_inis {
        loader = loader.add_toml_file_optional("depsync.toml");
    }
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader.with_env_prefix("DEPSYNC")
}

fn load_config(global: &GlobalOptions) -> depsync::error::Result<Config> {
    build_config_loader(global)
        .apply_overrides(&global.to_config_overrides())?
        .build()
        .map_err(|e| e.context("Failed to load config"))
}
