use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wm_cli::cli::{commands, Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.json_logs);

    let (config, config_path) = wm_cli::cli::load_config()?;
    tracing::debug!(config_path = %config_path, "loaded config");

    match cli.command {
        Command::Config(ConfigCommand::Validate) => {
            let valid = wm_cli::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => wm_cli::cli::config::show(&config),
        command => {
            let manager = wm_core::build_manager(&config)
                .await
                .context("building working memory manager")?;
            let wm_cfg = &config.working_memory;
            let mut out = std::io::stdout().lock();

            match command {
                Command::List {
                    namespace,
                    user_id,
                    limit,
                    offset,
                } => {
                    commands::list(&manager, wm_cfg, namespace, user_id, limit, offset, &mut out)
                        .await
                }
                Command::Get {
                    session_id,
                    scope,
                    recent,
                } => {
                    let found =
                        commands::get(&manager, wm_cfg, &session_id, scope, recent, &mut out)
                            .await?;
                    if !found {
                        std::process::exit(1);
                    }
                    Ok(())
                }
                Command::Put { file } => commands::put(&manager, &file, &mut out).await,
                Command::Delete { session_id, scope } => {
                    commands::delete(&manager, wm_cfg, &session_id, scope, &mut out).await
                }
                Command::Config(_) => Ok(()),
            }
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_cli_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
