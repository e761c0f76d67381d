pub mod commands;
pub mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// wmctl: inspect and edit session working memory.
#[derive(Debug, Parser)]
#[command(name = "wmctl", version, about)]
pub struct Cli {
    /// Emit logs as JSON instead of compact text.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List session ids in a namespace.
    List {
        #[arg(long)]
        namespace: Option<String>,
        /// Accepted for compatibility; the session index cannot filter by user yet.
        #[arg(long)]
        user_id: Option<String>,
        /// Page size (defaults to `working_memory.default_list_limit`).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print a session's working memory as JSON.
    Get {
        session_id: String,
        #[command(flatten)]
        scope: Scope,
        /// Only return the N most recent messages.
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Store a working-memory document read from a JSON file (`-` for stdin).
    Put {
        file: PathBuf,
    },
    /// Delete a session's working memory.
    Delete {
        session_id: String,
        #[command(flatten)]
        scope: Scope,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Optional user / namespace scoping shared by single-session commands.
#[derive(Debug, Clone, Default, Args)]
pub struct Scope {
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub namespace: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `WM_CONFIG` (or
/// `wm.toml` by default). Returns the parsed [`Config`] and the path that
/// was used.
///
/// [`Config`]: wm_domain::config::Config
pub fn load_config() -> anyhow::Result<(wm_domain::config::Config, String)> {
    let config_path = std::env::var("WM_CONFIG").unwrap_or_else(|_| "wm.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, falling back to defaults when the file does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<wm_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(wm_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_get_with_scope() {
        let cli = Cli::try_parse_from([
            "wmctl", "get", "s1", "--user-id", "alice", "--namespace", "acme", "--recent", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Get {
                session_id,
                scope,
                recent,
            } => {
                assert_eq!(session_id, "s1");
                assert_eq!(scope.user_id.as_deref(), Some("alice"));
                assert_eq!(scope.namespace.as_deref(), Some("acme"));
                assert_eq!(recent, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_defaults() {
        let cli = Cli::try_parse_from(["wmctl", "list"]).unwrap();
        match cli.command {
            Command::List { limit, offset, namespace, user_id } => {
                assert_eq!(limit, None);
                assert_eq!(offset, 0);
                assert!(namespace.is_none());
                assert!(user_id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn json_logs_is_global() {
        let cli = Cli::try_parse_from(["wmctl", "config", "show", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Show)));
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let cfg = load_config_from("/definitely/not/here/wm.toml").unwrap();
        assert!(cfg.store.redis_url.is_none());
    }

    #[test]
    fn config_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[working_memory]\nreconstruct_from_long_term = true").unwrap();
        let cfg = load_config_from(file.path().to_str().unwrap()).unwrap();
        assert!(cfg.working_memory.reconstruct_from_long_term);
    }

    #[test]
    fn bad_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nredis_url = 1").unwrap();
        let err = load_config_from(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }
}
