//! Terminal front end for the lost & found assistant.

mod chat;
mod desk;

use anyhow::Context;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use log::{debug, info};
use lostfound_config::{LayeredConfigOptions, LostFoundConfig, StoreConfig};
use lostfound_core::{AdminDesk, FoundItemForm, IntakeFlow, ReplyTiming};
use lostfound_store::{CollectionStore, FileKeyValueStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Data directory used when neither the platform nor the config provides one.
const FALLBACK_DATA_DIR: &str = ".lostfound/data";

/// Command-line options for the lost & found assistant.
#[derive(Parser)]
#[command(name = "lostfound", version)]
struct Cli {
    /// Optional path to a lostfound.json5 config file, applied last
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the lost and found collections
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report a lost item through the intake chat
    Report,
    /// Log a found item through the intake chat
    IntakeFound,
    /// List lost reports
    Lost {
        /// Only show reports whose name or description contains this term
        #[arg(long)]
        search: Option<String>,
    },
    /// List found items
    Found {
        /// Only show items whose name or description contains this term
        #[arg(long)]
        search: Option<String>,
    },
    /// Log a found item in one step
    AddFound {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        date: String,
    },
    /// Show found items that may match a pending lost report
    Match {
        /// Lost report id or reference number
        lost_id: String,
    },
    /// Mark a lost report found, optionally claiming a found item
    MarkFound {
        /// Lost report id or reference number
        lost_id: String,
        /// Found item handed back to the owner
        #[arg(long)]
        found: Option<String>,
    },
    /// Close a lost report without a match
    Close {
        /// Lost report id or reference number
        lost_id: String,
    },
}

/// Entry point for the lost & found CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting lostfound (config_set={}, data_dir_set={})",
        cli.config.is_some(),
        cli.data_dir.is_some()
    );
    let cwd = std::env::current_dir().context("cwd")?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &config.store, &cwd);
    info!("opening collections (data_dir={})", data_dir.display());
    let backend = FileKeyValueStore::new(&data_dir)
        .with_context(|| format!("failed to open data dir {}", data_dir.display()))?;
    let store = Arc::new(CollectionStore::new(Arc::new(backend)));

    let desk = AdminDesk::new(store.clone());
    match cli.command {
        Command::Report => {
            let flow = IntakeFlow::lost(&config);
            chat::run(flow, store, ReplyTiming::from_config(&config.chat)).await
        }
        Command::IntakeFound => {
            let flow = IntakeFlow::found(&config);
            chat::run(flow, store, ReplyTiming::from_config(&config.chat)).await
        }
        Command::Lost { search } => {
            desk::list_lost(&desk, search.as_deref());
            Ok(())
        }
        Command::Found { search } => {
            desk::list_found(&desk, search.as_deref());
            Ok(())
        }
        Command::AddFound {
            name,
            description,
            location,
            date,
        } => desk::add_found(
            &desk,
            FoundItemForm {
                name,
                description,
                location,
                date,
            },
        ),
        Command::Match { lost_id } => desk::show_matches(&desk, &lost_id),
        Command::MarkFound { lost_id, found } => {
            desk::mark_found(&desk, &lost_id, found.as_deref())
        }
        Command::Close { lost_id } => desk::close(&desk, &lost_id),
    }
}

/// Load the layered config, with an explicit path applied as the last layer.
fn load_config(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<LostFoundConfig> {
    let mut options = LayeredConfigOptions::new(cwd);
    if let Some(path) = explicit {
        info!("using runtime config layer: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered = LostFoundConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Pick the data directory: CLI flag, then config, then the platform default.
fn resolve_data_dir(flag: Option<&Path>, store: &StoreConfig, cwd: &Path) -> PathBuf {
    if let Some(path) = flag {
        return cwd.join(path);
    }
    if let Some(path) = store.path.as_deref().filter(|path| !path.trim().is_empty()) {
        return cwd.join(path);
    }
    ProjectDirs::from("", "", "lostfound")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| cwd.join(FALLBACK_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, resolve_data_dir};
    use clap::Parser;
    use lostfound_config::StoreConfig;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn data_dir_flag_wins_over_config() {
        let store = StoreConfig {
            path: Some("from-config".to_string()),
        };
        let cwd = Path::new("/work");
        assert_eq!(
            resolve_data_dir(Some(Path::new("flag")), &store, cwd),
            PathBuf::from("/work/flag")
        );
        assert_eq!(
            resolve_data_dir(None, &store, cwd),
            PathBuf::from("/work/from-config")
        );
        assert_eq!(
            resolve_data_dir(Some(Path::new("/abs/data")), &store, cwd),
            PathBuf::from("/abs/data")
        );
    }

    #[test]
    fn blank_config_path_falls_through() {
        let store = StoreConfig {
            path: Some("  ".to_string()),
        };
        let resolved = resolve_data_dir(None, &store, Path::new("/work"));
        assert_ne!(resolved, PathBuf::from("/work/  "));
    }

    #[test]
    fn mark_found_accepts_an_optional_found_id() {
        let cli = Cli::try_parse_from([
            "lostfound",
            "--data-dir",
            "/tmp/data",
            "mark-found",
            "abcd1234",
            "--found",
            "ef567890",
        ])
        .expect("parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        match cli.command {
            Command::MarkFound { lost_id, found } => {
                assert_eq!(lost_id, "abcd1234");
                assert_eq!(found.as_deref(), Some("ef567890"));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn add_found_requires_a_name() {
        assert!(Cli::try_parse_from(["lostfound", "add-found"]).is_err());
        let cli = Cli::try_parse_from(["lostfound", "add-found", "--name", "Keys"])
            .expect("parse");
        match cli.command {
            Command::AddFound {
                name, description, ..
            } => {
                assert_eq!(name, "Keys");
                assert_eq!(description, "");
            }
            _ => panic!("unexpected command"),
        }
    }
}
