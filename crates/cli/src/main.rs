use std::{
    fs::{OpenOptions, create_dir_all},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paddock_registry::{
    DescriptionSource, LookupOptions, OwnerSource, ParentSource, StableRegistry, format_owner_name, format_parent_name,
};
use paddock_tui::TuiOptions;
use paddock_typeahead::SuggestionSource;
use paddock_types::ParentRole;
use paddock_util::{PaddockSettings, config_file_path, expand_tilde};
use tracing::{debug, info};

const DEFAULT_LOG_FILE: &str = "paddock.log";

/// Pick owners and parents for a horse with asynchronous typeahead fields.
#[derive(Parser, Debug)]
#[command(name = "paddock", version, about)]
struct Cli {
    /// Stable data file (`{ "owners": [...], "horses": [...] }`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Quiet period before a lookup is issued
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Artificial delay added to every lookup
    #[arg(long, global = true)]
    latency_ms: Option<u64>,

    /// Maximum suggestions per lookup
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Where the TUI writes its log (defaults to the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Open an existing horse for editing
    #[arg(long, value_name = "HORSE_ID")]
    edit: Option<i64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the suggestions a field would offer for TEXT, one per line
    Suggest {
        #[arg(value_enum)]
        kind: SuggestKind,
        text: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SuggestKind {
    Owners,
    Mothers,
    Fathers,
    Descriptions,
}

/// Settings file, environment and flags merged; flags win.
#[derive(Debug)]
struct Resolved {
    registry: Arc<StableRegistry>,
    debounce_interval: Duration,
    lookup: LookupOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let log_file = cli.log_file.clone().unwrap_or_else(|| config_file_path(DEFAULT_LOG_FILE));
            init_tracing(Some(&log_file))?;
            let resolved = resolve(&cli)?;
            paddock_tui::run(TuiOptions {
                registry: resolved.registry,
                debounce_interval: resolved.debounce_interval,
                lookup: resolved.lookup,
                edit_horse: cli.edit,
            })
            .await
        }
        Some(Command::Suggest { kind, ref text }) => {
            init_tracing(cli.log_file.as_deref())?;
            let resolved = resolve(&cli)?;
            for line in suggest(&resolved, kind, text).await? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let Some(path) = log_file else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
    Ok(())
}

fn resolve(cli: &Cli) -> Result<Resolved> {
    let settings = PaddockSettings::load().context("load settings")?;
    debug!(?settings, "settings loaded");

    let data_path = cli
        .data
        .as_ref()
        .map(|path| expand_tilde(&path.to_string_lossy()))
        .or(settings.data_path);
    let registry = match data_path {
        Some(path) => StableRegistry::load(&path).with_context(|| format!("load stable data from {}", path.display()))?,
        None => {
            info!("using embedded sample stable");
            StableRegistry::from_embedded_sample().context("load embedded sample stable")?
        }
    };

    Ok(Resolved {
        registry: Arc::new(registry),
        debounce_interval: Duration::from_millis(cli.debounce_ms.unwrap_or(settings.debounce_ms)),
        lookup: LookupOptions {
            limit: cli.limit.unwrap_or(settings.suggestion_limit),
            latency: Duration::from_millis(cli.latency_ms.unwrap_or(settings.latency_ms)),
        },
    })
}

async fn suggest(resolved: &Resolved, kind: SuggestKind, text: &str) -> Result<Vec<String>> {
    let registry = Arc::clone(&resolved.registry);
    let lines: Vec<String> = match kind {
        SuggestKind::Owners => OwnerSource::new(registry, resolved.lookup)
            .suggestions_for(text)
            .await?
            .iter()
            .map(|owner| format_owner_name(Some(owner)))
            .collect(),
        SuggestKind::Mothers | SuggestKind::Fathers => {
            let role = if matches!(kind, SuggestKind::Mothers) {
                ParentRole::Mother
            } else {
                ParentRole::Father
            };
            ParentSource::new(registry, role, resolved.lookup)
                .suggestions_for(text)
                .await?
                .iter()
                .map(|horse| format_parent_name(Some(horse)))
                .collect()
        }
        SuggestKind::Descriptions => DescriptionSource::new(registry, resolved.lookup).suggestions_for(text).await?,
    };
    Ok(lines)
}
