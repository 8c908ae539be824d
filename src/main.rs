//! Folio CLI
//!
//! Thin wrapper around folio-core for headless use.
//!
//! ## Usage
//!
//! ```bash
//! # Replay an event script against a page fixture
//! folio replay demos/portfolio.json demos/script.json
//!
//! # Same, but read and write the theme preference on disk
//! folio replay demos/portfolio.json demos/script.json --persist
//!
//! # Inspect or change the persisted theme
//! folio theme show
//! folio theme set light
//! folio theme toggle
//!
//! # Check contact form input
//! folio validate --name Ada --email ada@example.com --subject Hi --message "Hello there!"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{
    replay, validate_field, EngineConfig, Field, MemoryDocument, MemoryPreferences, PageSpec,
    PreferenceStore, RedbPreferences, Script, Theme, UiEngine,
};
use tracing::{debug, info};

/// Folio - portfolio page behavior, headless
#[derive(Parser)]
#[command(name = "folio")]
#[command(version = "0.1.0")]
#[command(about = "Folio - headless driver for the portfolio UI reaction engine")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Data directory (default: platform data dir + /folio)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event script against a page fixture
    Replay {
        /// Page fixture (JSON)
        page: PathBuf,
        /// Event script (JSON)
        script: PathBuf,
        /// Use the on-disk preference store instead of a throwaway one
        #[arg(long)]
        persist: bool,
    },

    /// Persisted theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Run the contact form field rules
    Validate {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Show the stored theme
    Show,
    /// Store a theme
    Set {
        /// light or dark
        theme: Theme,
    },
    /// Flip the stored theme
    Toggle,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (<platform data dir>/folio)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn open_preferences(data_dir: &Path) -> Result<RedbPreferences> {
    let path = data_dir.join("preferences.redb");
    debug!(path = %path.display(), "Opening preference store");
    RedbPreferences::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay {
            page,
            script,
            persist,
        } => {
            let page = PageSpec::load(&page)
                .with_context(|| format!("Failed to load page fixture {}", page.display()))?;
            let script = Script::load(&script)
                .with_context(|| format!("Failed to load script {}", script.display()))?;

            let store: Box<dyn PreferenceStore> = if persist {
                Box::new(open_preferences(&data_dir)?)
            } else {
                Box::new(MemoryPreferences::new())
            };

            let mut engine = UiEngine::new(MemoryDocument::from_page(&page), store, config)?;
            let report = replay(&mut engine, &script)?;
            info!(steps = report.steps.len(), clean = report.is_clean(), "Replay finished");

            let output = serde_json::json!({
                "skipped": engine.skipped_groups(),
                "steps": report.steps,
                "snapshot": engine.document().snapshot(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Theme { action } => {
            let key = &config.theme.storage_key;
            let mut store = open_preferences(&data_dir)?;
            match action {
                ThemeAction::Show => {
                    let theme = Theme::from_stored(store.get(key)?.as_deref());
                    println!("{}", theme);
                }
                ThemeAction::Set { theme } => {
                    store.set(key, theme.as_str())?;
                    println!("Theme set to {}", theme);
                }
                ThemeAction::Toggle => {
                    let theme = Theme::from_stored(store.get(key)?.as_deref()).toggled();
                    store.set(key, theme.as_str())?;
                    println!("Theme set to {}", theme);
                }
            }
        }

        Commands::Validate {
            name,
            email,
            subject,
            message,
        } => {
            let mut failed = 0;
            for (field, value) in Field::ALL.into_iter().zip([name, email, subject, message]) {
                match validate_field(field, &value, config.form.min_message_len) {
                    Ok(()) => println!("{}: ok", field),
                    Err(e) => {
                        failed += 1;
                        println!("{}: {}", field, e.message(&config.form));
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} field(s) failed validation", failed);
            }
        }
    }

    Ok(())
}
