mod app;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codecards::config::{AppConfig, default_config_path};
use codecards::export::json::{load_catalog, merge_unit_files};
use codecards::review::ReviewClock;
use codecards::{Difficulty, Quality, SqliteStore};
use log::warn;

use app::{App, PracticeOptions, unknown_units};

#[derive(Parser)]
#[command(name = "codecards", about = "Spaced repetition practice for coding exercises", version)]
struct Cli {
    /// Config file (default: <config dir>/codecards/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Card catalog JSON, overrides the config file
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Progress database, overrides the config file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cards due today
    Due,

    /// List units with cards due today
    Units,

    /// Practice a shuffled deck of due cards
    Practice {
        /// Only these units (repeatable; default: every unit with due cards)
        #[arg(long = "unit")]
        units: Vec<String>,
        /// Only these difficulties (repeatable; default: both)
        #[arg(long = "difficulty")]
        difficulties: Vec<Difficulty>,
        /// Study starred cards instead, due or not
        #[arg(long)]
        favorites: bool,
        /// Number of cards in the deck
        #[arg(long)]
        count: Option<usize>,
    },

    /// Rate a single card (0-5)
    Rate { card_id: String, quality: Quality },

    /// Star or unstar a card
    Favorite { card_id: String },

    /// List starred cards
    Favorites,

    /// Replace a card's notes
    Note { card_id: String, text: String },

    /// Reset progress to catalog defaults
    Reset {
        /// Reset only this unit
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        unit: Option<String>,
        /// Reset every card
        #[arg(long)]
        all: bool,
    },

    /// Show logged reviews, newest first
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Merge unit<N>.json files in a directory into flashcards.json
    Merge {
        dir: PathBuf,
        /// Comma-separated file stems to leave out, e.g. unit2,unit5
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Command::Merge { dir, exclude } = &cli.command {
        let report = merge_unit_files(dir, exclude)
            .with_context(|| format!("merging unit files in {}", dir.display()))?;
        println!(
            "Merged {} files into {} ({} cards)",
            report.merged_files,
            report.output.display(),
            report.card_count
        );
        for skipped in &report.skipped {
            println!("  skipped {} (not an array)", skipped);
        }
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let catalog = load_catalog(&config.catalog_path)
        .with_context(|| format!("loading catalog {}", config.catalog_path.display()))?;

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    let app = App::new(config, catalog, store);
    let mut out = io::stdout().lock();
    let clock = ReviewClock::system();

    match cli.command {
        Command::Due => app.show_due(clock, &mut out),
        Command::Units => app.show_units(clock, &mut out),
        Command::Practice {
            units,
            difficulties,
            favorites,
            count,
        } => {
            for unit in unknown_units(&app.catalog, &units) {
                warn!("Unit '{}' is not in the catalog", unit);
            }
            let options = PracticeOptions {
                units,
                difficulties,
                only_favorites: favorites,
                count,
            };
            app.practice(&options, ReviewClock::system, &mut io::stdin().lock(), &mut out)
        }
        Command::Rate { card_id, quality } => app.rate(&card_id, quality, clock, &mut out),
        Command::Favorite { card_id } => app.toggle_favorite(&card_id, &mut out),
        Command::Favorites => app.show_favorites(&mut out),
        Command::Note { card_id, text } => app.set_notes(&card_id, &text, &mut out),
        Command::Reset { unit, .. } => app.reset(unit.as_deref(), &mut out),
        Command::History { limit } => app.show_history(limit, &mut out),
        // handled before the catalog is loaded
        Command::Merge { .. } => Ok(()),
    }
}
