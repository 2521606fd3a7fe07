//! tube-indexer CLI
//!
//! Indexes the uploads of the channels listed in a channel file into
//! Meilisearch, one index per collection.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use dialoguer::Password;
use tube_indexer::{
    config,
    error::{AppError, Result},
    models::{CollectionConfig, Config},
    pipeline::{self, RunContext},
    services::{MeiliClient, YoutubeClient},
    utils::console::Console,
};

/// Index YouTube channel uploads into Meilisearch
#[derive(Parser, Debug)]
#[command(name = "tube-indexer", version, about)]
struct Cli {
    /// Channel file (TOML) describing the collections to index
    #[arg(value_name = "CHANNEL_FILE")]
    channel_file: PathBuf,

    /// YouTube Data API key (prompted for when missing)
    #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_key: Option<String>,

    /// Meilisearch address [default: http://127.0.0.1:7700]
    #[arg(short = 'c', long, env = "MEILI_URL")]
    client_address: Option<String>,

    /// Meilisearch master key
    #[arg(short = 'm', long, env = "MEILI_MASTER_KEY", hide_env_values = true)]
    master_key: Option<String>,

    /// Settings file (built-in defaults when omitted)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Validate settings and the channel file, then exit without remote calls
    #[arg(long)]
    validate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Initialize logging based on verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Ask for the API key without echoing it.
fn prompt_api_key() -> Result<String> {
    let key = Password::new()
        .with_prompt("Please provide your YouTube API key")
        .interact()
        .map_err(|e| AppError::config(format!("Cannot read the YouTube API key: {e}")))?;
    Ok(key.trim().to_string())
}

/// Print what a run would do.
fn print_plan(config: &Config, collections: &[CollectionConfig]) {
    println!("Settings and channel file OK");
    for collection in collections {
        let enabled = collection.enabled_channels().len();
        let status = if collection.disabled {
            "disabled".to_string()
        } else if enabled == 0 {
            "no enabled channels".to_string()
        } else {
            format!(
                "{enabled}/{} channels, tags {}",
                collection.channels.len(),
                if collection.index_tags { "on" } else { "off" }
            )
        };
        println!("{} ({}): {}", collection.key, collection.display_name, status);
    }
    println!(
        "Batch size {}, at most {} items per page, filter mode {:?}",
        config.sync.batch_size, config.youtube.page_size, config.sync.filter_mode
    );
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let (mut config, collections) =
        config::load_all(cli.settings.as_deref(), &cli.channel_file)?;
    if let Some(address) = cli.client_address {
        config.search.url = address;
    }
    if cli.master_key.is_some() {
        config.search.master_key = cli.master_key;
    }

    if cli.validate {
        print_plan(&config, &collections);
        return Ok(());
    }

    let api_key = match cli.youtube_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => prompt_api_key()?,
    };

    let started = Instant::now();
    let search = MeiliClient::connect(&config.search, &config.http).await?;
    let catalog = YoutubeClient::new(&config, api_key)?;
    let console = Console::new(cli.quiet);

    let ctx = RunContext::new(&catalog, &search, &config, &console);
    let counters = pipeline::run(&ctx, &collections).await?;

    console.summary(&counters, started.elapsed());
    Ok(())
}
