mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "soundspike")]
#[command(about = "Sound activity tracking pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the pipeline once for an artist and print the result.
    Run {
        /// Artist id from the roster; defaults to the first configured artist.
        #[arg(long)]
        artist: Option<String>,
    },
    /// Keep refreshing on the configured interval, printing each completed
    /// run until interrupted.
    Watch {
        #[arg(long)]
        artist: Option<String>,
    },
    /// Fetch one sound's page and print the extracted post count without
    /// touching the ledger.
    Scrape {
        /// Sound id from the roster.
        sound: String,
    },
    /// Print the persisted history for one sound.
    History {
        /// Sound id from the roster.
        sound: String,
    },
    /// Wipe the entire persisted history ledger.
    ClearHistory,
    /// Print synthetic demo data as JSON.
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Synthetic output only; must work with no environment configured.
    if let Commands::Demo = cli.command {
        return commands::demo();
    }

    let config = soundspike_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run { artist } => commands::run_once(&config, artist.as_deref()).await,
        Commands::Watch { artist } => commands::watch(&config, artist.as_deref()).await,
        Commands::Scrape { sound } => commands::scrape(&config, &sound).await,
        Commands::History { sound } => commands::history(&config, &sound).await,
        Commands::ClearHistory => commands::clear_history(&config).await,
        Commands::Demo => commands::demo(),
    }
}
