mod chat_cmd;
mod config;
mod config_cmd;
mod demo;
mod inspect_cmd;
mod terminal_output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use chat_cmd::ChatArgs;
use config::Settings;
use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Tandem: two persona agents on a simulated first date")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.tandem/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a conversation between two profiles and evaluate it
    Chat(ChatArgs),
    /// Show the rule-based match score in both directions
    Score {
        #[arg(long)]
        a: String,
        #[arg(long)]
        b: String,
    },
    /// Print party A's system prompt for a given prompt turn (orchestrator turn + 1)
    Prompt {
        #[arg(long)]
        a: String,
        #[arg(long)]
        b: String,
        #[arg(long, default_value_t = 1)]
        turn: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a starter config and demo profiles
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config with secrets masked
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let explicit = cli.config.as_deref();
    match cli.command {
        Commands::Chat(args) => {
            let settings = prepare(explicit).await?;
            let store = demo::profile_store(&settings.profiles_path()).await?;
            chat_cmd::run(&settings, store.as_ref(), args).await
        }
        Commands::Score { a, b } => {
            let settings = prepare(explicit).await?;
            let store = demo::profile_store(&settings.profiles_path()).await?;
            inspect_cmd::score(store.as_ref(), &a, &b)
        }
        Commands::Prompt { a, b, turn, seed } => {
            let settings = prepare(explicit).await?;
            let store = demo::profile_store(&settings.profiles_path()).await?;
            inspect_cmd::prompt(store.as_ref(), &a, &b, turn, seed)
        }
        Commands::Config { command } => match command {
            // Must work even when the existing file fails to load.
            ConfigCommands::Init { force } => {
                let (dir, path) = config::resolve_paths(explicit);
                config_cmd::init(&dir, &path, force).await
            }
            ConfigCommands::Show => config_cmd::show(&prepare(explicit).await?),
        },
    }
}

/// Load settings and start logging into the configured directory.
async fn prepare(explicit: Option<&Path>) -> Result<Settings> {
    let settings = Settings::load(explicit).await?;
    tandem_logging::init_logger(settings.log_dir(), &settings.log_level())?;
    Ok(settings)
}
