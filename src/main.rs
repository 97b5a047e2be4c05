mod checkers;
mod commands;
mod config;
mod detector;
mod error;
mod model;
mod notify;
mod storage;
mod updater;
mod util;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

/// Watches mod hosting sites and announces new releases on Discord
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Configuration file (defaults to the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage file, overriding the configured one
    #[arg(short, long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates an empty storage file
    #[command(visible_alias = "init")]
    Initialize {
        /// Replace an existing storage file, if found
        #[arg(short, long)]
        force: bool,
    },
    /// Starts tracking a mod for a guild
    Add {
        /// Mod page on CurseForge, Modrinth or MrCrayfish
        url: String,

        /// Guild the mod is tracked for
        #[arg(short, long)]
        guild: u64,

        /// Channel that receives update notifications
        #[arg(short = 'n', long)]
        channel: u64,

        /// Minecraft versions to match, or "all"
        #[arg(short, long, value_delimiter = ',')]
        mc_versions: Option<Vec<String>>,

        /// Mod loaders to match, or "all"
        #[arg(short, long, value_delimiter = ',')]
        loaders: Option<Vec<String>>,
    },
    /// Stops tracking every entry with the given URL
    Remove {
        url: String,

        #[arg(short, long)]
        guild: u64,
    },
    /// Lists mods tracked for a guild
    List {
        #[arg(short, long)]
        guild: u64,

        /// Show detailed information
        #[arg(short, long)]
        details: bool,
    },
    /// Runs one update check pass
    Check,
    /// Keeps checking for updates until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    util::init_logging();
    info!("Starting modwatch version {}", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => util::get_config_path()?,
    };

    match args.command {
        Command::Initialize { force } => {
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            util::init_storage(&path, force).await
        }
        Command::Add {
            url,
            guild,
            channel,
            mc_versions,
            loaders,
        } => {
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            commands::add(&path, guild, channel, url, mc_versions, loaders).await
        }
        Command::Remove { url, guild } => {
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            commands::remove(&path, guild, url).await
        }
        Command::List { guild, details } => {
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            commands::list(&path, guild, details).await
        }
        Command::Check => {
            let config = config::Config::load(&config_path).await?;
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            commands::check(&config, path).await
        }
        Command::Watch => {
            let config = config::Config::load(&config_path).await?;
            let path = util::resolve_storage_path(args.storage, &config_path).await?;
            commands::watch(&config, path).await
        }
    }
}
