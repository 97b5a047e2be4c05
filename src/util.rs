use crate::{config::Config, Result};
use std::io::{Error as IOError, ErrorKind as IOErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_unwrap::OptionExt;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modwatch=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .expect_or_log("Failed to get user data directory")
        .join("modwatch");
    if !data_dir.is_dir() {
        info!("Creating data directory");
        std::fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.json"))
}

/// Storage location, in order of preference: the command line, the config
/// file, the data directory.
pub async fn resolve_storage_path(cli: Option<PathBuf>, config_path: &Path) -> Result<PathBuf> {
    if let Some(path) = cli {
        return Ok(path);
    }
    match Config::load(config_path).await {
        Ok(Config {
            storage_path: Some(path),
            ..
        }) => Ok(path),
        Ok(_) => Ok(get_data_dir()?.join("storage.json")),
        Err(e) => {
            debug!("Using default storage location: {}", e);
            Ok(get_data_dir()?.join("storage.json"))
        }
    }
}

pub async fn init_storage(path: &Path, force: bool) -> Result<()> {
    debug!("Initializing storage at {}", path.display());
    if path.is_file() {
        if force {
            info!("Replacing existing storage...");
        } else {
            return Err(IOError::new(IOErrorKind::AlreadyExists, "Storage file exists!").into());
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    crate::storage::save(path, &Default::default()).await?;
    info!("Initialized {}", path.display());
    Ok(())
}
