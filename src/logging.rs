use std::{fs, sync::Mutex};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Logs go to a file; the terminal belongs to the UI.
pub fn init(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|err| Error::Logging(err.to_string()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(env_filter),
        )
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))?;

    tracing::debug!(path = %path.display(), "Logging initialised");
    Ok(())
}
