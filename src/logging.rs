use std::{fs::OpenOptions, path::Path};

use env_logger::{Builder, Env, Target};

use crate::error::{Error, Result};

/// Sends log records to `path`, or nowhere when no path is given.
/// The terminal is busy drawing the desktop, so stderr is never used.
pub fn init(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Logging(format!("{}: {}", path.display(), e)))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
