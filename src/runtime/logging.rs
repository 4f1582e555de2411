use std::fs::{self, OpenOptions};

use crate::config::LogSettings;
use crate::error::Result;

/// Install the global logger. `RUST_LOG` overrides `log.level`.
pub fn init(settings: &LogSettings) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.level.as_str()),
    );
    builder.format_timestamp_millis();

    if let Some(path) = &settings.file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A logger installed by an embedding program wins.
    let _ = builder.try_init();
    Ok(())
}
