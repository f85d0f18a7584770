//! Line-oriented handler: one JSON request per stdin line, one JSON
//! response per stdout line. Logs go to stderr.
//!
//! Usage: dialograph-handler [scenario.xml]

use std::io;
use std::path::PathBuf;

use dialograph_runtime::{serve, RuntimeConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let mut config = RuntimeConfig::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        config.scenario_path = PathBuf::from(path);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!(scenario = %config.scenario_path.display(), "handler started");
    let failed = serve(&config, io::stdin().lock(), io::stdout().lock())?;
    tracing::info!(failed, "input closed");
    Ok(())
}
