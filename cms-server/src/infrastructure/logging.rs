use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

// Quiet the per-request chatter from the HTTP stack unless asked for.
const FALLBACK_DIRECTIVES: &str = "info,tower_http=warn,sqlx=warn";

pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVES));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to init logging: {err}"))?;

    Ok(())
}
