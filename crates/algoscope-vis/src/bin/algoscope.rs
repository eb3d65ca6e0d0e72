//! Algoscope visualization server
//!
//! Serves algorithm runs, tree and trie operations, and playback control.
//!
//! Usage: `algoscope [port]`

use algoscope_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoscope=info,algoscope_vis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env();
    if let Some(port) = std::env::args().nth(1).and_then(|s| s.parse().ok()) {
        config = config.with_port(port);
    }

    tracing::info!(
        addr = %config.addr,
        speed_ms = config.speed_ms,
        algorithms = algoscope_algorithms::algorithms().count(),
        "Starting Algoscope"
    );

    VisServer::new(config).serve().await?;

    Ok(())
}
