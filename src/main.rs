/// MapTools markers
///
/// Periodically snapshots the players connected to a Minecraft server into a
/// JSON marker file for the web map, resolving player skins through a cached
/// profile lookup.

mod config;
mod context;
mod error;
mod jobs;
mod markers;
mod metrics;
mod players;
mod profile;
mod rate_limit;
mod server;

use config::{LoggingConfig, MarkerConfig};
use context::AppContext;
use error::MarkerResult;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> MarkerResult<()> {
    // Load configuration first so RUST_LOG from .env applies
    let config = MarkerConfig::from_env()?;

    init_logging(&config.logging);

    print_banner();

    let listen_addr = config.http.listen_addr;

    // Create application context
    let ctx = Arc::new(AppContext::new(config)?);

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    match listen_addr {
        Some(addr) => server::serve((*ctx).clone(), addr).await?,
        None => {
            info!("No HTTP listener configured; press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("Shutting down");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| "maptools_markers=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
    __  ___            ______            __
   /  |/  /___ _____  /_  __/___  ____  / /____
  / /|_/ / __ `/ __ \  / / / __ \/ __ \/ / ___/
 / /  / / /_/ / /_/ / / / / /_/ / /_/ / (__  )
/_/  /_/\__,_/ .___/ /_/  \____/\____/_/____/
            /_/
        Player markers v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
