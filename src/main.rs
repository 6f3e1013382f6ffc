use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ping_gate::{AppState, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let limiter = args.limiter_config()?;
    let state = AppState::new(limiter.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = ping_gate::bind(addr).await?;

    info!(
        %addr,
        burst = limiter.burst(),
        refill_per_sec = limiter.refill_per_sec(),
        idle_threshold = ?limiter.idle_threshold(),
        sweep_interval = ?limiter.sweep_interval(),
        metrics = args.expose_metrics,
        "ping-gate listening"
    );

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received, shutting down");
                signal.cancel();
            }
            Err(e) => error!(error = %e, "unable to listen for ctrl-c"),
        }
    });

    ping_gate::serve(listener, state, args.expose_metrics, shutdown).await?;
    Ok(())
}
