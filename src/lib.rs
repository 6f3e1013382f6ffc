// Per-client rate limiting in front of /ping

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod reclaim;
pub mod registry;
pub mod state;

use axum::routing::{any, get};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use config::{Args, LimiterConfig};
pub use error::Error;
pub use registry::ClientRegistry;
pub use state::AppState;

/// `/ping` behind the rate limiter, plus an unlimited `/metrics` when asked.
pub fn router(state: &AppState, expose_metrics: bool) -> Router {
    let mut app = Router::new()
        .route("/ping", any(handlers::ping_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.registry.clone(),
            middleware::rate_limit,
        ));

    if expose_metrics {
        app = app.route("/metrics", get(handlers::metrics_handler));
    }
    app
}

/// Binds the listening socket. Failing here is fatal to startup.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, Error> {
    TcpListener::bind(addr).await.map_err(|source| {
        let err = Error::Bind { addr, source };
        error!(error = %err, "startup failed");
        err
    })
}

/// Serves on `listener` until `shutdown` is cancelled, running the
/// reclamation loop for as long as the server is up.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    expose_metrics: bool,
    shutdown: CancellationToken,
) -> Result<(), Error> {
    let reclaimer = reclaim::spawn_reclaimer(
        state.registry.clone(),
        state.limiter(),
        shutdown.child_token(),
    );

    let app = router(&state, expose_metrics);
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.clone().cancelled_owned())
    .await;

    // the loop must not outlive the server, even if serving failed
    shutdown.cancel();
    let reclaimed = reclaim::reclaimer_outcome(reclaimer.await);
    info!("server stopped");

    result?;
    reclaimed
}
