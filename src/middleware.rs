// Admission - one token per request, keyed on the peer IP

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Error;
use crate::metrics::{ADMITTED_TOTAL, REJECTED_TOTAL, REQUEST_TOTAL};
use crate::models::Message;
use crate::registry::ClientRegistry;

/// Host portion of the connection's peer address.
///
/// Needs the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn client_identity(req: &Request) -> Result<String, Error> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .ok_or(Error::MissingClientAddress)
}

pub async fn rate_limit(
    State(registry): State<Arc<ClientRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let ip = match client_identity(&req) {
        Ok(ip) => ip,
        Err(e) => {
            warn!(error = %e, uri = %req.uri(), "rejecting request");
            return e.into_response();
        }
    };

    // guard is released inside admit, before the handler runs
    if !registry.admit(&ip, Instant::now()) {
        REJECTED_TOTAL.inc();
        debug!(client = %ip, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, Json(Message::at_capacity())).into_response();
    }

    ADMITTED_TOTAL.inc();
    next.run(req).await
}
