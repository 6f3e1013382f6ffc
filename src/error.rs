use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum Error {
    /// The connection carried no peer address to key the client on.
    #[error("client address unavailable on request")]
    MissingClientAddress,

    #[error("invalid limiter configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),

    #[error("reclamation task failed: {0}")]
    Reclaim(#[from] JoinError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // callers only ever see a bare status, details stay in the logs
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
