mod metrics;
mod ping;

pub use metrics::metrics_handler;
pub use ping::ping_handler;
