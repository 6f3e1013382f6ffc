use clap::Parser;
use std::time::Duration;

use crate::error::Error;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "ping-gate")]
#[command(about = "Per-client rate limiting in front of the /ping endpoint")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 9000)]
    pub port: u16,

    // Burst size - tokens a new client starts with
    #[arg(long, default_value_t = 4)]
    pub burst: u32,

    // Tokens added back per second
    #[arg(long, default_value_t = 2.0)]
    pub refill_rate: f64,

    // Seconds a client may stay silent before its state is dropped
    #[arg(long, default_value_t = 180)]
    pub idle_threshold: u64,

    // Seconds between idle sweeps
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,

    // Also serve Prometheus metrics on /metrics
    #[arg(long)]
    pub expose_metrics: bool,
}

impl Args {
    pub fn limiter_config(&self) -> Result<LimiterConfig, Error> {
        LimiterConfig::new(
            self.burst,
            self.refill_rate,
            Duration::from_secs(self.idle_threshold),
            Duration::from_secs(self.sweep_interval),
        )
    }
}

/// Admission and reclamation parameters shared by the registry and the
/// reclamation loop. Only obtainable validated, via [`LimiterConfig::new`]
/// or `Default`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterConfig {
    burst: u32,
    refill_per_sec: f64,
    idle_threshold: Duration,
    sweep_interval: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            burst: 4,
            refill_per_sec: 2.0,
            idle_threshold: Duration::from_secs(180),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl LimiterConfig {
    pub fn new(
        burst: u32,
        refill_per_sec: f64,
        idle_threshold: Duration,
        sweep_interval: Duration,
    ) -> Result<Self, Error> {
        Self {
            burst,
            refill_per_sec,
            idle_threshold,
            sweep_interval,
        }
        .validate()
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    pub fn refill_per_sec(&self) -> f64 {
        self.refill_per_sec
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    fn validate(self) -> Result<Self, Error> {
        if self.burst == 0 {
            return Err(Error::InvalidConfig("burst must be at least 1".to_string()));
        }
        if !self.refill_per_sec.is_finite() || self.refill_per_sec <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "refill rate must be a positive number, got {}",
                self.refill_per_sec
            )));
        }
        if self.idle_threshold.is_zero() {
            return Err(Error::InvalidConfig("idle threshold must be non-zero".to_string()));
        }
        // tokio::time::interval panics on a zero period
        if self.sweep_interval.is_zero() {
            return Err(Error::InvalidConfig("sweep interval must be non-zero".to_string()));
        }
        Ok(self)
    }
}
