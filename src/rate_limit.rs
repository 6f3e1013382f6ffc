use tokio::time::Instant;

// Token bucket - burst capacity plus a continuous refill rate
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    // Starts full
    pub(crate) fn new(capacity: u32, refill_per_sec: f64, now: Instant) -> Self {
        let capacity = f64::from(capacity);
        Self {
            capacity,
            refill_per_sec,
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Refills for the time elapsed since the last check, then takes one token
    /// if a whole one is available. A rejected check only refills.
    pub fn allow(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return true;
        }

        false
    }

    // Tokens available right now, without consuming any
    pub fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn refill(&mut self, now: Instant) {
        // a clock reading older than the last refill adds nothing
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }
}

// Client state - one per caller identity
#[derive(Debug, Clone)]
pub struct ClientState {
    pub bucket: TokenBucket,
    pub last_seen: Instant,
}

impl ClientState {
    pub(crate) fn new(capacity: u32, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            bucket: TokenBucket::new(capacity, refill_per_sec, now),
            last_seen: now,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    // Idle strictly longer than the threshold
    pub fn is_idle(&self, now: Instant, idle_threshold: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > idle_threshold
    }
}
