use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::LimiterConfig;
use crate::metrics::TRACKED_CLIENTS;
use crate::rate_limit::ClientState;

/// Per-client throttling state keyed by client identity.
///
/// Every operation on a key runs while holding that key's shard lock, so a
/// client's check-and-consume can't interleave with another request from the
/// same client or with a sweep. Guards never outlive the call that made them.
pub struct ClientRegistry {
    clients: DashMap<String, ClientState>,
    burst: u32,
    refill_per_sec: f64,
}

impl ClientRegistry {
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            clients: DashMap::new(),
            burst: config.burst(),
            refill_per_sec: config.refill_per_sec(),
        }
    }

    /// Existing state for `identity`, or a fresh full bucket inserted atomically.
    ///
    /// The returned guard holds the key's shard lock: calling any other
    /// registry method on the same shard before dropping it deadlocks.
    pub(crate) fn resolve(&self, identity: &str, now: Instant) -> RefMut<'_, String, ClientState> {
        // get_mut first so the common path doesn't allocate a key
        if let Some(entry) = self.clients.get_mut(identity) {
            return entry;
        }

        match self.clients.entry(identity.to_string()) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => {
                TRACKED_CLIENTS.inc();
                entry.insert(ClientState::new(self.burst, self.refill_per_sec, now))
            }
        }
    }

    // Refresh last-seen; false if the client isn't tracked
    pub fn touch(&self, identity: &str, now: Instant) -> bool {
        match self.clients.get_mut(identity) {
            Some(mut state) => {
                state.touch(now);
                true
            }
            None => false,
        }
    }

    /// Resolve, touch and take a token under one guard. Rejected requests
    /// still count as activity.
    pub fn admit(&self, identity: &str, now: Instant) -> bool {
        let mut state = self.resolve(identity, now);
        state.touch(now);
        state.bucket.allow(now)
    }

    /// Drops every client idle for longer than `idle_threshold`. Returns how
    /// many were removed.
    pub fn sweep(&self, now: Instant, idle_threshold: Duration) -> usize {
        // counted inside retain, inserts racing the sweep don't offset it
        let mut removed = 0;
        self.clients.retain(|_, state| {
            let idle = state.is_idle(now, idle_threshold);
            if idle {
                removed += 1;
            }
            !idle
        });

        if removed > 0 {
            TRACKED_CLIENTS.sub(removed as f64);
            debug!(removed, remaining = self.clients.len(), "swept idle clients");
        }
        removed
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.clients.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
