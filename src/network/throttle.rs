//! Per-connection message throttle.
//!
//! Token bucket: the bucket refills at `rate` tokens per second up to
//! `burst`, and each message costs one token. A connection that runs dry is
//! flooding and gets disconnected by its connection task.

use std::time::Instant;

/// Token-bucket throttle for one connection's inbound messages.
pub struct Throttle {
    allowance: f64,
    last: Instant,
    rate: f64,
    burst: f64,
}

impl Throttle {
    /// Create a throttle admitting `rate` messages per second with a burst
    /// capacity of `burst`.
    pub fn new(rate: f64, burst: f64) -> Self {
        Self {
            allowance: burst,
            last: Instant::now(),
            rate,
            burst,
        }
    }

    /// Admit or reject one message.
    pub fn admit(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;

        self.allowance = (self.allowance + elapsed * self.rate).min(self.burst);
        if self.allowance >= 1.0 {
            self.allowance -= 1.0;
            true
        } else {
            false
        }
    }
}
