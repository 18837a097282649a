//! Packet counters exposed to the outside world via SIGUSR1/SIGUSR2.
//!
//! The original C implementation increments four plain `uint64_t` globals
//! from the receive loop and reads them from a signal handler, documenting
//! the resulting torn reads as acceptable. `AtomicU64` with
//! [`Ordering::Relaxed`] gives the same lock-free, no-synchronization-point
//! behaviour — increments and reads never block the forwarding path — while
//! upgrading "torn read of a multi-word value" to "stale but whole read",
//! which is strictly better than what the original promises.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PacketCounters {
    v4_in: AtomicU64,
    v6_in: AtomicU64,
    v4_out: AtomicU64,
    v6_out: AtomicU64,
}

impl PacketCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_v4_in(&self) {
        self.v4_in.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_v6_in(&self) {
        self.v6_in.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_v4_out(&self) {
        self.v4_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_v6_out(&self) {
        self.v6_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_v4_out(&self, n: u64) {
        self.v4_out.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_v6_out(&self, n: u64) {
        self.v6_out.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            v4_in: self.v4_in.load(Ordering::Relaxed),
            v6_in: self.v6_in.load(Ordering::Relaxed),
            v4_out: self.v4_out.load(Ordering::Relaxed),
            v6_out: self.v6_out.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of all four counters, for logging on SIGUSR1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub v4_in: u64,
    pub v6_in: u64,
    pub v4_out: u64,
    pub v6_out: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let c = PacketCounters::new();
        let s = c.snapshot();
        assert_eq!(s.v4_in, 0);
        assert_eq!(s.v6_out, 0);
    }

    #[test]
    fn increments_are_independent_per_field() {
        let c = PacketCounters::new();
        c.incr_v4_in();
        c.incr_v4_in();
        c.incr_v6_out();
        let s = c.snapshot();
        assert_eq!(s.v4_in, 2);
        assert_eq!(s.v6_in, 0);
        assert_eq!(s.v6_out, 1);
    }

    #[test]
    fn add_accumulates_fanout_counts() {
        let c = PacketCounters::new();
        c.add_v4_out(3);
        c.add_v6_out(2);
        let s = c.snapshot();
        assert_eq!(s.v4_out, 3);
        assert_eq!(s.v6_out, 2);
    }
}
