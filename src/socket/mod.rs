//! The socket factory (component C2): turns validated [`crate::params`]
//! values into bound, configured [`tokio::net::UdpSocket`]s.
//!
//! Same `socket2::Socket` construction, reuse-address, and
//! blocking-to-async handoff via `set_nonblocking` + `UdpSocket::from_std`
//! used throughout this crate, narrowed to exactly four shapes: one
//! receive socket and one transmit socket per address family, rather than
//! a set of listeners per bind address.

mod rx;
mod tx;

pub use rx::{open_v4_rx, open_v6_rx};
pub use tx::{open_v4_tx, open_v6_tx};
