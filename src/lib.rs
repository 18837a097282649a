#![deny(unsafe_code)]

//! A UDP datagram replicator: receives datagrams on one IPv4 or IPv6
//! source endpoint — unicast or multicast — and forwards each one
//! unchanged to a configured set of IPv4 and/or IPv6 destination
//! endpoints.
//!
//! The binary entry point is `replicastd`; this library exposes the pieces
//! it's built from so they can be tested and reused independently:
//! presentation-format endpoint parsing ([`endpoint`]), interface name
//! resolution ([`interfaces`]), validated run parameters ([`params`]), the
//! socket factory ([`socket`]), the forwarding engine ([`engine`]), the
//! signals service ([`signals`]), and command-line decoding ([`cli`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use replicast::cli::ProgramOptions;
//! use replicast::dispatcher;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() {
//!     let opts = ProgramOptions::parse();
//!     let params = match dispatcher::validate(&opts) {
//!         Ok(params) => params,
//!         Err(code) => std::process::exit(code),
//!     };
//!     std::process::exit(dispatcher::run(params).await);
//! }
//! ```

pub mod cli;
pub mod counters;
pub mod daemonize;
pub mod dispatcher;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod params;
pub mod signals;
pub mod socket;

pub use counters::PacketCounters;
pub use engine::Engine;
pub use error::{CsvParseError, EngineError, OptionError, ParseError};
pub use params::{Mode, ProgramParameters};
