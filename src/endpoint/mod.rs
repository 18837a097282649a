//! Presentation-format parsing for `<addr>[%iface]:port` (v4) and
//! `[<addr>[%iface]]:port` (v6) endpoints, plus their comma-separated list
//! form.
//!
//! This is the Rust expression of `aip_ptoh.c` / `inetaddr.c` from the
//! original C implementation: same grammar, same last-colon rule for v4, same
//! "unknown v6 interface name is not an error" tolerance — but returning
//! owned `Result` values instead of writing through output pointers.

mod csv;
mod v4;
mod v6;

pub use csv::{parse_csv_v4, parse_csv_v6};
pub use v4::{V4Endpoint, parse_v4_endpoint};
pub use v6::{V6Endpoint, parse_v6_endpoint};
