//! Validated program parameters: the product of decoding the CLI and
//! checking it against the cross-flag validation rules (exactly one source
//! family, at least one destination family, in-range TTL/hop-limit and
//! output-interface options).
//!
//! [`ProgramParameters::from_options`] is the single place those rules are
//! enforced; everything downstream (the socket factory, the engine) can
//! assume a [`ProgramParameters`] value is internally consistent.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use crate::endpoint::{self, V4Endpoint, V6Endpoint};
use crate::error::OptionError;
use crate::interfaces;

/// Maximum legal multicast TTL/hop limit; mirrors `IP_MAX_TTL`/`IPV6_MAX_HOPS`.
const MAX_TTL_OR_HOPS: u32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V4ReceiveParams {
    pub addr: Ipv4Addr,
    pub iface: Ipv4Addr,
    pub port: u16,
}

impl V4ReceiveParams {
    pub fn is_multicast(&self) -> bool {
        self.addr.is_multicast()
    }
}

impl From<V4Endpoint> for V4ReceiveParams {
    fn from(ep: V4Endpoint) -> Self {
        V4ReceiveParams {
            addr: ep.addr,
            iface: ep.iface,
            port: ep.port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V6ReceiveParams {
    pub addr: Ipv6Addr,
    pub iface_index: u32,
    pub port: u16,
}

impl V6ReceiveParams {
    pub fn is_multicast(&self) -> bool {
        self.addr.is_multicast()
    }
}

impl From<V6Endpoint> for V6ReceiveParams {
    fn from(ep: V6Endpoint) -> Self {
        V6ReceiveParams {
            addr: ep.addr,
            iface_index: ep.iface_index,
            port: ep.port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct V4TransmitParams {
    pub destinations: Vec<SocketAddrV4>,
    pub ttl: u8,
    pub loopback: bool,
    pub out_iface: Ipv4Addr,
}

impl V4TransmitParams {
    pub fn has_multicast_destination(&self) -> bool {
        self.destinations.iter().any(|d| d.ip().is_multicast())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct V6TransmitParams {
    pub destinations: Vec<SocketAddrV6>,
    pub hops: u8,
    pub loopback: bool,
    pub out_iface_index: u32,
}

impl V6TransmitParams {
    pub fn has_multicast_destination(&self) -> bool {
        self.destinations.iter().any(|d| d.ip().is_multicast())
    }
}

/// Which of the six forwarding shapes this run was configured for.
///
/// Determined entirely by which of `-4in`/`-6in` was given and which of
/// `-4out`/`-6out` were given; there is no seventh "neither" or eighth
/// "both inputs" shape — those are rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    V4ToV4,
    V4ToV6,
    V4ToBoth,
    V6ToV4,
    V6ToV6,
    V6ToBoth,
}

impl Mode {
    fn resolve(have_v4_in: bool, have_v4_out: bool, have_v6_out: bool) -> Self {
        match (have_v4_in, have_v4_out, have_v6_out) {
            (true, true, false) => Mode::V4ToV4,
            (true, false, true) => Mode::V4ToV6,
            (true, true, true) => Mode::V4ToBoth,
            (false, true, false) => Mode::V6ToV4,
            (false, false, true) => Mode::V6ToV6,
            (false, true, true) => Mode::V6ToBoth,
            // Both unreachable once the caller has enforced "exactly one
            // source family" and "at least one destination family" first.
            (true, false, false) | (false, false, false) => unreachable!(
                "Mode::resolve called with a combination ProgramParameters::from_options should have already rejected"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramParameters {
    pub mode: Mode,
    pub v4_rx: Option<V4ReceiveParams>,
    pub v6_rx: Option<V6ReceiveParams>,
    pub v4_tx: Option<V4TransmitParams>,
    pub v6_tx: Option<V6TransmitParams>,
    pub daemonize: bool,
    pub loglevel: String,
}

impl ProgramParameters {
    /// Validates and assembles a [`ProgramParameters`] from raw CLI input.
    ///
    /// Enforces, in order: exactly one source family is given
    /// ([`OptionError::NoSrcAddr`]/[`OptionError::MultiSrcAddrs`]), the
    /// source port is nonzero ([`OptionError::ZeroSrcPort`]), at least one
    /// destination family is given ([`OptionError::NoDstAddrs`]), and the
    /// TTL/hop-limit and output-interface options for each destination
    /// family given are in range.
    pub fn from_options(opts: &crate::cli::ProgramOptions) -> Result<Self, OptionError> {
        let have_v4_in = opts.v4_in.is_some();
        let have_v6_in = opts.v6_in.is_some();

        match (have_v4_in, have_v6_in) {
            (false, false) => return Err(OptionError::NoSrcAddr),
            (true, true) => return Err(OptionError::MultiSrcAddrs),
            _ => {}
        }

        let have_v4_out = opts.v4_out.is_some();
        let have_v6_out = opts.v6_out.is_some();
        if !have_v4_out && !have_v6_out {
            return Err(OptionError::NoDstAddrs);
        }

        let v4_rx = match &opts.v4_in {
            Some(raw) => {
                let ep = endpoint::parse_v4_endpoint(raw)?;
                if ep.port == 0 {
                    return Err(OptionError::ZeroSrcPort);
                }
                Some(V4ReceiveParams::from(ep))
            }
            None => None,
        };

        let v6_rx = match &opts.v6_in {
            Some(raw) => {
                let ep = endpoint::parse_v6_endpoint(raw)?;
                if ep.port == 0 {
                    return Err(OptionError::ZeroSrcPort);
                }
                Some(V6ReceiveParams::from(ep))
            }
            None => None,
        };

        let v4_tx = match &opts.v4_out {
            Some(raw) => Some(build_v4_tx(raw, opts)?),
            None => None,
        };

        let v6_tx = match &opts.v6_out {
            Some(raw) => Some(build_v6_tx(raw, opts)?),
            None => None,
        };

        let mode = Mode::resolve(have_v4_in, have_v4_out, have_v6_out);

        Ok(ProgramParameters {
            mode,
            v4_rx,
            v6_rx,
            v4_tx,
            v6_tx,
            daemonize: !opts.nodaemon,
            loglevel: opts.loglevel.clone(),
        })
    }
}

fn build_v4_tx(raw: &str, opts: &crate::cli::ProgramOptions) -> Result<V4TransmitParams, OptionError> {
    let endpoints = endpoint::parse_csv_v4(raw, 0, false)?;
    let destinations = endpoints
        .into_iter()
        .map(|ep| SocketAddrV4::new(ep.addr, ep.port))
        .collect();

    let ttl = match opts.v4_mcttl {
        Some(v) if v > MAX_TTL_OR_HOPS => return Err(OptionError::TxTtlRange(v)),
        Some(v) => v as u8,
        None => 0,
    };

    let out_iface = match &opts.v4_mcoutif {
        Some(name) => name
            .parse::<Ipv4Addr>()
            .or_else(|_| interfaces::v4_addr_by_name(name))
            .map_err(|_| OptionError::OutIntf(name.clone()))?,
        None => Ipv4Addr::UNSPECIFIED,
    };

    Ok(V4TransmitParams {
        destinations,
        ttl,
        loopback: opts.v4_mcloop,
        out_iface,
    })
}

fn build_v6_tx(raw: &str, opts: &crate::cli::ProgramOptions) -> Result<V6TransmitParams, OptionError> {
    let endpoints = endpoint::parse_csv_v6(raw, 0, false)?;
    let destinations = endpoints
        .into_iter()
        .map(|ep| SocketAddrV6::new(ep.addr, ep.port, 0, ep.iface_index))
        .collect();

    let hops = match opts.v6_mchops {
        Some(v) if v > MAX_TTL_OR_HOPS => return Err(OptionError::TxHopsRange(v)),
        Some(v) => v as u8,
        None => 0,
    };

    let out_iface_index = match &opts.v6_mcoutif {
        Some(name) => {
            let idx = interfaces::v6_index_by_name(name);
            if idx == 0 {
                return Err(OptionError::OutIntf(name.clone()));
            }
            idx
        }
        None => 0,
    };

    Ok(V6TransmitParams {
        destinations,
        hops,
        loopback: opts.v6_mcloop,
        out_iface_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProgramOptions;
    use clap::Parser;

    fn opts(args: &[&str]) -> ProgramOptions {
        let mut argv = vec!["replicastd".to_string()];
        argv.extend(args.iter().map(|s| s.to_string()));
        ProgramOptions::parse_from(argv)
    }

    #[test]
    fn rejects_no_source() {
        let o = opts(&["--4out", "10.0.0.1:80"]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::NoSrcAddr)
        ));
    }

    #[test]
    fn rejects_two_sources() {
        let o = opts(&[
            "--4in",
            "224.5.5.5:1234",
            "--6in",
            "[ff05::30]:1234",
            "--4out",
            "10.0.0.1:80",
        ]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::MultiSrcAddrs)
        ));
    }

    #[test]
    fn rejects_no_destination() {
        let o = opts(&["--4in", "224.5.5.5:1234"]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::NoDstAddrs)
        ));
    }

    #[test]
    fn rejects_zero_source_port() {
        let o = opts(&["--4in", "224.5.5.5", "--4out", "10.0.0.1:80"]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::ZeroSrcPort)
        ));
    }

    #[test]
    fn rejects_ttl_out_of_range() {
        let o = opts(&[
            "--4in",
            "224.5.5.5:1234",
            "--4out",
            "239.1.1.1:80",
            "--4mcttl",
            "999",
        ]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::TxTtlRange(999))
        ));
    }

    #[test]
    fn v4_to_both_mode_is_detected() {
        let o = opts(&[
            "--4in",
            "224.5.5.5:1234",
            "--4out",
            "10.0.0.1:80",
            "--6out",
            "[ff05::30]:1234",
        ]);
        let params = ProgramParameters::from_options(&o).unwrap();
        assert_eq!(params.mode, Mode::V4ToBoth);
        assert!(params.v4_tx.unwrap().destinations.len() == 1);
        assert!(params.v6_tx.unwrap().destinations.len() == 1);
    }

    #[test]
    fn unknown_output_interface_is_out_intf_error() {
        let o = opts(&[
            "--4in",
            "224.5.5.5:1234",
            "--4out",
            "239.1.1.1:80",
            "--4mcoutif",
            "not-a-real-iface0",
        ]);
        assert!(matches!(
            ProgramParameters::from_options(&o),
            Err(OptionError::OutIntf(_))
        ));
    }

    #[test]
    fn nodaemon_flag_disables_daemonizing() {
        let o = opts(&[
            "--4in",
            "224.5.5.5:1234",
            "--4out",
            "10.0.0.1:80",
            "--nodaemon",
        ]);
        let params = ProgramParameters::from_options(&o).unwrap();
        assert!(!params.daemonize);
    }
}
