use std::fmt;
use std::net::Ipv4Addr;

use crate::error::ParseError;
use crate::interfaces;

/// A parsed `<addr>[%iface]:port` IPv4 endpoint.
///
/// `iface` is [`Ipv4Addr::UNSPECIFIED`] when no `%iface` part was given —
/// the original C implementation's "missing interface part" and "explicit
/// 0.0.0.0" are indistinguishable on the wire, and this type preserves that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V4Endpoint {
    pub addr: Ipv4Addr,
    pub iface: Ipv4Addr,
    pub port: u16,
}

impl fmt::Display for V4Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.iface.is_unspecified() {
            write!(f, "{}:{}", self.addr, self.port)
        } else {
            write!(f, "{}%{}:{}", self.addr, self.iface, self.port)
        }
    }
}

/// Parses a single IPv4 presentation endpoint: `addr[%iface]:port`.
///
/// Mirrors `aip_ptoh_inet`/`inetaddr.c`'s `aip_ptoh_inet` exactly, including
/// its "last colon" rule: once an `%iface` part is split off, the port
/// separator is searched only within the `iface:port` remainder, never
/// across the address. A region with no `:` at all does not fail — the port
/// defaults to `0` (rejected later by receive-side validation, not here);
/// this is the original C implementation's documented behaviour, not an
/// omission.
pub fn parse_v4_endpoint(input: &str) -> Result<V4Endpoint, ParseError> {
    let (addr_part, iface_and_port) = match input.split_once('%') {
        Some((addr, rest)) => (addr, Some(rest)),
        None => (input, None),
    };

    let colon_region = iface_and_port.unwrap_or(addr_part);
    let (region_head, port_str) = match colon_region.rfind(':') {
        Some(pos) => (&colon_region[..pos], Some(&colon_region[pos + 1..])),
        None => (colon_region, None),
    };

    let (addr_str, iface_str) = if iface_and_port.is_some() {
        (addr_part, Some(region_head))
    } else {
        (region_head, None)
    };

    let addr: Ipv4Addr = addr_str
        .parse()
        .map_err(|_| ParseError::BadAddr(input.to_string()))?;

    let iface = match iface_str {
        None => Ipv4Addr::UNSPECIFIED,
        Some(s) if s.is_empty() => return Err(ParseError::BadIfAddr(input.to_string())),
        Some(s) => s
            .parse::<Ipv4Addr>()
            .or_else(|_| interfaces::v4_addr_by_name(s))
            .map_err(|_| ParseError::BadIfAddr(s.to_string()))?,
    };

    let port = match port_str {
        None => 0,
        Some(p) => p
            .parse::<u32>()
            .ok()
            .filter(|&v| v <= u16::from(u16::MAX) as u32)
            .ok_or_else(|| ParseError::BadPort(p.to_string()))? as u16,
    };

    Ok(V4Endpoint { addr, iface, port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_endpoint() {
        let ep = parse_v4_endpoint("224.5.5.5:1234").unwrap();
        assert_eq!(ep.addr, Ipv4Addr::new(224, 5, 5, 5));
        assert!(ep.iface.is_unspecified());
        assert_eq!(ep.port, 1234);
    }

    #[test]
    fn endpoint_with_literal_interface_address() {
        let ep = parse_v4_endpoint("224.5.5.5%127.0.0.1:1234").unwrap();
        assert_eq!(ep.iface, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(ep.port, 1234);
    }

    #[test]
    fn endpoint_with_interface_name() {
        let ep = parse_v4_endpoint("224.5.5.5%lo:1234").unwrap();
        assert!(ep.iface.is_loopback());
    }

    #[test]
    fn bad_address_is_rejected() {
        assert!(matches!(
            parse_v4_endpoint("not-an-addr:1234"),
            Err(ParseError::BadAddr(_))
        ));
    }

    #[test]
    fn port_over_65535_is_rejected() {
        let err = parse_v4_endpoint("224.6.6.6:70000").unwrap_err();
        assert!(matches!(err, ParseError::BadPort(ref p) if p == "70000"));
    }

    #[test]
    fn unknown_interface_name_is_bad_if_addr() {
        assert!(matches!(
            parse_v4_endpoint("224.5.5.5%not-a-real-iface0:1234"),
            Err(ParseError::BadIfAddr(_))
        ));
    }

    #[test]
    fn missing_colon_defaults_port_to_zero() {
        let ep = parse_v4_endpoint("224.5.5.5").unwrap();
        assert_eq!(ep.port, 0);
    }

    #[test]
    fn round_trip_without_interface() {
        let original = "224.5.5.5:1234";
        let ep = parse_v4_endpoint(original).unwrap();
        assert_eq!(ep.to_string(), original);
    }

    #[test]
    fn round_trip_with_interface() {
        let original = "224.5.5.5%192.168.1.1:1234";
        let ep = parse_v4_endpoint(original).unwrap();
        assert_eq!(ep.to_string(), original);
    }
}
