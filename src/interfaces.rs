#![allow(unsafe_code)]

//! Resolution of interface names to the addresses/indices the socket layer
//! needs.
//!
//! Narrowed to the two lookups the wire-format parser actually needs:
//! "what's this interface's first IPv4 address" and "what's this
//! interface's numeric index". Both queries silently tolerate interfaces
//! with no matching address family; callers decide whether that's an error.

use std::net::Ipv4Addr;

use getifaddrs::{Address, getifaddrs};

use crate::error::ParseError;

/// Resolves `name` to its first configured IPv4 address.
///
/// Returns `ParseError::BadIfAddr` if the interface does not exist or has no
/// IPv4 address attached — an interface name with no v4 address is a hard
/// error for the v4 parser (unlike the v6 by-index lookup, which tolerates
/// an unknown name).
pub fn v4_addr_by_name(name: &str) -> Result<Ipv4Addr, ParseError> {
    let entries = getifaddrs().map_err(|_| ParseError::BadIfAddr(name.to_string()))?;

    for entry in entries {
        if entry.name == name {
            if let Address::V4(v4) = entry.address {
                return Ok(v4.address);
            }
        }
    }

    Err(ParseError::BadIfAddr(name.to_string()))
}

/// Resolves `name` to its kernel interface index, or `0` ("unspecified") if
/// the name is unknown.
///
/// An unknown interface name is *not* a parse error for IPv6 — it degrades
/// to "any interface".
pub fn v6_index_by_name(name: &str) -> u32 {
    std::ffi::CString::new(name)
        .ok()
        .and_then(|c_name| {
            // SAFETY: `if_nametoindex` reads the name and returns 0 when it
            // does not identify an interface; the pointer is valid for the
            // duration of the call.
            let idx = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
            (idx != 0).then_some(idx)
        })
        .unwrap_or(0)
}

/// Resolves a kernel interface index back to its name, for diagnostics and
/// round-trip formatting of parsed endpoints. Returns `None` for index `0`
/// ("any") or an index the kernel no longer recognises.
pub fn name_by_v6_index(index: u32) -> Option<String> {
    if index == 0 {
        return None;
    }

    let mut buf = [0u8; libc::IF_NAMESIZE];
    // SAFETY: `buf` is `IF_NAMESIZE` bytes as the API requires; the kernel
    // writes a NUL-terminated name into it or returns a null pointer.
    let ptr = unsafe { libc::if_indextoname(index, buf.as_mut_ptr() as *mut libc::c_char) };
    if ptr.is_null() {
        return None;
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..len]).ok().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_has_an_ipv4_address() {
        let addr = v4_addr_by_name("lo").expect("lo should exist and carry an IPv4 address");
        assert!(addr.is_loopback());
    }

    #[test]
    fn unknown_v4_name_is_bad_if_addr() {
        let err = v4_addr_by_name("definitely-not-a-real-iface0");
        assert!(matches!(err, Err(ParseError::BadIfAddr(_))));
    }

    #[test]
    fn unknown_v6_name_resolves_to_zero() {
        assert_eq!(v6_index_by_name("definitely-not-a-real-iface0"), 0);
    }

    #[test]
    fn loopback_v6_index_is_nonzero() {
        // "lo" on Linux, "lo0" on macOS/BSD.
        let idx = v6_index_by_name("lo");
        let idx = if idx == 0 { v6_index_by_name("lo0") } else { idx };
        assert_ne!(idx, 0);
    }
}
