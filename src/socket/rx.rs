use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, SocketAddrV6};
use tokio::net::UdpSocket;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::error::EngineError;
use crate::params::{V4ReceiveParams, V6ReceiveParams};

/// Opens the IPv4 receive socket: binds to `params.addr:params.port` and,
/// if `addr` is a multicast group, joins it on `params.iface`.
///
/// Corresponds to `open_inet_rx_mc_sock` in the original C implementation.
/// Unlike a general-purpose server's "bind the wildcard address, let the
/// kernel route", this binds directly to the configured address, the same
/// way the original C program does — which lets the same host run more
/// than one listener on the same port for different groups.
pub fn open_v4_rx(params: &V4ReceiveParams) -> Result<UdpSocket, EngineError> {
    let raw = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| EngineError::os("create IPv4 receive socket", e))?;
    raw.set_reuse_address(true)
        .map_err(|e| EngineError::os("SO_REUSEADDR on IPv4 receive socket", e))?;

    let bind_addr = SocketAddr::from((params.addr, params.port));
    raw.bind(&bind_addr.into())
        .map_err(|e| EngineError::os("bind IPv4 receive socket", e))?;
    raw.set_nonblocking(true)
        .map_err(|e| EngineError::os("set IPv4 receive socket nonblocking", e))?;

    let socket =
        UdpSocket::from_std(raw.into()).map_err(|e| EngineError::os("adopt IPv4 receive socket into tokio", e))?;

    if params.is_multicast() {
        socket
            .join_multicast_v4(params.addr, params.iface)
            .map_err(|e| EngineError::os("join IPv4 multicast group", e))?;
        #[cfg(feature = "tracing")]
        debug!(group = %params.addr, iface = %params.iface, "joined IPv4 multicast group");
    }

    #[cfg(feature = "tracing")]
    info!(addr = %bind_addr, "IPv4 receive socket open");

    Ok(socket)
}

/// Opens the IPv6 receive socket: binds to `[params.addr]:params.port` and,
/// if `addr` is a multicast group, joins it on `params.iface_index`.
///
/// Corresponds to `open_inet6_rx_mc_sock` in the original C implementation.
pub fn open_v6_rx(params: &V6ReceiveParams) -> Result<UdpSocket, EngineError> {
    let raw = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| EngineError::os("create IPv6 receive socket", e))?;
    raw.set_reuse_address(true)
        .map_err(|e| EngineError::os("SO_REUSEADDR on IPv6 receive socket", e))?;
    raw.set_only_v6(true)
        .map_err(|e| EngineError::os("IPV6_V6ONLY on IPv6 receive socket", e))?;

    let scope_id = if is_link_local(&params.addr) { params.iface_index } else { 0 };
    let bind_addr: SocketAddr = SocketAddrV6::new(params.addr, params.port, 0, scope_id).into();
    raw.bind(&bind_addr.into())
        .map_err(|e| EngineError::os("bind IPv6 receive socket", e))?;
    raw.set_nonblocking(true)
        .map_err(|e| EngineError::os("set IPv6 receive socket nonblocking", e))?;

    let socket =
        UdpSocket::from_std(raw.into()).map_err(|e| EngineError::os("adopt IPv6 receive socket into tokio", e))?;

    if params.is_multicast() {
        socket
            .join_multicast_v6(&params.addr, params.iface_index)
            .map_err(|e| EngineError::os("join IPv6 multicast group", e))?;
        #[cfg(feature = "tracing")]
        debug!(group = %params.addr, iface_index = params.iface_index, "joined IPv6 multicast group");
    }

    #[cfg(feature = "tracing")]
    info!(addr = %bind_addr, "IPv6 receive socket open");

    Ok(socket)
}

/// True for link-local unicast (`fe80::/10`) or link-local-scoped multicast
/// (`ff02::/16`) addresses — the two cases where the kernel requires a
/// nonzero scope id on the bind sockaddr to disambiguate which interface the
/// address belongs to. Without it, binding a link-local address on Linux
/// fails with `EINVAL`/`EADDRNOTAVAIL`.
fn is_link_local(addr: &std::net::Ipv6Addr) -> bool {
    let seg = addr.segments();
    let is_unicast_link_local = (seg[0] & 0xffc0) == 0xfe80;
    let is_multicast_link_local_scope = (seg[0] & 0xff00) == 0xff00 && (seg[0] & 0x000f) == 0x0002;
    is_unicast_link_local || is_multicast_link_local_scope
}
