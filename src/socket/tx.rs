use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use tokio::net::UdpSocket;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::error::EngineError;
use crate::params::{V4TransmitParams, V6TransmitParams};

/// Opens the IPv4 transmit socket: an unbound (ephemeral source port)
/// datagram socket configured with the multicast TTL, loopback, and
/// outgoing-interface options requested for the destination set.
///
/// Corresponds to `open_inet_tx_mc_sock` in the original C implementation.
/// The options are applied unconditionally, including when every
/// destination is unicast — a TTL/loopback/outif setting with no multicast
/// destination is simply inert, not an error, matching the original C program. They're
/// set on the `socket2::Socket` before handing it to Tokio: `set_multicast_if_v4`
/// has no equivalent on `tokio::net::UdpSocket`.
pub fn open_v4_tx(params: &V4TransmitParams) -> Result<UdpSocket, EngineError> {
    let raw = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| EngineError::os("create IPv4 transmit socket", e))?;

    let any: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0).into();
    raw.bind(&any.into())
        .map_err(|e| EngineError::os("bind IPv4 transmit socket", e))?;

    if params.ttl != 0 {
        raw.set_multicast_ttl_v4(params.ttl as u32)
            .map_err(|e| EngineError::os("set IPv4 multicast TTL", e))?;
    }
    raw.set_multicast_loop_v4(params.loopback)
        .map_err(|e| EngineError::os("set IPv4 multicast loopback", e))?;
    if !params.out_iface.is_unspecified() {
        raw.set_multicast_if_v4(&params.out_iface)
            .map_err(|e| EngineError::os("set IPv4 multicast output interface", e))?;
    }

    raw.set_nonblocking(true)
        .map_err(|e| EngineError::os("set IPv4 transmit socket nonblocking", e))?;
    let socket =
        UdpSocket::from_std(raw.into()).map_err(|e| EngineError::os("adopt IPv4 transmit socket into tokio", e))?;

    #[cfg(feature = "tracing")]
    info!(
        destinations = params.destinations.len(),
        ttl = params.ttl,
        loopback = params.loopback,
        "IPv4 transmit socket open"
    );

    Ok(socket)
}

/// Opens the IPv6 transmit socket. Corresponds to `open_inet6_tx_mc_sock`.
pub fn open_v6_tx(params: &V6TransmitParams) -> Result<UdpSocket, EngineError> {
    let raw = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| EngineError::os("create IPv6 transmit socket", e))?;

    let any: SocketAddr = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0).into();
    raw.bind(&any.into())
        .map_err(|e| EngineError::os("bind IPv6 transmit socket", e))?;

    if params.hops != 0 {
        raw.set_multicast_hops_v6(params.hops as u32)
            .map_err(|e| EngineError::os("set IPv6 multicast hop limit", e))?;
    }
    raw.set_multicast_loop_v6(params.loopback)
        .map_err(|e| EngineError::os("set IPv6 multicast loopback", e))?;
    if params.out_iface_index != 0 {
        raw.set_multicast_if_v6(params.out_iface_index)
            .map_err(|e| EngineError::os("set IPv6 multicast output interface", e))?;
    }

    raw.set_nonblocking(true)
        .map_err(|e| EngineError::os("set IPv6 transmit socket nonblocking", e))?;
    let socket =
        UdpSocket::from_std(raw.into()).map_err(|e| EngineError::os("adopt IPv6 transmit socket into tokio", e))?;

    #[cfg(feature = "tracing")]
    info!(
        destinations = params.destinations.len(),
        hops = params.hops,
        loopback = params.loopback,
        "IPv6 transmit socket open"
    );

    Ok(socket)
}
