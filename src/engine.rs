//! The forwarding engine (component C3): owns the open sockets and runs the
//! receive-and-fan-out loop for whichever of the six shapes
//! [`crate::params::Mode`] selected.
//!
//! The original C implementation's explicit `Starting -> Opening -> Running
//! -> Stopping` states map onto ordinary Rust control flow: "Opening" is
//! [`Engine::open`] returning a `Result`, "Running" is [`Engine::run`]
//! looping on `tokio::select!`, and "Stopping" is what happens when `run`
//! returns and the `Engine` (and the `UdpSocket`s it owns) drops.

use std::net::{SocketAddrV4, SocketAddrV6};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::counters::PacketCounters;
use crate::error::EngineError;
use crate::params::ProgramParameters;
use crate::signals::Signal;
use crate::socket;

/// Maximum UDP payload this engine will ever see or forward.
const MAX_DATAGRAM: usize = 65535;

/// A bound, running instance of the replicator.
pub struct Engine {
    v4_rx: Option<UdpSocket>,
    v6_rx: Option<UdpSocket>,
    v4_tx: Option<UdpSocket>,
    v4_tx_destinations: Vec<SocketAddrV4>,
    v6_tx: Option<UdpSocket>,
    v6_tx_destinations: Vec<SocketAddrV6>,
    counters: Arc<PacketCounters>,
    /// The startup banner, captured at open time and re-logged on
    /// SIGUSR2 — the "dump parameters" signal.
    banner: String,
}

impl Engine {
    /// Opens every socket `params` calls for. This is the "Opening" state:
    /// on any `EngineError` the caller holds no partially-opened sockets
    /// that need separate cleanup — `Engine` isn't constructed, and
    /// whichever sockets this function did open are dropped with it.
    pub fn open(params: &ProgramParameters, counters: Arc<PacketCounters>) -> Result<Self, EngineError> {
        let v4_rx = params.v4_rx.as_ref().map(socket::open_v4_rx).transpose()?;
        let v6_rx = params.v6_rx.as_ref().map(socket::open_v6_rx).transpose()?;

        let (v4_tx, v4_tx_destinations) = match &params.v4_tx {
            Some(tx) => (Some(socket::open_v4_tx(tx)?), tx.destinations.clone()),
            None => (None, Vec::new()),
        };
        let (v6_tx, v6_tx_destinations) = match &params.v6_tx {
            Some(tx) => (Some(socket::open_v6_tx(tx)?), tx.destinations.clone()),
            None => (None, Vec::new()),
        };

        if v4_tx.is_none() && v6_tx.is_none() {
            return Err(EngineError::NoSockets);
        }

        let banner = format!(
            "mode={:?} v4_in={} v6_in={} v4_out_destinations={} v6_out_destinations={}",
            params.mode,
            params.v4_rx.is_some(),
            params.v6_rx.is_some(),
            v4_tx_destinations.len(),
            v6_tx_destinations.len(),
        );

        Ok(Engine {
            v4_rx,
            v6_rx,
            v4_tx,
            v4_tx_destinations,
            v6_tx,
            v6_tx_destinations,
            counters,
            banner,
        })
    }

    /// Runs the receive loop until `shutdown` yields [`Signal::Terminate`]
    /// or is closed. This is the "Running" state. A SIGUSR1/SIGUSR2 arriving
    /// on `shutdown` is logged and the loop continues — those signals are
    /// handled by the caller inspecting counters, not by the engine itself.
    pub async fn run(&self, mut shutdown: mpsc::Receiver<Signal>) -> Result<(), EngineError> {
        // Allocated once, for the lifetime of the run; a receive never
        // needs more than one datagram's worth of scratch space at a time.
        let mut v4_buf: Box<[u8]> = vec![0u8; MAX_DATAGRAM].into_boxed_slice();
        let mut v6_buf: Box<[u8]> = vec![0u8; MAX_DATAGRAM].into_boxed_slice();

        loop {
            tokio::select! {
                biased;

                signal = shutdown.recv() => {
                    match signal {
                        Some(Signal::Terminate) | None => return Ok(()),
                        Some(Signal::ReportStats) => {
                            #[cfg(feature = "tracing")]
                            {
                                let snap = self.counters.snapshot();
                                tracing::info!(
                                    v4_in = snap.v4_in,
                                    v6_in = snap.v6_in,
                                    v4_out = snap.v4_out,
                                    v6_out = snap.v6_out,
                                    "packet counters"
                                );
                            }
                            continue;
                        }
                        Some(Signal::DumpParams) => {
                            #[cfg(feature = "tracing")]
                            tracing::info!(banner = %self.banner, "parameters");
                            continue;
                        }
                    }
                }

                result = recv_or_pending(self.v4_rx.as_ref(), &mut v4_buf) => {
                    let n = match result {
                        Ok((n, _from)) => n,
                        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
                        Err(e) => {
                            #[cfg(feature = "tracing")]
                            warn!(error = %e, "receive on IPv4 socket failed, continuing");
                            continue;
                        }
                    };
                    if n > 0 {
                        self.counters.incr_v4_in();
                        self.forward(&v4_buf[..n]).await;
                    }
                }

                result = recv_or_pending(self.v6_rx.as_ref(), &mut v6_buf) => {
                    let n = match result {
                        Ok((n, _from)) => n,
                        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
                        Err(e) => {
                            #[cfg(feature = "tracing")]
                            warn!(error = %e, "receive on IPv6 socket failed, continuing");
                            continue;
                        }
                    };
                    if n > 0 {
                        self.counters.incr_v6_in();
                        self.forward(&v6_buf[..n]).await;
                    }
                }
            }
        }
    }

    /// Sends `payload` unchanged to every configured destination, on
    /// whichever transmit socket(s) are open. Per-destination send failures
    /// are logged and skipped — one unreachable destination must not stall
    /// delivery to the rest, nor abort the receive loop.
    async fn forward(&self, payload: &[u8]) {
        if let Some(tx) = &self.v4_tx {
            let mut sent = 0u64;
            for dest in &self.v4_tx_destinations {
                match tx.send_to(payload, std::net::SocketAddr::V4(*dest)).await {
                    Ok(_) => sent += 1,
                    #[cfg(feature = "tracing")]
                    Err(e) => warn!(dest = %dest, error = %e, "IPv4 forward failed"),
                    #[cfg(not(feature = "tracing"))]
                    Err(_) => {}
                }
            }
            self.counters.add_v4_out(sent);
        }

        if let Some(tx) = &self.v6_tx {
            let mut sent = 0u64;
            for dest in &self.v6_tx_destinations {
                match tx.send_to(payload, std::net::SocketAddr::V6(*dest)).await {
                    Ok(_) => sent += 1,
                    #[cfg(feature = "tracing")]
                    Err(e) => warn!(dest = %dest, error = %e, "IPv6 forward failed"),
                    #[cfg(not(feature = "tracing"))]
                    Err(_) => {}
                }
            }
            self.counters.add_v6_out(sent);
        }

        #[cfg(feature = "tracing")]
        debug!(bytes = payload.len(), "forwarded datagram");
    }
}

/// Awaits a `recv_from` on `socket` if present, or never resolves if it's
/// `None` — lets `tokio::select!` treat an unconfigured source family as a
/// branch that simply never fires, instead of special-casing it out of the
/// `select!` at every call site.
async fn recv_or_pending(
    socket: Option<&UdpSocket>,
    buf: &mut [u8],
) -> std::io::Result<(usize, std::net::SocketAddr)> {
    match socket {
        Some(socket) => socket.recv_from(buf).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Mode, V4TransmitParams};
    use std::net::{Ipv4Addr, SocketAddr};
    use std::time::Duration;

    fn blank_params() -> ProgramParameters {
        ProgramParameters {
            mode: Mode::V4ToV4,
            v4_rx: None,
            v6_rx: None,
            v4_tx: None,
            v6_tx: None,
            daemonize: false,
            loglevel: "error".to_string(),
        }
    }

    #[tokio::test]
    async fn open_rejects_a_run_with_no_transmit_socket() {
        let params = blank_params();
        let err = Engine::open(&params, Arc::new(PacketCounters::new())).unwrap_err();
        assert!(matches!(err, EngineError::NoSockets));
    }

    #[tokio::test]
    async fn forward_delivers_the_unchanged_payload_to_every_v4_destination() {
        let observer_a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let observer_b = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr_a = match observer_a.local_addr().unwrap() {
            SocketAddr::V4(a) => a,
            _ => unreachable!(),
        };
        let addr_b = match observer_b.local_addr().unwrap() {
            SocketAddr::V4(a) => a,
            _ => unreachable!(),
        };

        let mut params = blank_params();
        params.v4_tx = Some(V4TransmitParams {
            destinations: vec![addr_a, addr_b],
            ttl: 0,
            loopback: false,
            out_iface: Ipv4Addr::UNSPECIFIED,
        });

        let engine = Engine::open(&params, Arc::new(PacketCounters::new())).unwrap();
        engine.forward(b"replicated payload").await;

        let mut buf = [0u8; 64];
        for observer in [&observer_a, &observer_b] {
            let (n, _) = tokio::time::timeout(Duration::from_secs(1), observer.recv_from(&mut buf))
                .await
                .expect("datagram should arrive within timeout")
                .unwrap();
            assert_eq!(&buf[..n], b"replicated payload");
        }

        assert_eq!(engine.counters.snapshot().v4_out, 2);
    }

    #[tokio::test]
    async fn forward_with_no_destinations_counts_nothing() {
        let mut params = blank_params();
        params.v4_tx = Some(V4TransmitParams {
            destinations: Vec::new(),
            ttl: 0,
            loopback: false,
            out_iface: Ipv4Addr::UNSPECIFIED,
        });

        let engine = Engine::open(&params, Arc::new(PacketCounters::new())).unwrap();
        engine.forward(b"hi").await;

        assert_eq!(engine.counters.snapshot().v4_out, 0);
    }
}
