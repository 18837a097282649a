//! The signals service (component C4): turns POSIX signals into messages on
//! an `mpsc` channel the engine's `tokio::select!` loop can await alongside
//! socket I/O.
//!
//! The original C implementation installs a `sigaction` handler that sets a
//! `volatile sig_atomic_t` flag, checked between `recvfrom` calls. A channel
//! fed by `tokio::signal::unix::signal` listener tasks is the async-Rust
//! equivalent: no flag to poll, no restrictions on what the handler may
//! safely touch, and the receive loop can `select!` on it directly instead
//! of checking a flag on every iteration.

use tokio::sync::mpsc;

#[cfg(feature = "tracing")]
use tracing::info;

/// What a signal means to the engine, independent of which POSIX signal
/// number produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGTERM or SIGINT: stop the receive loop and exit cleanly.
    Terminate,
    /// SIGUSR1: log a snapshot of the packet counters.
    ReportStats,
    /// SIGUSR2: re-log the startup banner and the parameters this run was
    /// configured with.
    DumpParams,
}

/// Spawns listener tasks for SIGTERM, SIGINT, SIGUSR1, and SIGUSR2, each
/// forwarding a [`Signal`] onto the returned channel's sender side.
///
/// The channel is bounded: signals are not expected to arrive faster than
/// the engine can drain them, and a bound here catches a runaway sender
/// bug instead of growing without limit.
pub fn spawn_listener() -> mpsc::Receiver<Signal> {
    let (tx, rx) = mpsc::channel(16);

    spawn_one(tx.clone(), tokio::signal::unix::SignalKind::terminate(), Signal::Terminate);
    spawn_one(tx.clone(), tokio::signal::unix::SignalKind::interrupt(), Signal::Terminate);
    spawn_one(tx.clone(), tokio::signal::unix::SignalKind::user_defined1(), Signal::ReportStats);
    spawn_one(tx, tokio::signal::unix::SignalKind::user_defined2(), Signal::DumpParams);

    rx
}

fn spawn_one(tx: mpsc::Sender<Signal>, kind: tokio::signal::unix::SignalKind, mapped: Signal) {
    tokio::spawn(async move {
        let mut stream = match tokio::signal::unix::signal(kind) {
            Ok(stream) => stream,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %_e, "failed to install signal handler");
                return;
            }
        };

        while stream.recv().await.is_some() {
            #[cfg(feature = "tracing")]
            info!(?mapped, "signal received");
            if tx.send(mapped).await.is_err() {
                return;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_delivers_sigterm() {
        let mut rx = spawn_listener();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        unsafe {
            libc::raise(libc::SIGTERM);
        }

        let signal = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("signal should arrive within timeout")
            .expect("channel should not be closed");

        assert_eq!(signal, Signal::Terminate);
    }

    #[tokio::test]
    async fn listener_delivers_sigusr1_as_report_stats() {
        let mut rx = spawn_listener();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        unsafe {
            libc::raise(libc::SIGUSR1);
        }

        let signal = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("signal should arrive within timeout")
            .expect("channel should not be closed");

        assert_eq!(signal, Signal::ReportStats);
    }
}
