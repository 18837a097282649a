//! Mode dispatch (component C5): wires the CLI, the validated parameters,
//! the socket factory, the forwarding engine, and the signals service into
//! one run of the daemon, and maps the outcome onto a process exit code.
//!
//! Exit codes:
//! - `0` — clean shutdown on SIGTERM/SIGINT.
//! - `2` — command-line decoding or parameter validation failed.
//! - `1` — a socket or I/O operation failed once running.

use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{error, info};

use crate::cli::ProgramOptions;
use crate::counters::PacketCounters;
use crate::engine::Engine;
use crate::params::ProgramParameters;
use crate::signals;

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_RUNTIME: i32 = 1;

/// Validates `opts` into [`ProgramParameters`], printing a diagnostic and
/// returning `Err` with [`EXIT_USAGE`] on failure. Split out from [`run`]
/// so `main` can call it before deciding whether to daemonise — validation
/// must happen before the process detaches from its terminal, or a bad
/// flag combination silently fails in the background instead of printing
/// where the operator can see it.
pub fn validate(opts: &ProgramOptions) -> Result<ProgramParameters, i32> {
    if opts.license {
        println!("{}", crate::cli::LICENSE_TEXT);
        return Err(EXIT_OK);
    }

    ProgramParameters::from_options(opts).map_err(|e| {
        eprintln!("replicastd: {e}");
        EXIT_USAGE
    })
}

/// Runs the daemon to completion: opens sockets, starts the signal
/// listener, logs a startup banner, and drives the engine until shutdown.
/// Returns the process exit code.
pub async fn run(params: ProgramParameters) -> i32 {
    let counters = Arc::new(PacketCounters::new());

    let engine = match Engine::open(&params, counters.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            #[cfg(feature = "tracing")]
            error!(error = %e, "failed to open sockets");
            #[cfg(not(feature = "tracing"))]
            eprintln!("replicastd: {e}");
            return EXIT_RUNTIME;
        }
    };

    #[cfg(feature = "tracing")]
    info!(mode = ?params.mode, "replicastd starting");

    let shutdown = signals::spawn_listener();

    match engine.run(shutdown).await {
        Ok(()) => {
            #[cfg(feature = "tracing")]
            info!("replicastd stopped");
            EXIT_OK
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            error!(error = %e, "replicastd stopped with an error");
            #[cfg(not(feature = "tracing"))]
            eprintln!("replicastd: {e}");
            EXIT_RUNTIME
        }
    }
}
