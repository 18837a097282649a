use replicast::cli;
use replicast::daemonize;
use replicast::dispatcher;

/// Not `#[tokio::main]`: daemonisation has to fork before the Tokio
/// runtime's thread pool exists, so the runtime is built by hand after
/// that decision is made.
fn main() {
    let opts = cli::parse_args();

    let params = match dispatcher::validate(&opts) {
        Ok(params) => params,
        Err(code) => std::process::exit(code),
    };

    if params.daemonize {
        if let Err(e) = daemonize::daemonize() {
            eprintln!("replicastd: failed to daemonize: {e}");
            std::process::exit(dispatcher::EXIT_RUNTIME);
        }
    }

    init_tracing(&params.loglevel);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("replicastd: failed to start async runtime: {e}");
            std::process::exit(dispatcher::EXIT_RUNTIME);
        }
    };

    let code = runtime.block_on(dispatcher::run(params));
    std::process::exit(code);
}

#[cfg(feature = "tracing")]
fn init_tracing(loglevel: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(loglevel));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing(_loglevel: &str) {}
