use thiserror::Error;

/// Errors raised while parsing a presentation-format endpoint string.
///
/// These mirror the `aip_ptoh_errors` taxonomy of the reference
/// implementation: each failure mode keeps the offending input around so a
/// caller (the CLI validator) can print a precise diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad address: {0}")]
    BadAddr(String),

    #[error("bad interface address or name: {0}")]
    BadIfAddr(String),

    #[error("bad port: {0}")]
    BadPort(String),

    /// Kept for parity with the original C implementation's fixed-buffer
    /// interface-name path; unreachable in this crate since interface names
    /// are owned `String`s with no caller-supplied length limit.
    #[error("interface name buffer too small")]
    IfStrLenBad,
}

/// Errors raised while parsing a comma-separated list of endpoints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvParseError {
    #[error("invalid endpoint in list: {item}: {source}")]
    Item {
        item: String,
        #[source]
        source: ParseError,
    },

    #[error("empty item in endpoint list")]
    EmptyItem,
}

/// Errors raised while validating the fully-assembled set of CLI options
/// into [`crate::params::ProgramParameters`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("no source address given (one of -4in/-6in is required)")]
    NoSrcAddr,

    #[error("both -4in and -6in were given; only one source family is allowed")]
    MultiSrcAddrs,

    #[error("no destination addresses given (one of -4out/-6out is required)")]
    NoDstAddrs,

    #[error("multicast TTL out of range (0-255): {0}")]
    TxTtlRange(u32),

    #[error("multicast hop limit out of range (0-255): {0}")]
    TxHopsRange(u32),

    #[error("invalid output interface: {0}")]
    OutIntf(String),

    #[error("source port must be nonzero")]
    ZeroSrcPort,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Csv(#[from] CsvParseError),
}

/// Errors raised by the socket factory and the forwarding engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{context}: {source}")]
    Os {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("no sockets configured for the selected forwarding mode")]
    NoSockets,
}

impl EngineError {
    pub fn os(context: &'static str, source: std::io::Error) -> Self {
        EngineError::Os { context, source }
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
