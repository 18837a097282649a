//! Command-line decoding.
//!
//! The flag surface is long-form options introduced by a *single* dash
//! (`-4in`, `-nodaemon`, ...), the traditional `getopt_long_only(3)`
//! convention. `clap`'s derive API only recognises `--long` by default, so
//! `parse_args` rewrites single-dash long options to double-dash before
//! handing argv to clap — every flag is otherwise decoded exactly as
//! clap's derive macros would decode it natively.

use clap::Parser;

pub const LICENSE_TEXT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Licensed under the MIT license. See LICENSE for details.\n"
);

/// Raw, not-yet-validated command-line options.
///
/// Cross-flag validation (exactly one source family, at least one
/// destination family, TTL/hops ranges, ...) happens one layer up, in
/// [`crate::params`].
#[derive(Parser, Debug)]
#[command(
    name = "replicastd",
    about = "Replicate UDP datagrams from one source endpoint to a set of destination endpoints.",
    disable_version_flag = true
)]
pub struct ProgramOptions {
    /// Emit license text and exit.
    #[arg(long = "license", action = clap::ArgAction::SetTrue)]
    pub license: bool,

    /// Inhibit daemonisation; stay attached to the controlling terminal.
    #[arg(long = "nodaemon", action = clap::ArgAction::SetTrue)]
    pub nodaemon: bool,

    /// Source endpoint, IPv4 presentation form: `addr[%iface]:port`.
    #[arg(long = "4in", value_name = "ADDR[%IFACE]:PORT")]
    pub v4_in: Option<String>,

    /// Destination list, IPv4 presentation form, comma-separated.
    #[arg(long = "4out", value_name = "LIST")]
    pub v4_out: Option<String>,

    /// IPv4 multicast TTL, 0-255 (0 = leave at the kernel default).
    #[arg(long = "4mcttl", value_name = "TTL")]
    pub v4_mcttl: Option<u32>,

    /// Enable IPv4 multicast loopback.
    #[arg(long = "4mcloop", action = clap::ArgAction::SetTrue)]
    pub v4_mcloop: bool,

    /// IPv4 multicast output interface, name or literal address.
    #[arg(long = "4mcoutif", value_name = "IFACE")]
    pub v4_mcoutif: Option<String>,

    /// Source endpoint, IPv6 presentation form: `[addr[%iface]]:port`.
    #[arg(long = "6in", value_name = "[ADDR[%IFACE]]:PORT")]
    pub v6_in: Option<String>,

    /// Destination list, IPv6 presentation form, comma-separated.
    #[arg(long = "6out", value_name = "LIST")]
    pub v6_out: Option<String>,

    /// IPv6 multicast hop limit, 0-255 (0 = leave at the kernel default).
    #[arg(long = "6mchops", value_name = "HOPS")]
    pub v6_mchops: Option<u32>,

    /// Enable IPv6 multicast loopback.
    #[arg(long = "6mcloop", action = clap::ArgAction::SetTrue)]
    pub v6_mcloop: bool,

    /// IPv6 multicast output interface, by name.
    #[arg(long = "6mcoutif", value_name = "IFACE")]
    pub v6_mcoutif: Option<String>,

    /// Tracing verbosity; overridden by `RUST_LOG` when set.
    #[arg(long = "loglevel", default_value = "info")]
    pub loglevel: String,
}

/// Rewrites `-xxx` (single dash, 2+ characters, not already `--`) into
/// `--xxx` so clap's derive parser — which only recognises the `--long`
/// form — accepts single-dash long options.
fn expand_long_only(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| {
        if arg.starts_with("--") || !arg.starts_with('-') || arg.len() < 2 {
            arg
        } else {
            format!("-{arg}")
        }
    })
    .collect()
}

/// Parses `std::env::args()` into [`ProgramOptions`].
///
/// On a decode failure (unknown option, missing value, ...) this prints
/// clap's diagnostic and terminates the process with a nonzero exit code.
pub fn parse_args() -> ProgramOptions {
    let argv = expand_long_only(std::env::args());
    ProgramOptions::parse_from(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dash_long_options_are_accepted() {
        let argv = expand_long_only(
            ["replicastd", "-4in", "224.5.5.5:1234", "-4out", "10.0.0.1:80"]
                .into_iter()
                .map(String::from),
        );
        let opts = ProgramOptions::parse_from(argv);
        assert_eq!(opts.v4_in.as_deref(), Some("224.5.5.5:1234"));
        assert_eq!(opts.v4_out.as_deref(), Some("10.0.0.1:80"));
    }

    #[test]
    fn double_dash_is_left_untouched() {
        let argv = expand_long_only(
            ["replicastd", "--4in", "224.5.5.5:1234"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(argv[1], "--4in");
    }

    #[test]
    fn boolean_flags_default_to_false() {
        let opts = ProgramOptions::parse_from(["replicastd"]);
        assert!(!opts.nodaemon);
        assert!(!opts.v4_mcloop);
    }
}
