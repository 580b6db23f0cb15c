//! Command line interface for the `linewire` binary.
//!
//! Endpoint settings come from flags, an optional TOML file, or both; flags
//! win over the file.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `linewire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "linewire",
    version,
    about = "Exchange newline-delimited text with a TCP endpoint"
)]
pub struct Cli {
    /// TOML file providing connection settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Host to connect to.
    #[arg(long)]
    pub host: Option<String>,
    /// Port to connect to.
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Connection attempt timeout in milliseconds; 0 disables the timeout.
    #[arg(long, value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,
    /// Connect attempts allowed per line sent while disconnected.
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_endpoint_flags() {
        let cli = Cli::parse_from(["linewire", "--host", "example.org", "-p", "7000"]);
        assert_eq!(cli.host.as_deref(), Some("example.org"));
        assert_eq!(cli.port, Some(7000));
        assert!(cli.config.is_none());
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["linewire", "--port", "70000"]).is_err());
    }
}
