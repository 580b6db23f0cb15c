//! `linewire` command line client.
//!
//! Connects to the configured endpoint, forwards each stdin line as a send,
//! and prints each received line to stdout. Exits on stdin EOF or Ctrl-C.

mod cli;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use linewire::{
    ConfigError,
    ConnectError,
    ConnectionActor,
    ConnectionConfig,
    ConnectionListener,
    ReconnectPolicy,
    SendError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Prints inbound lines and logs lifecycle events.
struct StdoutListener;

impl ConnectionListener for StdoutListener {
    fn on_connected(&self) { info!("connected"); }

    fn on_disconnected(&self) { info!("disconnected"); }

    fn on_connect_error(&self, error: &ConnectError) { warn!(%error, "connect failed"); }

    fn on_send_text_error(&self, error: &SendError) { warn!(%error, "send failed"); }

    fn on_text_message(&self, text: &str) { println!("{text}"); }
}

fn build_config(cli: &cli::Cli) -> Result<ConnectionConfig, ConfigError> {
    let mut config = match (&cli.config, &cli.host, cli.port) {
        (Some(path), _, _) => ConnectionConfig::load(path)?,
        (None, Some(host), Some(port)) => ConnectionConfig::new(host.clone(), port),
        (None, _, _) => {
            return Err(ConfigError::Invalid {
                message: "either --config or both --host and --port are required".to_owned(),
            });
        }
    };
    if let Some(host) = &cli.host {
        config = config.host(host.clone());
    }
    if let Some(port) = cli.port {
        config = config.port(port);
    }
    if let Some(ms) = cli.connect_timeout_ms {
        config = config.connect_timeout((ms > 0).then(|| Duration::from_millis(ms)));
    }
    if let Some(attempts) = cli.max_attempts {
        config = config.reconnect(ReconnectPolicy::new(attempts));
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Also captures the library's `log` records.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = build_config(&cli).inspect_err(|err| error!(%err, "invalid configuration"))?;

    let (handle, actor) = ConnectionActor::spawn(config, Arc::new(StdoutListener));
    handle.connect()?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            line = stdin.next_line() => match line {
                Ok(Some(line)) => handle.send(line)?,
                Ok(None) => break,
                Err(err) => {
                    error!(%err, "failed to read stdin");
                    break;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    handle.shutdown()?;
    actor.await?;
    Ok(())
}
