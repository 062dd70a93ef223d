//! ephemeral-listener: listen on an OS-assigned port, print the port, then
//! accept one connection and echo one read of it to stdout.
//!
//! Stdout carries the port digits immediately followed by the payload, with
//! no delimiter. The port is flushed before the listener blocks on accept.

use clap::Parser;
use oneshot_listener::config::{Config, EphemeralArgs};
use oneshot_listener::{announce_port, Listener};
use std::io;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_ephemeral_args(EphemeralArgs::parse())?;
    oneshot_listener::init_logging(&config);

    let listener = Listener::bind(config.port)?;
    let port = listener.local_port()?;

    let mut out = io::stdout().lock();
    announce_port(&mut out, port)?;
    info!(port, "Listening on ephemeral port");

    let echoed = listener.serve_once(&mut out)?;

    info!(bytes = echoed, "Echoed payload");
    Ok(())
}
