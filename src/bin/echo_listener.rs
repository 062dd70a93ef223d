//! echo-listener: accept one connection on a given port and echo one read
//! of it to stdout.

use clap::Parser;
use oneshot_listener::config::{Config, EchoArgs};
use oneshot_listener::Listener;
use std::io;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_echo_args(EchoArgs::parse())?;
    oneshot_listener::init_logging(&config);

    info!(port = config.port, "Starting echo-listener");

    let listener = Listener::bind(config.port)?;

    let mut out = io::stdout().lock();
    let echoed = listener.serve_once(&mut out)?;

    info!(bytes = echoed, "Echoed payload");
    Ok(())
}
