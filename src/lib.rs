//! oneshot-listener: single-connection TCP fixtures for test harnesses.
//!
//! Two binaries share this library:
//! - `echo-listener <port>`: listen on an explicit port
//! - `ephemeral-listener`: listen on an OS-assigned port and print it first
//!
//! Both accept exactly one connection, perform one read of at most
//! [`RECV_BUFFER_SIZE`] bytes and write those bytes to stdout.
//!
//! The [`harness`] module holds the client side used to drive them.

pub mod config;
pub mod echo;
pub mod harness;
pub mod listener;

pub use echo::{announce_port, write_payload, ReceiveBuffer, RECV_BUFFER_SIZE};
pub use listener::{Listener, BACKLOG};

use config::Config;
use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr. Stdout carries the echoed payload.
pub fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
