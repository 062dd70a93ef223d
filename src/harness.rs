//! Client side of the listener fixtures.
//!
//! A harness spawns a listener, learns its port (from its own choice or from
//! the `ephemeral-listener` announcement), then connects and sends a payload.
//! The listener may not be bound yet when the harness first connects, so
//! connecting retries on a fixed delay.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Default number of connection attempts.
pub const CONNECT_ATTEMPTS: usize = 10;

/// Default delay between connection attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on the announcement chunk; `u16::MAX` has five digits.
const ANNOUNCE_READ_SIZE: usize = 64;

/// `127.0.0.1:port`
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// Connect to `addr`, retrying up to `attempts` times with `delay` between
/// failures. Returns the last connect error if every attempt fails.
pub fn connect_with_retry(
    addr: SocketAddr,
    attempts: usize,
    delay: Duration,
) -> io::Result<TcpStream> {
    let mut last_err = io::Error::new(io::ErrorKind::InvalidInput, "no connection attempts");

    for attempt in 1..=attempts {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                debug!(addr = %addr, attempt, "Connected");
                return Ok(stream);
            }
            Err(e) => {
                trace!(addr = %addr, attempt, error = %e, "Connect failed");
                last_err = e;
                if attempt < attempts {
                    thread::sleep(delay);
                }
            }
        }
    }

    Err(last_err)
}

/// Connect with the default retry policy, write `payload` and close.
pub fn send_payload(addr: SocketAddr, payload: &[u8]) -> io::Result<()> {
    let mut stream = connect_with_retry(addr, CONNECT_ATTEMPTS, CONNECT_RETRY_DELAY)?;
    stream.write_all(payload)?;
    debug!(addr = %addr, bytes = payload.len(), "Sent payload");
    Ok(())
}

/// Read the port announced by `ephemeral-listener`.
///
/// Reads one chunk and parses its leading ASCII digits. Bytes after the
/// digits are returned as payload that arrived in the same chunk. A payload
/// starting with digits cannot be told apart from the port, so call this
/// before connecting.
pub fn read_announced_port<R: Read>(reader: &mut R) -> io::Result<(u16, Vec<u8>)> {
    let mut buf = [0u8; ANNOUNCE_READ_SIZE];
    let n = loop {
        match reader.read(&mut buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    };

    if n == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "listener exited before announcing a port",
        ));
    }

    let chunk = &buf[..n];
    let digits = chunk.iter().take_while(|b| b.is_ascii_digit()).count();
    let port = std::str::from_utf8(&chunk[..digits])
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .filter(|&port| port != 0)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid port announcement: {:?}", String::from_utf8_lossy(chunk)),
            )
        })?;

    Ok((port, chunk[digits..].to_vec()))
}
