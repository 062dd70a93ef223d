//! Single-read receive buffer and stdout framing.
//!
//! The "protocol" is whatever arrives in one read, capped at
//! [`RECV_BUFFER_SIZE`] bytes:
//!
//! ```text
//! Client sends:  hello
//! Stdout:        hello            (echo-listener)
//! Stdout:        54321hello       (ephemeral-listener, port first)
//! ```
//!
//! Nothing drains the socket after the first read, so anything past the
//! first chunk is dropped.

use bytes::{Bytes, BytesMut};
use std::io::{self, Read, Write};

/// Capacity of the receive buffer in bytes.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Fixed-capacity buffer filled by exactly one read.
pub struct ReceiveBuffer {
    buf: BytesMut,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::zeroed(RECV_BUFFER_SIZE),
        }
    }

    /// Perform a single read and return what it delivered (0 on EOF).
    ///
    /// `Interrupted` is retried since no data was transferred.
    pub fn read_once<R: Read>(mut self, reader: &mut R) -> io::Result<Bytes> {
        let n = loop {
            match reader.read(&mut self.buf[..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        self.buf.truncate(n);
        Ok(self.buf.freeze())
    }
}

impl Default for ReceiveBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the received bytes unmodified and flush.
pub fn write_payload<W: Write>(out: &mut W, payload: &[u8]) -> io::Result<()> {
    out.write_all(payload)?;
    out.flush()
}

/// Write the port as decimal digits, no separator, and flush so a harness
/// sees it before the listener blocks on accept.
pub fn announce_port<W: Write>(out: &mut W, port: u16) -> io::Result<()> {
    write!(out, "{port}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `chunk` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Fails once with `Interrupted`, then delegates.
    struct InterruptOnce<'a> {
        interrupted: bool,
        data: &'a [u8],
    }

    impl Read for InterruptOnce<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_read_small_payload() {
        let mut input: &[u8] = b"hello";
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert_eq!(&payload[..], b"hello");
    }

    #[test]
    fn test_read_exact_capacity() {
        let data = vec![b'a'; RECV_BUFFER_SIZE];
        let mut input = &data[..];
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert_eq!(payload.len(), RECV_BUFFER_SIZE);
    }

    #[test]
    fn test_read_truncates_oversized() {
        let data: Vec<u8> = (0..RECV_BUFFER_SIZE + 1).map(|i| i as u8).collect();
        let mut input = &data[..];
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert_eq!(payload.len(), RECV_BUFFER_SIZE);
        assert_eq!(&payload[..], &data[..RECV_BUFFER_SIZE]);
        // The tail stays unread.
        assert_eq!(input, &data[RECV_BUFFER_SIZE..]);
    }

    #[test]
    fn test_read_does_not_drain() {
        let mut input = Trickle {
            data: b"hello world",
            chunk: 3,
        };
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert_eq!(&payload[..], b"hel");
    }

    #[test]
    fn test_read_eof() {
        let mut input: &[u8] = b"";
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_read_retries_interrupted() {
        let mut input = InterruptOnce {
            interrupted: false,
            data: b"ping",
        };
        let payload = ReceiveBuffer::new().read_once(&mut input).unwrap();
        assert_eq!(&payload[..], b"ping");
    }

    #[test]
    fn test_write_payload_verbatim() {
        let mut out = Vec::new();
        write_payload(&mut out, b"\x00raw\r\nbytes").unwrap();
        assert_eq!(out, b"\x00raw\r\nbytes");
    }

    #[test]
    fn test_announce_then_payload() {
        let mut out = Vec::new();
        announce_port(&mut out, 54321).unwrap();
        write_payload(&mut out, b"ping").unwrap();
        assert_eq!(out, b"54321ping");
    }
}
