//! One-shot TCP listener.
//!
//! Binds the IPv4 wildcard address with a backlog of one, accepts a single
//! connection and echoes one read of it. Sockets are released on drop:
//! the connection first, then the listening socket.

use crate::echo::{write_payload, ReceiveBuffer};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info};

/// Pending connections the kernel queues before `accept`.
pub const BACKLOG: i32 = 1;

/// A listening socket that services exactly one connection.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind `0.0.0.0:port` and start listening. Port 0 lets the OS pick.
    pub fn bind(port: u16) -> io::Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;

        socket.bind(&addr.into())?;
        socket.listen(BACKLOG)?;

        let inner: TcpListener = socket.into();
        debug!(addr = %inner.local_addr()?, backlog = BACKLOG, "Listening");

        Ok(Self { inner })
    }

    /// Port the socket is bound to, as reported by the OS.
    pub fn local_port(&self) -> io::Result<u16> {
        Ok(self.inner.local_addr()?.port())
    }

    /// Block until a peer connects.
    pub fn accept_once(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.inner.accept()?;
        info!(peer = %peer, "Accepted connection");
        Ok((stream, peer))
    }

    /// Accept one connection, echo a single read of it to `out`, then close
    /// the connection and the listening socket.
    ///
    /// Returns the number of bytes echoed (at most
    /// [`RECV_BUFFER_SIZE`](crate::echo::RECV_BUFFER_SIZE)).
    pub fn serve_once<W: Write>(self, out: &mut W) -> io::Result<usize> {
        let (mut stream, peer) = self.accept_once()?;

        let payload = ReceiveBuffer::new().read_once(&mut stream)?;
        debug!(peer = %peer, bytes = payload.len(), "Received payload");

        write_payload(out, &payload)?;

        drop(stream);
        drop(self);
        debug!("Closed connection and listener");

        Ok(payload.len())
    }
}
