//! TCP listener and line-framed connection.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::TransportError;

/// Upper bound on a single frame, terminator included. The longest
/// legitimate frame is a STATUS with two full 100-cell boards, well
/// under 2 KB; anything near this limit is a misbehaving peer.
pub const MAX_FRAME_LEN: usize = 8 * 1024;

/// A TCP listener handing out [`LineConnection`]s.
pub struct LineListener {
    listener: TcpListener,
}

impl LineListener {
    /// Binds to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "listening");
        Ok(Self { listener })
    }

    /// The actual bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next incoming connection.
    pub async fn accept(
        &self,
    ) -> Result<(LineConnection, SocketAddr), TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::debug!(%addr, "accepted connection");
        Ok((LineConnection::new(stream, addr), addr))
    }
}

/// One peer connection, framed into `\n`-terminated lines.
///
/// Reads are cancel-safe: a `recv()` future dropped mid-line (for
/// example by `tokio::select!` when a turn deadline fires) leaves the
/// partial bytes buffered, and the next `recv()` picks up where it
/// left off.
pub struct LineConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    partial: Vec<u8>,
    peer: SocketAddr,
}

impl LineConnection {
    /// Wraps an already-connected stream.
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            partial: Vec::new(),
            peer,
        }
    }

    /// Connects to a remote listener. Used by clients and tests; the
    /// server side only ever accepts.
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        Ok(Self::new(stream, peer))
    }

    /// The remote address, captured at accept/connect time.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Receives the next complete frame, trailing `\n` included.
    ///
    /// Returns `Ok(None)` on a clean EOF (peer closed between frames).
    /// EOF in the middle of a frame, oversized lines, and non-ASCII
    /// bytes are errors.
    pub async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            // fill_buf is cancel-safe: nothing is consumed until the
            // bytes are moved into `partial` below.
            let available = self
                .reader
                .fill_buf()
                .await
                .map_err(TransportError::ReceiveFailed)?;

            if available.is_empty() {
                if self.partial.is_empty() {
                    return Ok(None);
                }
                return Err(TransportError::TruncatedFrame);
            }

            let newline = available.iter().position(|&b| b == b'\n');
            match newline {
                Some(pos) => {
                    self.partial.extend_from_slice(&available[..=pos]);
                    self.reader.consume(pos + 1);

                    let raw = std::mem::take(&mut self.partial);
                    if raw.len() > MAX_FRAME_LEN {
                        return Err(TransportError::FrameTooLong(raw.len()));
                    }
                    if !raw.is_ascii() {
                        return Err(TransportError::NotAscii);
                    }
                    // Safe: just checked it's ASCII.
                    let frame = String::from_utf8(raw)
                        .map_err(|_| TransportError::NotAscii)?;
                    return Ok(Some(frame));
                }
                None => {
                    let len = available.len();
                    self.partial.extend_from_slice(available);
                    self.reader.consume(len);
                    if self.partial.len() > MAX_FRAME_LEN {
                        return Err(TransportError::FrameTooLong(
                            self.partial.len(),
                        ));
                    }
                }
            }
        }
    }

    /// Writes a frame. Complete-or-fail: the frame is fully written and
    /// flushed, or the connection is considered dead.
    pub async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.writer
            .write_all(frame.as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        self.writer
            .flush()
            .await
            .map_err(TransportError::SendFailed)
    }
}
