//! Error types for the transport layer.

/// Errors that can occur while accepting, reading, or writing
/// connections.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    BindFailed(std::io::Error),

    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),

    /// Connecting to a remote listener failed.
    #[error("connect failed: {0}")]
    ConnectFailed(std::io::Error),

    /// Writing a frame failed; the connection is unusable.
    #[error("send failed: {0}")]
    SendFailed(std::io::Error),

    /// Reading from the socket failed; the connection is unusable.
    #[error("receive failed: {0}")]
    ReceiveFailed(std::io::Error),

    /// The peer closed the connection in the middle of a frame.
    #[error("connection closed mid-frame")]
    TruncatedFrame,

    /// A line exceeded [`crate::MAX_FRAME_LEN`] without a terminator.
    #[error("frame too long: {0} bytes")]
    FrameTooLong(usize),

    /// The peer sent bytes outside ASCII — the protocol is ASCII-only.
    #[error("frame is not valid ASCII")]
    NotAscii,
}
