//! Error types for the session layer.

use flotilla_protocol::PlayerId;
use flotilla_rules::RulesError;
use flotilla_transport::TransportError;

/// Errors that end (or describe the end of) a session.
///
/// Recoverable problems — malformed frames, rule violations — never
/// surface here; they are answered with `ERROR|400,…` on the wire and
/// the session carries on. A `SessionError` means this match is done.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A peer's socket hit EOF or an I/O error. The session notifies
    /// the survivor and terminates.
    #[error("player {0} disconnected")]
    PeerDisconnected(PlayerId),

    /// A transport failure not attributable to one peer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The rules engine rejected an internal transition — a session
    /// bug, fatal to this session only, never to the process.
    #[error("internal rules violation: {0}")]
    Internal(#[from] RulesError),
}
