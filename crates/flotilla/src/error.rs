//! Unified error type for the Flotilla server.

use flotilla_protocol::ProtocolError;
use flotilla_rules::RulesError;
use flotilla_session::SessionError;
use flotilla_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically anywhere in the
/// meta-crate.
#[derive(Debug, thiserror::Error)]
pub enum FlotillaError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rules-level error (illegal game action).
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// A session-level error (disconnect, internal violation).
    #[error(transparent)]
    Session(#[from] SessionError),
}
