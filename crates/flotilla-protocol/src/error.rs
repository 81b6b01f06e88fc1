//! Error type for the protocol layer.
//!
//! Each crate in Flotilla defines its own error enum. A `ProtocolError`
//! always means "this line is not a well-formed frame" — never a game
//! rule violation (that's `RulesError` territory) and never an I/O
//! failure.

/// Errors produced while parsing or building wire frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not terminated by `\n`. The framer normally
    /// guarantees this; seeing it means the caller handed over a
    /// truncated line.
    #[error("invalid frame: missing '\\n' terminator")]
    Unterminated,

    /// No `|` between the type tag and the payload.
    #[error("invalid frame: expected TYPE|PAYLOAD")]
    MissingSeparator,

    /// The type tag is not one of the eight known message types.
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// A coordinate token doesn't match `<letter><number>` — lowercase
    /// letters, leading zeros, and empty tokens all land here.
    #[error("invalid coordinate {0:?}: expected <letter><number>")]
    InvalidCoordinate(String),

    /// An unknown ship type token in a PLACE_SHIPS payload.
    #[error("unknown ship type {0:?}")]
    UnknownShipType(String),

    /// An unknown turn token in a STATUS payload.
    #[error("unknown turn {0:?}")]
    UnknownTurn(String),

    /// An unknown cell state token in a STATUS board entry.
    #[error("unknown cell state {0:?}")]
    UnknownCellState(String),

    /// An unknown game state token in a STATUS payload.
    #[error("unknown game state {0:?}")]
    UnknownGameState(String),

    /// A PLAYER_ID payload outside {1, 2}.
    #[error("invalid player id {0:?}: expected 1 or 2")]
    InvalidPlayerId(String),

    /// Any other malformed payload: empty required field, missing
    /// separator inside the payload, stray `|`, bad integer.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
