//! Wire protocol for the Flotilla battleship server.
//!
//! Every frame on the wire is a single ASCII line: `TYPE|PAYLOAD\n`.
//! This crate defines the message alphabet ([`Message`] and its payload
//! types) and the pure codec functions [`parse`] and [`build`] that
//! convert between frames and messages. There is no I/O here — framing
//! is the transport's job, game meaning is the rules engine's job.
//!
//! The codec is total on the message alphabet: every value [`build`]
//! produces is accepted by [`parse`], and `build(parse(f)) == f`
//! byte-for-byte for every frame `parse` accepts.

mod codec;
mod error;
mod types;

pub use codec::{build, parse};
pub use error::ProtocolError;
pub use types::{
    Cell, CellState, Coordinate, ErrorData, GameState, Message, PlayerId,
    RegisterData, Ship, ShipType, StatusData, TurnView,
};
