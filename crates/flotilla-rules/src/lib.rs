//! Authoritative game rules for Flotilla.
//!
//! This crate owns everything that makes a battleship match a game:
//! the two 10×10 boards, fleet composition and placement validation,
//! shot resolution (miss / hit / sunk), turn ownership, and terminal
//! detection. It is pure with respect to I/O — no sockets, no clocks,
//! no logging side effects beyond `tracing` events. The session layer
//! feeds it parsed messages and decides what to put on the wire.
//!
//! Every operation returns a `Result` with a specific [`RulesError`];
//! nothing here panics on bad input.

mod board;
mod error;
mod game;
mod phase;

pub use board::{Board, BOARD_SIZE};
pub use error::RulesError;
pub use game::{Game, ShotOutcome, StatusView, FLEET};
pub use phase::{Phase, PhaseGate};
