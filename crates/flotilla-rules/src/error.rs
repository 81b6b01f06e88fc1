//! Error types for the rules engine.
//!
//! A `RulesError` always means "the move was legal to *say* but not
//! legal to *do*" — the frame parsed fine, the game state rejected it.
//! The session forwards most of these verbatim to the offending peer
//! as `ERROR|400,<description>`, so every message here must stay on a
//! single line and free of `|`.

use flotilla_protocol::{Coordinate, PlayerId, ShipType};

use crate::phase::Phase;

/// Errors produced by the rules engine and the phase gate.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// REGISTER with an empty nickname.
    #[error("nickname cannot be empty")]
    EmptyNickname,

    /// REGISTER for a seat that already holds a nickname.
    #[error("player {0} is already registered")]
    AlreadyRegistered(PlayerId),

    /// PLACE_SHIPS before both seats have registered.
    #[error("both players must be registered before placing ships")]
    NotBothRegistered,

    /// A second PLACE_SHIPS for the same seat.
    #[error("player {0} has already placed their fleet")]
    FleetAlreadyPlaced(PlayerId),

    /// The fleet does not have exactly the required number of ships.
    #[error("incorrect number of ships: expected {expected}, got {got}")]
    WrongShipCount { expected: usize, got: usize },

    /// The fleet has the wrong number of ships of one class.
    #[error("expected {expected} x {kind}, got {got}")]
    WrongClassCount {
        kind: ShipType,
        expected: usize,
        got: usize,
    },

    /// A ship was declared with the wrong number of cells for its class.
    #[error("{kind} must occupy {expected} cells, got {got}")]
    WrongShipSize {
        kind: ShipType,
        expected: usize,
        got: usize,
    },

    /// A ship's cells do not form a straight contiguous line.
    #[error("{0} cells must form a straight contiguous line")]
    ShipNotStraight(ShipType),

    /// A coordinate outside the 10×10 board.
    #[error(
        "coordinate {0} is out of bounds: letter A-J and number 1-10 expected"
    )]
    OutOfBounds(Coordinate),

    /// Two ships claim the same cell.
    #[error("ship overlap at {0}")]
    Overlap(Coordinate),

    /// A shot from the seat that does not hold the turn.
    #[error("not player {0}'s turn")]
    NotYourTurn(PlayerId),

    /// A shot at a cell that was already resolved (MISS/HIT/SUNK).
    #[error("coordinate {0} was already attacked")]
    AlreadyAttacked(Coordinate),

    /// Any action after the game reached a terminal state.
    #[error("game is already over")]
    GameAlreadyOver,

    /// Asking for the winner before the game ended.
    #[error("game is not over yet")]
    GameNotOver,

    /// A turn operation outside the playing phase.
    #[error("no turn in progress")]
    NoTurnInProgress,

    /// A phase transition that skips ahead or goes backwards.
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },
}
