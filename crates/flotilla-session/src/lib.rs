//! The session layer: one running battleship match.
//!
//! A [`GameSession`] owns exactly two peer connections and one rules
//! engine, and drives them through the phase sequence registration →
//! placement → playing → finished as a single cooperative task. All
//! game-state mutation happens inside that task, so the rules engine
//! needs no locking; the only thing shared outward is the `finished`
//! flag the registry polls.

mod error;
mod session;

pub use error::SessionError;
pub use session::{GameSession, SessionConfig, SessionId};
