//! # Flotilla
//!
//! A two-player battleship server over a line-delimited TCP protocol.
//!
//! The server accepts connections, pairs them FIFO into sessions, and
//! drives each session through registration → placement → playing →
//! finished with a 30-second per-turn clock. All game state is
//! server-authoritative; clients only ever see their own board in full
//! and the opponent's board with unshot ships masked.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use flotilla::prelude::*;
//!
//! # async fn run() -> Result<(), FlotillaError> {
//! let server = FlotillaServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod matchmaker;
mod registry;
mod server;

pub use error::FlotillaError;
pub use matchmaker::{Matchmaker, PairedClients};
pub use registry::{spawn_reaper, SessionHandle, SessionRegistry, REAP_INTERVAL};
pub use server::{FlotillaServer, FlotillaServerBuilder};

/// Re-exports everything needed to embed or test the server.
pub mod prelude {
    // Meta-crate
    pub use crate::{
        FlotillaError, FlotillaServer, FlotillaServerBuilder, Matchmaker,
        SessionHandle, SessionRegistry,
    };

    // Protocol types
    pub use flotilla_protocol::{
        build, parse, Cell, CellState, Coordinate, ErrorData, GameState,
        Message, PlayerId, ProtocolError, RegisterData, Ship, ShipType,
        StatusData, TurnView,
    };

    // Rules types
    pub use flotilla_rules::{
        Game, Phase, PhaseGate, RulesError, ShotOutcome, FLEET,
    };

    // Session types
    pub use flotilla_session::{
        GameSession, SessionConfig, SessionError, SessionId,
    };

    // Transport types
    pub use flotilla_transport::{
        LineConnection, LineListener, TransportError,
    };
}
