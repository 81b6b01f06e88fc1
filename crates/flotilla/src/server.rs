//! `FlotillaServer` builder and accept loop.
//!
//! This ties the layers together: the listener accepts raw TCP, the
//! matchmaker pairs connections, and each pair becomes a session task
//! tracked by the registry until the reaper collects it.

use std::sync::Arc;

use flotilla_session::{GameSession, SessionConfig};
use flotilla_transport::LineListener;

use crate::matchmaker::{Matchmaker, PairedClients};
use crate::registry::{spawn_reaper, SessionHandle, SessionRegistry};
use crate::FlotillaError;

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use flotilla::prelude::*;
///
/// # async fn run() -> Result<(), FlotillaError> {
/// let server = FlotillaServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct FlotillaServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl FlotillaServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to bind to. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides session behavior (most usefully the turn timeout).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self) -> Result<FlotillaServer, FlotillaError> {
        let listener = LineListener::bind(&self.bind_addr).await?;
        Ok(FlotillaServer {
            listener,
            matchmaker: Matchmaker::new(),
            registry: Arc::new(SessionRegistry::new()),
            session_config: self.session_config,
        })
    }
}

impl Default for FlotillaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running battleship server.
///
/// Call [`run()`](Self::run) to start the reaper and the accept loop.
pub struct FlotillaServer {
    listener: LineListener,
    matchmaker: Matchmaker,
    registry: Arc<SessionRegistry>,
    session_config: SessionConfig,
}

impl FlotillaServer {
    /// Creates a new builder.
    pub fn builder() -> FlotillaServerBuilder {
        FlotillaServerBuilder::new()
    }

    /// The actual bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The session registry, for observability and tests.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Runs the accept loop. Accepts connections, queues them for
    /// pairing, and spawns a session task per pair. Runs until the
    /// process is terminated; a failed accept never takes the server
    /// down.
    pub async fn run(self) -> Result<(), FlotillaError> {
        spawn_reaper(Arc::clone(&self.registry));
        tracing::info!("flotilla server running");

        loop {
            match self.listener.accept().await {
                Ok((conn, addr)) => {
                    tracing::info!(%addr, "client connected, waiting for an opponent");
                    if let Some(pair) = self.matchmaker.enqueue(conn).await {
                        self.start_session(pair).await;
                    }
                }
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                }
            }
        }
    }

    /// Hands a freshly matched pair of connections to a new session
    /// task and registers it for the reaper.
    async fn start_session(&self, pair: PairedClients) {
        let PairedClients {
            session_id,
            first,
            second,
        } = pair;

        tracing::info!(
            session = %session_id,
            player1 = %first.peer_addr(),
            player2 = %second.peer_addr(),
            "players paired, starting session"
        );

        let session = GameSession::new(
            session_id,
            first,
            second,
            self.session_config.clone(),
        );
        let finished = session.finished_handle();
        let task = tokio::spawn(session.run());

        self.registry
            .insert(session_id, SessionHandle::new(finished, task))
            .await;
    }
}
