//! The per-match session task.
//!
//! One session = one task. The flow mirrors the wire protocol:
//!
//!   1. Send `PLAYER_ID` to both peers.
//!   2. Registration: await a valid `REGISTER` from each seat.
//!   3. Placement: await a valid `PLACE_SHIPS` from each seat.
//!   4. Playing: shots under the turn clock until a terminal condition.
//!
//! During playing the session waits on the *active* peer with the turn
//! deadline while still draining the passive peer, so a `SURRENDER`
//! applies immediately no matter whose turn it is. Recoverable problems
//! are answered with `ERROR|400,…`; only transport failures and
//! internal invariant violations end the session early.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flotilla_protocol::{
    build, parse, Cell, CellState, ErrorData, Message, PlayerId, StatusData,
};
use flotilla_rules::{Game, Phase, RulesError};
use flotilla_transport::LineConnection;
use tokio::time::Instant;

use crate::SessionError;

/// Unique identifier of a session, allocated by the matchmaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tunable session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the active player has to produce a valid action before
    /// the turn is forfeited. The game does not end on a timeout — the
    /// turn passes.
    pub turn_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(30),
        }
    }
}

/// What the playing-phase select loop observed.
enum TurnEvent {
    /// A complete frame arrived from this peer.
    Frame(PlayerId, String),
    /// The turn deadline expired with no valid action.
    DeadlineExpired,
    /// This peer's socket hit EOF or an error.
    Disconnected(PlayerId),
}

/// One running battleship match: two connections, one rules engine.
///
/// The session is the sole owner of both sockets from the moment the
/// matchmaker hands them over until the task ends; they are closed on
/// drop, always before the `finished` flag becomes observable to the
/// reaper as a completed task.
pub struct GameSession {
    id: SessionId,
    peers: [LineConnection; 2],
    game: Game,
    config: SessionConfig,
    finished: Arc<AtomicBool>,
}

impl GameSession {
    /// Creates a session over a freshly paired couple of connections.
    /// The earlier-queued peer becomes player 1.
    pub fn new(
        id: SessionId,
        first: LineConnection,
        second: LineConnection,
        config: SessionConfig,
    ) -> Self {
        Self {
            id,
            peers: [first, second],
            game: Game::new(),
            config,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// A handle to the `finished` flag. The registry polls it; once
    /// true it never flips back.
    pub fn finished_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    /// Runs the session to completion. Never panics on peer
    /// misbehavior; any outcome ends with the flag set and both
    /// sockets dropped.
    pub async fn run(mut self) {
        tracing::info!(
            session = %self.id,
            player1 = %self.peers[0].peer_addr(),
            player2 = %self.peers[1].peer_addr(),
            "session started"
        );

        match self.drive().await {
            Ok(()) => {
                tracing::info!(session = %self.id, "session finished");
            }
            Err(SessionError::PeerDisconnected(player)) => {
                tracing::warn!(
                    session = %self.id,
                    %player,
                    "peer disconnected, terminating session"
                );
                self.notify_survivor(player.opponent()).await;
            }
            Err(error) => {
                tracing::error!(
                    session = %self.id,
                    %error,
                    "session failed"
                );
            }
        }

        self.finished.store(true, Ordering::SeqCst);
    }

    // -- Phase sequence ---------------------------------------------------

    async fn drive(&mut self) -> Result<(), SessionError> {
        for player in PlayerId::both() {
            self.send_to(player, &Message::PlayerId(player)).await?;
        }

        self.await_registrations().await?;
        self.game.advance_to_placement()?;
        // Both seats are claimed; tell everyone the match exists.
        self.broadcast_status(None).await?;

        self.await_placements().await?;
        self.game.advance_to_playing()?;

        self.play().await
    }

    /// Registration phase: each seat must produce a valid REGISTER.
    /// Anything else is rejected with `ERROR|400` and the peer may try
    /// again.
    async fn await_registrations(&mut self) -> Result<(), SessionError> {
        for player in PlayerId::both() {
            loop {
                let frame = self.recv_from(player).await?;
                match parse(&frame) {
                    Ok(Message::Register(data)) => {
                        match self.game.register(player, &data) {
                            Ok(()) => {
                                tracing::info!(
                                    session = %self.id,
                                    %player,
                                    nickname = %data.nickname,
                                    email = %data.email,
                                    "player registered"
                                );
                                break;
                            }
                            Err(e) => {
                                self.send_error(player, &e.to_string()).await?;
                            }
                        }
                    }
                    Ok(_) => {
                        self.send_error(player, "expected REGISTER").await?;
                    }
                    Err(e) => {
                        self.send_error(player, &e.to_string()).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Placement phase: each seat must produce a valid PLACE_SHIPS.
    async fn await_placements(&mut self) -> Result<(), SessionError> {
        for player in PlayerId::both() {
            loop {
                let frame = self.recv_from(player).await?;
                match parse(&frame) {
                    Ok(Message::PlaceShips(ships)) => {
                        match self.game.place_ships(player, ships) {
                            Ok(()) => {
                                tracing::info!(
                                    session = %self.id,
                                    %player,
                                    ships = self.game.ships_placed(player),
                                    "fleet placed"
                                );
                                break;
                            }
                            Err(e) => {
                                self.send_error(player, &e.to_string()).await?;
                            }
                        }
                    }
                    Ok(_) => {
                        self.send_error(player, "expected PLACE_SHIPS").await?;
                    }
                    Err(e) => {
                        self.send_error(player, &e.to_string()).await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Playing phase: the turn clock, shot handling, surrender, and
    /// terminal detection.
    async fn play(&mut self) -> Result<(), SessionError> {
        let mut deadline = Instant::now() + self.config.turn_timeout;
        self.broadcast_status(Some(deadline)).await?;
        tracing::info!(session = %self.id, "entering playing phase");

        loop {
            let active = self
                .game
                .current_turn()
                .ok_or(RulesError::NoTurnInProgress)?;

            match self.next_event(active, deadline).await {
                TurnEvent::DeadlineExpired => {
                    let next = self.game.forfeit_turn()?;
                    tracing::info!(
                        session = %self.id,
                        forfeited = %active,
                        next = %next,
                        "turn timed out"
                    );
                    deadline = Instant::now() + self.config.turn_timeout;
                    self.broadcast_status(Some(deadline)).await?;
                }

                TurnEvent::Disconnected(player) => {
                    return Err(SessionError::PeerDisconnected(player));
                }

                TurnEvent::Frame(player, frame) => match parse(&frame) {
                    Ok(Message::Surrender) => {
                        let winner = self.game.surrender(player)?;
                        return self.finish(winner).await;
                    }
                    Ok(Message::Shoot(coord)) => {
                        // The rules engine rejects out-of-turn shots,
                        // so the passive peer gets its error from the
                        // same path as every other bad shot.
                        match self.game.process_shot(player, coord) {
                            Ok(outcome) => {
                                tracing::info!(
                                    session = %self.id,
                                    %player,
                                    target = %coord,
                                    ?outcome,
                                    ships_remaining = self
                                        .game
                                        .ships_remaining(player.opponent()),
                                    "shot resolved"
                                );
                                deadline =
                                    Instant::now() + self.config.turn_timeout;
                                self.broadcast_status(Some(deadline)).await?;
                                if self.game.is_over() {
                                    let winner = self.game.winner()?;
                                    return self.finish(winner).await;
                                }
                            }
                            Err(e) => {
                                // Invalid shot: the turn and its
                                // deadline keep running.
                                self.send_error(player, &e.to_string())
                                    .await?;
                            }
                        }
                    }
                    Ok(_) => {
                        self.send_error(player, "unexpected message during play")
                            .await?;
                    }
                    Err(e) => {
                        self.send_error(player, &e.to_string()).await?;
                    }
                },
            }
        }
    }

    /// Waits for the next thing worth reacting to: a frame from either
    /// peer, the turn deadline, or a disconnect. Only the active peer
    /// is under the deadline; the passive peer is drained so its
    /// SURRENDER (or EOF) is seen immediately.
    async fn next_event(
        &mut self,
        active: PlayerId,
        deadline: Instant,
    ) -> TurnEvent {
        let passive = active.opponent();
        let [first, second] = &mut self.peers;
        let (active_conn, passive_conn) = match active {
            PlayerId::One => (first, second),
            PlayerId::Two => (second, first),
        };

        tokio::select! {
            result = tokio::time::timeout_at(deadline, active_conn.recv()) => {
                match result {
                    Err(_elapsed) => TurnEvent::DeadlineExpired,
                    Ok(Ok(Some(frame))) => TurnEvent::Frame(active, frame),
                    Ok(Ok(None)) => TurnEvent::Disconnected(active),
                    Ok(Err(error)) => {
                        tracing::debug!(
                            session = %self.id, player = %active, %error,
                            "read failed"
                        );
                        TurnEvent::Disconnected(active)
                    }
                }
            }
            result = passive_conn.recv() => {
                match result {
                    Ok(Some(frame)) => TurnEvent::Frame(passive, frame),
                    Ok(None) => TurnEvent::Disconnected(passive),
                    Err(error) => {
                        tracing::debug!(
                            session = %self.id, player = %passive, %error,
                            "read failed"
                        );
                        TurnEvent::Disconnected(passive)
                    }
                }
            }
        }
    }

    // -- Terminal handling ------------------------------------------------

    /// Enters FINISHED and delivers the terminal frames: `YOU_WIN` to
    /// the winner, `YOU_LOSE` to the loser. Best-effort — a peer that
    /// vanishes at this point doesn't un-finish the game.
    async fn finish(&mut self, winner: PlayerId) -> Result<(), SessionError> {
        self.game.advance_to_finished()?;
        let loser = winner.opponent();
        tracing::info!(session = %self.id, %winner, "game over");

        for (player, label) in [(winner, "YOU_WIN"), (loser, "YOU_LOSE")] {
            if let Err(error) = self
                .send_to(player, &Message::GameOver(label.to_string()))
                .await
            {
                tracing::warn!(
                    session = %self.id, %player, %error,
                    "failed to deliver game over"
                );
            }
        }
        Ok(())
    }

    /// Tells the surviving peer its opponent is gone. During playing it
    /// also wins the game outright.
    async fn notify_survivor(&mut self, survivor: PlayerId) {
        let was_playing = self.game.phase() == Phase::Playing;

        let error = Message::Error(ErrorData {
            code: 400,
            description: "Opponent disconnected".into(),
        });
        let _ = self.peers[survivor.index()].send(&build(&error)).await;

        if was_playing {
            let game_over = Message::GameOver("YOU_WIN".into());
            let _ = self.peers[survivor.index()].send(&build(&game_over)).await;
        }
    }

    // -- Wire helpers -----------------------------------------------------

    /// Receives one frame from a specific peer. EOF and I/O errors
    /// become [`SessionError::PeerDisconnected`].
    async fn recv_from(
        &mut self,
        player: PlayerId,
    ) -> Result<String, SessionError> {
        match self.peers[player.index()].recv().await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(SessionError::PeerDisconnected(player)),
            Err(error) => {
                tracing::debug!(
                    session = %self.id, %player, %error, "read failed"
                );
                Err(SessionError::PeerDisconnected(player))
            }
        }
    }

    /// Builds and sends one message to a specific peer. A send failure
    /// means that peer is gone.
    async fn send_to(
        &mut self,
        player: PlayerId,
        msg: &Message,
    ) -> Result<(), SessionError> {
        let frame = build(msg);
        self.peers[player.index()].send(&frame).await.map_err(|error| {
            tracing::debug!(
                session = %self.id, %player, %error, "write failed"
            );
            SessionError::PeerDisconnected(player)
        })
    }

    /// Rejects a peer's input with `ERROR|400,<description>`.
    async fn send_error(
        &mut self,
        player: PlayerId,
        description: &str,
    ) -> Result<(), SessionError> {
        tracing::debug!(
            session = %self.id, %player, description, "rejecting input"
        );
        // The frame grammar forbids '|' inside ERROR payloads.
        let description = description.replace('|', "/");
        self.send_to(
            player,
            &Message::Error(ErrorData {
                code: 400,
                description,
            }),
        )
        .await
    }

    /// Sends each peer its own view of the game: own board in full,
    /// opponent board with `SHIP` masked to `WATER`, and the seconds
    /// left on the current turn (0 outside playing).
    async fn broadcast_status(
        &mut self,
        deadline: Option<Instant>,
    ) -> Result<(), SessionError> {
        let seconds_remaining =
            deadline.map_or(0, |deadline| seconds_until(deadline));

        for player in PlayerId::both() {
            let view = self.game.status_view(player);
            let status = StatusData {
                turn: view.turn,
                board_own: view.own,
                board_opponent: mask_opponent(view.opponent),
                game_state: view.game_state,
                seconds_remaining,
            };
            self.send_to(player, &Message::Status(status)).await?;
        }
        Ok(())
    }
}

/// Replaces `SHIP` with `WATER` in an opponent-board listing. Unshot
/// ships must be indistinguishable from open water on the wire.
fn mask_opponent(cells: Vec<Cell>) -> Vec<Cell> {
    cells
        .into_iter()
        .map(|cell| match cell.state {
            CellState::Ship => Cell {
                coord: cell.coord,
                state: CellState::Water,
            },
            _ => cell,
        })
        .collect()
}

/// Whole seconds until `deadline`, rounded up, clamped at zero. A
/// freshly reset 30-second turn reports 30, not 29.
fn seconds_until(deadline: Instant) -> u32 {
    let remaining = deadline.saturating_duration_since(Instant::now());
    remaining.as_millis().div_ceil(1000) as u32
}

// =========================================================================
// Tests
// =========================================================================
