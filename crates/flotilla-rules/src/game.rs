//! The game: two boards, two fleets, a turn pointer, and a winner.
//!
//! `Game` is the single authority on what happened in a match. The
//! session feeds it parsed messages in whatever order the network
//! produced them; every mutation either succeeds completely or returns
//! a [`RulesError`] and leaves the state untouched.

use std::collections::HashMap;

use flotilla_protocol::{
    Cell, CellState, Coordinate, GameState, PlayerId, RegisterData, Ship,
    ShipType, TurnView,
};

use crate::board::Board;
use crate::phase::{Phase, PhaseGate};
use crate::RulesError;

/// The required fleet composition: class and how many ships of it each
/// player must place. 9 ships, 22 cells in total.
pub const FLEET: [(ShipType, usize); 5] = [
    (ShipType::Portaaviones, 1),
    (ShipType::Buque, 1),
    (ShipType::Crucero, 2),
    (ShipType::Destructor, 2),
    (ShipType::Submarino, 3),
];

/// What a valid shot did to the target board.
///
/// Any of these outcomes passes the turn to the opponent; rejected
/// shots (out of bounds, already-attacked cell) return an error and
/// leave the turn where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Open water. The cell becomes MISS.
    Miss,
    /// Struck a ship cell, but the ship still floats.
    Hit,
    /// Struck the last intact cell of a ship; all its cells are now
    /// SUNK.
    Sunk(ShipType),
}

/// A player's complete, unmasked view of the game.
///
/// The opponent board still shows `SHIP` cells here — hiding them on
/// the wire is the session's responsibility, not a rules concern.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub turn: TurnView,
    pub own: Vec<Cell>,
    pub opponent: Vec<Cell>,
    pub game_state: GameState,
}

/// Per-seat state: identity, board, fleet.
#[derive(Debug, Clone, Default)]
struct PlayerSlot {
    nickname: Option<String>,
    board: Board,
    ships: Vec<Ship>,
    ships_remaining: usize,
    surrendered: bool,
}

impl PlayerSlot {
    /// After a HIT at `coord`, promotes the owning ship to SUNK if
    /// every one of its cells has been hit. Returns the sunk class.
    fn sink_if_complete(
        &mut self,
        coord: Coordinate,
    ) -> Result<Option<ShipType>, RulesError> {
        let Some(ship) = self
            .ships
            .iter()
            .find(|ship| ship.cells.contains(&coord))
            .cloned()
        else {
            // A SHIP cell not belonging to any fleet ship — placement
            // makes this impossible.
            return Ok(None);
        };

        for &cell in &ship.cells {
            if self.board.state(cell)? != CellState::Hit {
                return Ok(None);
            }
        }
        for &cell in &ship.cells {
            self.board.set(cell, CellState::Sunk)?;
        }
        self.ships_remaining -= 1;
        Ok(Some(ship.kind))
    }
}

/// One battleship match between two players.
#[derive(Debug, Clone, Default)]
pub struct Game {
    players: [PlayerSlot; 2],
    gate: PhaseGate,
    current_turn: Option<PlayerId>,
    winner: Option<PlayerId>,
}

impl Game {
    /// A fresh game: empty boards, nobody registered, phase
    /// REGISTRATION.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Phase gate -------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// Registration → Placement.
    pub fn advance_to_placement(&mut self) -> Result<(), RulesError> {
        self.gate.to_placement()
    }

    /// Placement → Playing. Player 1 holds the first turn.
    pub fn advance_to_playing(&mut self) -> Result<(), RulesError> {
        self.gate.to_playing()?;
        self.current_turn = Some(PlayerId::One);
        Ok(())
    }

    /// Playing → Finished.
    pub fn advance_to_finished(&mut self) -> Result<(), RulesError> {
        self.gate.to_finished()?;
        self.current_turn = None;
        Ok(())
    }

    // -- Registration -----------------------------------------------------

    /// Claims a seat's nickname. The email is an opaque label the rules
    /// never look at; it is accepted and dropped.
    pub fn register(
        &mut self,
        player: PlayerId,
        data: &RegisterData,
    ) -> Result<(), RulesError> {
        if data.nickname.is_empty() {
            return Err(RulesError::EmptyNickname);
        }
        let slot = &mut self.players[player.index()];
        if slot.nickname.is_some() {
            return Err(RulesError::AlreadyRegistered(player));
        }
        slot.nickname = Some(data.nickname.clone());
        tracing::debug!(%player, nickname = %data.nickname, "player registered");
        Ok(())
    }

    pub fn both_registered(&self) -> bool {
        self.players.iter().all(|slot| slot.nickname.is_some())
    }

    pub fn nickname(&self, player: PlayerId) -> Option<&str> {
        self.players[player.index()].nickname.as_deref()
    }

    // -- Placement --------------------------------------------------------

    /// Number of ships a seat has placed (0 or 9 — fleets land whole).
    pub fn ships_placed(&self, player: PlayerId) -> usize {
        self.players[player.index()].ships.len()
    }

    pub fn both_placed(&self) -> bool {
        let expected: usize = FLEET.iter().map(|&(_, count)| count).sum();
        self.players
            .iter()
            .all(|slot| slot.ships.len() == expected)
    }

    /// How many of a seat's ships are still afloat.
    pub fn ships_remaining(&self, player: PlayerId) -> usize {
        self.players[player.index()].ships_remaining
    }

    /// Validates and places a seat's entire fleet.
    ///
    /// The whole fleet is checked first (composition, per-ship size and
    /// shape, bounds, overlap) and only then committed, so a rejected
    /// fleet leaves the board untouched and the peer can retry.
    pub fn place_ships(
        &mut self,
        player: PlayerId,
        ships: Vec<Ship>,
    ) -> Result<(), RulesError> {
        if !self.players[player.index()].ships.is_empty() {
            return Err(RulesError::FleetAlreadyPlaced(player));
        }
        if !self.both_registered() {
            return Err(RulesError::NotBothRegistered);
        }

        validate_fleet(&ships)?;

        let mut occupied = [false; 100];
        for ship in &ships {
            for &coord in &ship.cells {
                let index = Board::index(coord)?;
                if occupied[index] {
                    return Err(RulesError::Overlap(coord));
                }
                occupied[index] = true;
            }
        }

        let slot = &mut self.players[player.index()];
        for ship in &ships {
            for &coord in &ship.cells {
                slot.board.set(coord, CellState::Ship)?;
            }
        }
        slot.ships_remaining = ships.len();
        slot.ships = ships;
        tracing::debug!(%player, "fleet placed");
        Ok(())
    }

    // -- Playing ----------------------------------------------------------

    /// The seat holding the turn. `None` outside the playing phase.
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    /// Resolves a shot from `shooter` at `coord`.
    ///
    /// A valid shot (MISS, HIT or SUNK) passes the turn to the
    /// opponent. Shooting out of turn, out of bounds, after the game
    /// ended, or at an already-resolved cell is rejected with an error
    /// and the turn stays with the shooter.
    pub fn process_shot(
        &mut self,
        shooter: PlayerId,
        coord: Coordinate,
    ) -> Result<ShotOutcome, RulesError> {
        if self.winner.is_some() {
            return Err(RulesError::GameAlreadyOver);
        }
        if self.current_turn != Some(shooter) {
            return Err(RulesError::NotYourTurn(shooter));
        }

        let target = shooter.opponent();
        let slot = &mut self.players[target.index()];
        let outcome = match slot.board.state(coord)? {
            CellState::Miss | CellState::Hit | CellState::Sunk => {
                return Err(RulesError::AlreadyAttacked(coord));
            }
            CellState::Water => {
                slot.board.set(coord, CellState::Miss)?;
                ShotOutcome::Miss
            }
            CellState::Ship => {
                slot.board.set(coord, CellState::Hit)?;
                match slot.sink_if_complete(coord)? {
                    Some(kind) => ShotOutcome::Sunk(kind),
                    None => ShotOutcome::Hit,
                }
            }
        };

        self.current_turn = Some(target);

        if matches!(outcome, ShotOutcome::Sunk(_))
            && self.players[target.index()].ships_remaining == 0
        {
            self.winner = Some(shooter);
            tracing::info!(winner = %shooter, "all ships sunk, game over");
        }

        Ok(outcome)
    }

    /// Passes the turn without a shot — the deadline ran out. The turn
    /// is lost; the game continues.
    pub fn forfeit_turn(&mut self) -> Result<PlayerId, RulesError> {
        if self.winner.is_some() {
            return Err(RulesError::GameAlreadyOver);
        }
        let Some(current) = self.current_turn else {
            return Err(RulesError::NoTurnInProgress);
        };
        let next = current.opponent();
        self.current_turn = Some(next);
        tracing::debug!(forfeited = %current, "turn forfeited on timeout");
        Ok(next)
    }

    /// `player` gives up. The opponent wins immediately.
    pub fn surrender(
        &mut self,
        player: PlayerId,
    ) -> Result<PlayerId, RulesError> {
        if self.winner.is_some() {
            return Err(RulesError::GameAlreadyOver);
        }
        let winner = player.opponent();
        self.players[player.index()].surrendered = true;
        self.winner = Some(winner);
        tracing::info!(surrendered = %player, %winner, "player surrendered");
        Ok(winner)
    }

    // -- Queries ----------------------------------------------------------

    /// Whether a terminal condition has been reached.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// The winning seat, once the game is over.
    pub fn winner(&self) -> Result<PlayerId, RulesError> {
        self.winner.ok_or(RulesError::GameNotOver)
    }

    /// The game from `player`'s perspective: their own board, the
    /// opponent's board (unmasked — see [`StatusView`]), the turn as
    /// they see it, and the derived coarse game state.
    pub fn status_view(&self, player: PlayerId) -> StatusView {
        let turn = if self.current_turn == Some(player) {
            TurnView::YourTurn
        } else {
            TurnView::OpponentTurn
        };
        let game_state = if self.gate.is_finished() {
            GameState::Ended
        } else if self.both_registered() && self.both_placed() {
            GameState::Ongoing
        } else {
            GameState::Waiting
        };
        StatusView {
            turn,
            own: self.players[player.index()].board.cells(),
            opponent: self.players[player.opponent().index()].board.cells(),
            game_state,
        }
    }
}

// ---------------------------------------------------------------------------
// Fleet validation
// ---------------------------------------------------------------------------

/// Checks composition (ship count, per-class counts), per-ship cell
/// counts, and per-ship shape. Bounds and overlap are checked by the
/// caller against the board.
fn validate_fleet(ships: &[Ship]) -> Result<(), RulesError> {
    let expected_total: usize = FLEET.iter().map(|&(_, count)| count).sum();
    if ships.len() != expected_total {
        return Err(RulesError::WrongShipCount {
            expected: expected_total,
            got: ships.len(),
        });
    }

    let mut counts: HashMap<ShipType, usize> = HashMap::new();
    for ship in ships {
        *counts.entry(ship.kind).or_default() += 1;
        let expected = ship.kind.cells();
        if ship.cells.len() != expected {
            return Err(RulesError::WrongShipSize {
                kind: ship.kind,
                expected,
                got: ship.cells.len(),
            });
        }
        validate_shape(ship)?;
    }

    for &(kind, expected) in &FLEET {
        let got = counts.get(&kind).copied().unwrap_or(0);
        if got != expected {
            return Err(RulesError::WrongClassCount {
                kind,
                expected,
                got,
            });
        }
    }
    Ok(())
}

/// A ship of 2+ cells must lie in one row or one column, with
/// consecutive positions. Orientation is implied, never transmitted.
fn validate_shape(ship: &Ship) -> Result<(), RulesError> {
    if ship.cells.len() < 2 {
        return Ok(());
    }

    let first = ship.cells[0];
    let same_row = ship.cells.iter().all(|c| c.letter == first.letter);
    let same_col = ship.cells.iter().all(|c| c.number == first.number);

    let mut positions: Vec<u16> = if same_row {
        ship.cells.iter().map(|c| c.number).collect()
    } else if same_col {
        ship.cells.iter().map(|c| c.letter as u16).collect()
    } else {
        return Err(RulesError::ShipNotStraight(ship.kind));
    };

    positions.sort_unstable();
    let contiguous = positions.windows(2).all(|pair| pair[1] == pair[0] + 1);
    if !contiguous {
        return Err(RulesError::ShipNotStraight(ship.kind));
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(letter: char, number: u16) -> Coordinate {
        Coordinate { letter, number }
    }

    fn ship(kind: ShipType, cells: &[(char, u16)]) -> Ship {
        Ship {
            kind,
            cells: cells.iter().map(|&(l, n)| coord(l, n)).collect(),
        }
    }

    /// A legal fleet: 9 ships on rows A-F, nothing touching.
    fn sample_fleet() -> Vec<Ship> {
        vec![
            ship(ShipType::Portaaviones, &[
                ('A', 1), ('A', 2), ('A', 3), ('A', 4), ('A', 5),
            ]),
            ship(ShipType::Buque, &[('B', 1), ('B', 2), ('B', 3), ('B', 4)]),
            ship(ShipType::Crucero, &[('C', 1), ('C', 2), ('C', 3)]),
            ship(ShipType::Crucero, &[('C', 5), ('C', 6), ('C', 7)]),
            ship(ShipType::Destructor, &[('D', 1), ('D', 2)]),
            ship(ShipType::Destructor, &[('D', 4), ('D', 5)]),
            ship(ShipType::Submarino, &[('F', 1)]),
            ship(ShipType::Submarino, &[('F', 3)]),
            ship(ShipType::Submarino, &[('F', 5)]),
        ]
    }

    fn register_data(nickname: &str) -> RegisterData {
        RegisterData {
            nickname: nickname.into(),
            email: format!("{}@example.com", nickname.to_lowercase()),
        }
    }

    /// A game with both players registered and both fleets placed,
    /// advanced into the playing phase.
    fn playing_game() -> Game {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();
        game.advance_to_placement().unwrap();
        game.place_ships(PlayerId::One, sample_fleet()).unwrap();
        game.place_ships(PlayerId::Two, sample_fleet()).unwrap();
        game.advance_to_playing().unwrap();
        game
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_both_players() {
        let mut game = Game::new();
        assert!(!game.both_registered());

        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        assert!(!game.both_registered());

        game.register(PlayerId::Two, &register_data("Bob")).unwrap();
        assert!(game.both_registered());
        assert_eq!(game.nickname(PlayerId::One), Some("Alice"));
        assert_eq!(game.nickname(PlayerId::Two), Some("Bob"));
    }

    #[test]
    fn test_register_empty_nickname_fails() {
        let mut game = Game::new();
        let data = RegisterData {
            nickname: String::new(),
            email: "a@x".into(),
        };
        assert!(matches!(
            game.register(PlayerId::One, &data),
            Err(RulesError::EmptyNickname)
        ));
    }

    #[test]
    fn test_register_taken_seat_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        let result = game.register(PlayerId::One, &register_data("Mallory"));
        assert!(matches!(
            result,
            Err(RulesError::AlreadyRegistered(PlayerId::One))
        ));
        // The original registration must survive the failed attempt.
        assert_eq!(game.nickname(PlayerId::One), Some("Alice"));
    }

    // =====================================================================
    // place_ships()
    // =====================================================================

    #[test]
    fn test_place_ships_before_both_registered_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        let result = game.place_ships(PlayerId::One, sample_fleet());
        assert!(matches!(result, Err(RulesError::NotBothRegistered)));
    }

    #[test]
    fn test_place_ships_success_marks_cells() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();
        game.place_ships(PlayerId::One, sample_fleet()).unwrap();

        assert_eq!(game.ships_placed(PlayerId::One), 9);
        let view = game.status_view(PlayerId::One);
        let ship_cells = view
            .own
            .iter()
            .filter(|cell| cell.state == CellState::Ship)
            .count();
        assert_eq!(ship_cells, 22);
    }

    #[test]
    fn test_place_ships_twice_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();
        game.place_ships(PlayerId::One, sample_fleet()).unwrap();
        assert!(matches!(
            game.place_ships(PlayerId::One, sample_fleet()),
            Err(RulesError::FleetAlreadyPlaced(PlayerId::One))
        ));
    }

    #[test]
    fn test_place_ships_wrong_count_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let one_ship = vec![sample_fleet().remove(0)];
        let err = game.place_ships(PlayerId::One, one_ship).unwrap_err();
        assert!(matches!(
            err,
            RulesError::WrongShipCount { expected: 9, got: 1 }
        ));
        // The error message has to tell the peer what was wrong.
        assert!(err.to_string().contains("number of ships"));
    }

    #[test]
    fn test_place_ships_wrong_class_count_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        // Swap a submarine for a third destroyer: still 9 ships.
        let mut fleet = sample_fleet();
        fleet[8] = ship(ShipType::Destructor, &[('F', 5), ('F', 6)]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::WrongClassCount { .. })
        ));
    }

    #[test]
    fn test_place_ships_wrong_size_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        // Carrier with 4 cells instead of 5.
        fleet[0] = ship(ShipType::Portaaviones, &[
            ('A', 1), ('A', 2), ('A', 3), ('A', 4),
        ]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::WrongShipSize { .. })
        ));
    }

    #[test]
    fn test_place_ships_diagonal_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        fleet[4] = ship(ShipType::Destructor, &[('D', 1), ('E', 2)]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::ShipNotStraight(ShipType::Destructor))
        ));
    }

    #[test]
    fn test_place_ships_gap_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        // D1 and D3 are in one row but not adjacent.
        fleet[4] = ship(ShipType::Destructor, &[('D', 1), ('D', 3)]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::ShipNotStraight(_))
        ));
    }

    #[test]
    fn test_place_ships_vertical_is_legal() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        // Rotate a destroyer into column 10, rows G-H.
        fleet[5] = ship(ShipType::Destructor, &[('G', 10), ('H', 10)]);
        game.place_ships(PlayerId::One, fleet).unwrap();
    }

    #[test]
    fn test_place_ships_out_of_bounds_fails() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        fleet[6] = ship(ShipType::Submarino, &[('K', 1)]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_place_ships_overlap_fails_and_leaves_board_clean() {
        let mut game = Game::new();
        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();

        let mut fleet = sample_fleet();
        // Put a submarine on top of the carrier.
        fleet[6] = ship(ShipType::Submarino, &[('A', 1)]);
        assert!(matches!(
            game.place_ships(PlayerId::One, fleet),
            Err(RulesError::Overlap(_))
        ));

        // Rejected fleet must not leave partial ships behind.
        let view = game.status_view(PlayerId::One);
        assert!(view.own.iter().all(|cell| cell.state == CellState::Water));

        // A corrected fleet still goes through.
        game.place_ships(PlayerId::One, sample_fleet()).unwrap();
    }

    // =====================================================================
    // process_shot()
    // =====================================================================

    #[test]
    fn test_first_turn_belongs_to_player_one() {
        let game = playing_game();
        assert_eq!(game.current_turn(), Some(PlayerId::One));
        assert_eq!(
            game.status_view(PlayerId::One).turn,
            TurnView::YourTurn
        );
        assert_eq!(
            game.status_view(PlayerId::Two).turn,
            TurnView::OpponentTurn
        );
    }

    #[test]
    fn test_shot_out_of_turn_fails_and_keeps_turn() {
        let mut game = playing_game();
        let result = game.process_shot(PlayerId::Two, coord('A', 1));
        assert!(matches!(
            result,
            Err(RulesError::NotYourTurn(PlayerId::Two))
        ));
        assert_eq!(game.current_turn(), Some(PlayerId::One));
    }

    #[test]
    fn test_miss_marks_cell_and_passes_turn() {
        let mut game = playing_game();
        let outcome = game.process_shot(PlayerId::One, coord('J', 10)).unwrap();
        assert_eq!(outcome, ShotOutcome::Miss);
        assert_eq!(game.current_turn(), Some(PlayerId::Two));

        let view = game.status_view(PlayerId::One);
        let cell = view
            .opponent
            .iter()
            .find(|cell| cell.coord == coord('J', 10))
            .unwrap();
        assert_eq!(cell.state, CellState::Miss);
    }

    #[test]
    fn test_hit_marks_cell_and_passes_turn() {
        let mut game = playing_game();
        let outcome = game.process_shot(PlayerId::One, coord('A', 1)).unwrap();
        assert_eq!(outcome, ShotOutcome::Hit);
        assert_eq!(game.current_turn(), Some(PlayerId::Two));
    }

    #[test]
    fn test_repeat_shot_rejected_turn_stays() {
        let mut game = playing_game();
        game.process_shot(PlayerId::One, coord('J', 10)).unwrap();
        game.process_shot(PlayerId::Two, coord('J', 10)).unwrap();

        // Player one shoots the same water cell again.
        let result = game.process_shot(PlayerId::One, coord('J', 10));
        assert!(matches!(result, Err(RulesError::AlreadyAttacked(_))));
        assert_eq!(game.current_turn(), Some(PlayerId::One));
    }

    #[test]
    fn test_out_of_bounds_shot_rejected_turn_stays() {
        let mut game = playing_game();
        let result = game.process_shot(PlayerId::One, coord('Z', 42));
        assert!(matches!(result, Err(RulesError::OutOfBounds(_))));
        assert_eq!(game.current_turn(), Some(PlayerId::One));
    }

    #[test]
    fn test_sinking_a_submarine() {
        let mut game = playing_game();
        assert_eq!(game.ships_remaining(PlayerId::Two), 9);

        // F1 is a one-cell submarine: a single hit sinks it.
        let outcome = game.process_shot(PlayerId::One, coord('F', 1)).unwrap();
        assert_eq!(outcome, ShotOutcome::Sunk(ShipType::Submarino));
        assert_eq!(game.ships_remaining(PlayerId::Two), 8);

        let view = game.status_view(PlayerId::One);
        let cell = view
            .opponent
            .iter()
            .find(|cell| cell.coord == coord('F', 1))
            .unwrap();
        assert_eq!(cell.state, CellState::Sunk);
        assert!(!game.is_over());
    }

    #[test]
    fn test_sinking_promotes_every_cell_of_the_ship() {
        let mut game = playing_game();
        // Trade turns: player one works through the destroyer at D1-D2,
        // player two shoots open water.
        game.process_shot(PlayerId::One, coord('D', 1)).unwrap();
        game.process_shot(PlayerId::Two, coord('J', 1)).unwrap();
        let outcome = game.process_shot(PlayerId::One, coord('D', 2)).unwrap();
        assert_eq!(outcome, ShotOutcome::Sunk(ShipType::Destructor));

        let view = game.status_view(PlayerId::One);
        for number in [1, 2] {
            let cell = view
                .opponent
                .iter()
                .find(|cell| cell.coord == coord('D', number))
                .unwrap();
            assert_eq!(cell.state, CellState::Sunk);
        }
    }

    #[test]
    fn test_cells_never_transition_backwards() {
        let mut game = playing_game();
        game.process_shot(PlayerId::One, coord('A', 1)).unwrap(); // HIT
        game.process_shot(PlayerId::Two, coord('J', 1)).unwrap(); // MISS

        // Hitting the HIT cell again is rejected, state unchanged.
        assert!(game.process_shot(PlayerId::One, coord('A', 1)).is_err());
        let view = game.status_view(PlayerId::One);
        let cell = view
            .opponent
            .iter()
            .find(|cell| cell.coord == coord('A', 1))
            .unwrap();
        assert_eq!(cell.state, CellState::Hit);
    }

    // =====================================================================
    // forfeit_turn() / surrender()
    // =====================================================================

    #[test]
    fn test_forfeit_passes_turn_without_a_shot() {
        let mut game = playing_game();
        let next = game.forfeit_turn().unwrap();
        assert_eq!(next, PlayerId::Two);
        assert_eq!(game.current_turn(), Some(PlayerId::Two));
        assert!(!game.is_over());
    }

    #[test]
    fn test_surrender_ends_game_with_opponent_as_winner() {
        let mut game = playing_game();
        let winner = game.surrender(PlayerId::Two).unwrap();
        assert_eq!(winner, PlayerId::One);
        assert!(game.is_over());
        assert_eq!(game.winner().unwrap(), PlayerId::One);
    }

    #[test]
    fn test_actions_after_game_over_fail() {
        let mut game = playing_game();
        game.surrender(PlayerId::Two).unwrap();
        assert!(matches!(
            game.process_shot(PlayerId::One, coord('A', 1)),
            Err(RulesError::GameAlreadyOver)
        ));
        assert!(matches!(
            game.forfeit_turn(),
            Err(RulesError::GameAlreadyOver)
        ));
        assert!(matches!(
            game.surrender(PlayerId::One),
            Err(RulesError::GameAlreadyOver)
        ));
    }

    #[test]
    fn test_winner_before_game_over_fails() {
        let game = playing_game();
        assert!(matches!(game.winner(), Err(RulesError::GameNotOver)));
    }

    // =====================================================================
    // status_view()
    // =====================================================================

    #[test]
    fn test_game_state_progression() {
        let mut game = Game::new();
        assert_eq!(
            game.status_view(PlayerId::One).game_state,
            GameState::Waiting
        );

        game.register(PlayerId::One, &register_data("Alice")).unwrap();
        game.register(PlayerId::Two, &register_data("Bob")).unwrap();
        game.advance_to_placement().unwrap();
        assert_eq!(
            game.status_view(PlayerId::One).game_state,
            GameState::Waiting
        );

        game.place_ships(PlayerId::One, sample_fleet()).unwrap();
        game.place_ships(PlayerId::Two, sample_fleet()).unwrap();
        game.advance_to_playing().unwrap();
        assert_eq!(
            game.status_view(PlayerId::One).game_state,
            GameState::Ongoing
        );

        game.surrender(PlayerId::Two).unwrap();
        game.advance_to_finished().unwrap();
        assert_eq!(
            game.status_view(PlayerId::One).game_state,
            GameState::Ended
        );
    }

    #[test]
    fn test_status_view_boards_are_complete() {
        let game = playing_game();
        let view = game.status_view(PlayerId::Two);
        assert_eq!(view.own.len(), 100);
        assert_eq!(view.opponent.len(), 100);
    }
}
