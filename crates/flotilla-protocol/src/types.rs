//! Core protocol types for Flotilla's wire format.
//!
//! These are the structures that travel on the wire as `TYPE|PAYLOAD`
//! lines — the "language" that the server and clients speak. They carry
//! no behavior beyond conversions to and from their wire tokens; the
//! grammar itself lives in [`crate::codec`].

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// One of the two seats in a session.
///
/// A session holds exactly two players, so this is a two-valued enum
/// rather than a numeric newtype: there is no valid third id, and the
/// compiler enforces it. The wire representation is the integer 1 or 2
/// (the `PLAYER_ID` payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    /// The other seat. Used everywhere turn-taking or targeting flips
    /// between the two players.
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Wire integer (1 or 2).
    pub fn as_u8(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    /// Zero-based index, for `[T; 2]` slot arrays.
    pub fn index(self) -> usize {
        self.as_u8() as usize - 1
    }

    /// Both seats, in seat order. Handy for "do this for each player"
    /// loops.
    pub fn both() -> [PlayerId; 2] {
        [PlayerId::One, PlayerId::Two]
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(ProtocolError::InvalidPlayerId(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Board vocabulary
// ---------------------------------------------------------------------------

/// A board coordinate such as `A5`: a row letter and a 1-based column
/// number.
///
/// The codec only checks the *shape* of a coordinate (one uppercase
/// letter, a positive number without leading zeros). Whether it falls
/// inside the 10×10 board is a game rule, checked by the rules engine —
/// `Z99` parses fine and is rejected as out of bounds later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// Row label, `A`..=`Z` as far as the codec cares.
    pub letter: char,
    /// Column number, 1-based.
    pub number: u16,
}

impl Coordinate {
    pub fn new(letter: char, number: u16) -> Self {
        Self { letter, number }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.number)
    }
}

/// The state of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Water,
    Ship,
    Hit,
    Sunk,
    Miss,
}

impl CellState {
    /// Wire token for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            CellState::Water => "WATER",
            CellState::Ship => "SHIP",
            CellState::Hit => "HIT",
            CellState::Sunk => "SUNK",
            CellState::Miss => "MISS",
        }
    }

    pub(crate) fn from_token(token: &str) -> Result<Self, ProtocolError> {
        match token {
            "WATER" => Ok(CellState::Water),
            "SHIP" => Ok(CellState::Ship),
            "HIT" => Ok(CellState::Hit),
            "SUNK" => Ok(CellState::Sunk),
            "MISS" => Ok(CellState::Miss),
            other => Err(ProtocolError::UnknownCellState(other.to_string())),
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate together with its state — one entry in a STATUS board
/// listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub coord: Coordinate,
    pub state: CellState,
}

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// The five ship classes of the fleet.
///
/// Each class has a fixed length; the full fleet composition (how many
/// of each) is a rules-engine concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipType {
    /// Aircraft carrier, 5 cells.
    Portaaviones,
    /// Battleship, 4 cells.
    Buque,
    /// Cruiser, 3 cells.
    Crucero,
    /// Destroyer, 2 cells.
    Destructor,
    /// Submarine, 1 cell.
    Submarino,
}

impl ShipType {
    /// Number of cells a ship of this class occupies.
    pub fn cells(self) -> usize {
        match self {
            ShipType::Portaaviones => 5,
            ShipType::Buque => 4,
            ShipType::Crucero => 3,
            ShipType::Destructor => 2,
            ShipType::Submarino => 1,
        }
    }

    /// Wire token for this class.
    pub fn as_str(self) -> &'static str {
        match self {
            ShipType::Portaaviones => "PORTAAVIONES",
            ShipType::Buque => "BUQUE",
            ShipType::Crucero => "CRUCERO",
            ShipType::Destructor => "DESTRUCTOR",
            ShipType::Submarino => "SUBMARINO",
        }
    }

    pub(crate) fn from_token(token: &str) -> Result<Self, ProtocolError> {
        match token {
            "PORTAAVIONES" => Ok(ShipType::Portaaviones),
            "BUQUE" => Ok(ShipType::Buque),
            "CRUCERO" => Ok(ShipType::Crucero),
            "DESTRUCTOR" => Ok(ShipType::Destructor),
            "SUBMARINO" => Ok(ShipType::Submarino),
            other => Err(ProtocolError::UnknownShipType(other.to_string())),
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ship as declared in a PLACE_SHIPS payload: a class plus the cells
/// it occupies, in the order the client listed them.
///
/// Orientation is never transmitted — it is implied by the coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    pub kind: ShipType,
    pub cells: Vec<Coordinate>,
}

// ---------------------------------------------------------------------------
// Status vocabulary
// ---------------------------------------------------------------------------

/// Whose turn it is, from the recipient's point of view.
///
/// The server never broadcasts "player 1's turn" — each peer gets its
/// own view, so the same game moment serializes as `YOUR_TURN` on one
/// socket and `OPPONENT_TURN` on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnView {
    YourTurn,
    OpponentTurn,
}

impl TurnView {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnView::YourTurn => "YOUR_TURN",
            TurnView::OpponentTurn => "OPPONENT_TURN",
        }
    }

    pub(crate) fn from_token(token: &str) -> Result<Self, ProtocolError> {
        match token {
            "YOUR_TURN" => Ok(TurnView::YourTurn),
            "OPPONENT_TURN" => Ok(TurnView::OpponentTurn),
            other => Err(ProtocolError::UnknownTurn(other.to_string())),
        }
    }
}

impl fmt::Display for TurnView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse game progress as reported in STATUS frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Registration or placement still pending.
    Waiting,
    /// Both fleets placed, shots being exchanged.
    Ongoing,
    /// A terminal condition was reached.
    Ended,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Waiting => "WAITING",
            GameState::Ongoing => "ONGOING",
            GameState::Ended => "ENDED",
        }
    }

    pub(crate) fn from_token(token: &str) -> Result<Self, ProtocolError> {
        match token {
            "WAITING" => Ok(GameState::Waiting),
            "ONGOING" => Ok(GameState::Ongoing),
            "ENDED" => Ok(GameState::Ended),
            other => Err(ProtocolError::UnknownGameState(other.to_string())),
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Message payloads
// ---------------------------------------------------------------------------

/// Payload of a REGISTER frame. The email is an opaque label — the
/// server never verifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterData {
    pub nickname: String,
    pub email: String,
}

/// Payload of a STATUS frame: the complete per-peer view of the game.
///
/// Both board listings may be empty on the wire; when present they are
/// `coord:STATE` entries. `seconds_remaining` counts down the current
/// turn and is 0 outside the playing phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusData {
    pub turn: TurnView,
    pub board_own: Vec<Cell>,
    pub board_opponent: Vec<Cell>,
    pub game_state: GameState,
    pub seconds_remaining: u32,
}

/// Payload of an ERROR frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorData {
    pub code: u16,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Message — the wire alphabet
// ---------------------------------------------------------------------------

/// Every message that can travel on the wire, in either direction.
///
/// One variant per frame type. The codec is a total function over this
/// alphabet: [`crate::build`] never fails, [`crate::parse`] yields
/// exactly one of these or a [`ProtocolError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// S→C, sent once right after pairing: which seat the peer holds.
    PlayerId(PlayerId),
    /// C→S: claim a nickname (and an opaque email label).
    Register(RegisterData),
    /// C→S: the full fleet, all at once.
    PlaceShips(Vec<Ship>),
    /// C→S: fire at a coordinate.
    Shoot(Coordinate),
    /// S→C: the recipient's current view of the game.
    Status(StatusData),
    /// C→S: give up. Carries no payload (but keeps the `|`).
    Surrender,
    /// S→C, terminal: an opaque winner label (`YOU_WIN` / `YOU_LOSE`).
    GameOver(String),
    /// S→C: something was rejected; the session carries on.
    Error(ErrorData),
}
