//! The line codec: `parse` and `build` for `TYPE|PAYLOAD\n` frames.
//!
//! Pure functions, no I/O, no state. The grammar per frame type:
//!
//! ```text
//! PLAYER_ID|<int>
//! REGISTER|<nickname>,<email>
//! PLACE_SHIPS|<ship>(;<ship>)*        <ship>  = <TYPE>:<coord>(,<coord>)*
//! SHOOT|<coord>                       <coord> = <letter><number>
//! STATUS|<turn>;<own>;<opp>;<state>;<secs>
//! SURRENDER|
//! GAME_OVER|<label>
//! ERROR|<code>,<description>
//! ```
//!
//! Parsing is strict enough that `build(parse(f)) == f` byte-for-byte
//! for every accepted frame: integers reject leading zeros, coordinate
//! letters must be uppercase, SURRENDER's payload must be empty.

use crate::error::ProtocolError;
use crate::types::{
    Cell, CellState, Coordinate, ErrorData, GameState, Message, PlayerId,
    RegisterData, Ship, ShipType, StatusData, TurnView,
};

/// Parses one complete frame (including the trailing `\n`) into a
/// [`Message`].
pub fn parse(frame: &str) -> Result<Message, ProtocolError> {
    let body = frame
        .strip_suffix('\n')
        .ok_or(ProtocolError::Unterminated)?;
    if body.contains('\n') {
        // More than one line handed over at once — the framer is
        // supposed to prevent this.
        return Err(ProtocolError::Unterminated);
    }

    let (kind, payload) = body
        .split_once('|')
        .ok_or(ProtocolError::MissingSeparator)?;

    match kind {
        "PLAYER_ID" => parse_player_id(payload),
        "REGISTER" => parse_register(payload),
        "PLACE_SHIPS" => parse_place_ships(payload),
        "SHOOT" => Ok(Message::Shoot(parse_coordinate(payload)?)),
        "STATUS" => parse_status(payload),
        "SURRENDER" => parse_surrender(payload),
        "GAME_OVER" => parse_game_over(payload),
        "ERROR" => parse_error(payload),
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

/// Serializes a [`Message`] into a frame, trailing `\n` included.
pub fn build(msg: &Message) -> String {
    let mut out = String::with_capacity(64);
    match msg {
        Message::PlayerId(id) => {
            out.push_str("PLAYER_ID|");
            out.push_str(&id.as_u8().to_string());
        }
        Message::Register(data) => {
            out.push_str("REGISTER|");
            out.push_str(&data.nickname);
            out.push(',');
            out.push_str(&data.email);
        }
        Message::PlaceShips(ships) => {
            out.push_str("PLACE_SHIPS|");
            for (i, ship) in ships.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(ship.kind.as_str());
                out.push(':');
                push_coordinates(&mut out, &ship.cells);
            }
        }
        Message::Shoot(coord) => {
            out.push_str("SHOOT|");
            out.push_str(&coord.to_string());
        }
        Message::Status(status) => {
            out.push_str("STATUS|");
            out.push_str(status.turn.as_str());
            out.push(';');
            push_board(&mut out, &status.board_own);
            out.push(';');
            push_board(&mut out, &status.board_opponent);
            out.push(';');
            out.push_str(status.game_state.as_str());
            out.push(';');
            out.push_str(&status.seconds_remaining.to_string());
        }
        Message::Surrender => {
            out.push_str("SURRENDER|");
        }
        Message::GameOver(winner) => {
            out.push_str("GAME_OVER|");
            out.push_str(winner);
        }
        Message::Error(data) => {
            out.push_str("ERROR|");
            out.push_str(&data.code.to_string());
            out.push(',');
            out.push_str(&data.description);
        }
    }
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Per-type payload parsers
// ---------------------------------------------------------------------------

fn parse_player_id(payload: &str) -> Result<Message, ProtocolError> {
    let value: u8 = parse_int(payload)
        .map_err(|_| ProtocolError::InvalidPlayerId(payload.to_string()))?;
    Ok(Message::PlayerId(PlayerId::try_from(value)?))
}

fn parse_register(payload: &str) -> Result<Message, ProtocolError> {
    let (nickname, email) = payload.split_once(',').ok_or_else(|| {
        ProtocolError::InvalidPayload(
            "REGISTER expects <nickname>,<email>".into(),
        )
    })?;
    if nickname.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "nickname cannot be empty".into(),
        ));
    }
    if email.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "email cannot be empty".into(),
        ));
    }
    // Commas inside fields are not supported — a second comma is a
    // malformed payload, not part of the email.
    if email.contains(',') {
        return Err(ProtocolError::InvalidPayload(
            "REGISTER fields cannot contain ','".into(),
        ));
    }
    Ok(Message::Register(RegisterData {
        nickname: nickname.to_string(),
        email: email.to_string(),
    }))
}

fn parse_place_ships(payload: &str) -> Result<Message, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "PLACE_SHIPS payload cannot be empty".into(),
        ));
    }
    let mut ships = Vec::new();
    for segment in payload.split(';') {
        if segment.is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "empty ship definition".into(),
            ));
        }
        let (kind, coords) = segment.split_once(':').ok_or_else(|| {
            ProtocolError::InvalidPayload(
                "ship definition expects <type>:<coordinates>".into(),
            )
        })?;
        let kind = ShipType::from_token(kind)?;
        if coords.is_empty() {
            return Err(ProtocolError::InvalidPayload(format!(
                "no coordinates for ship {kind}"
            )));
        }
        let cells = coords
            .split(',')
            .map(parse_coordinate)
            .collect::<Result<Vec<_>, _>>()?;
        ships.push(Ship { kind, cells });
    }
    Ok(Message::PlaceShips(ships))
}

fn parse_status(payload: &str) -> Result<Message, ProtocolError> {
    let mut parts = payload.splitn(5, ';');
    let mut next = |field: &str| {
        parts.next().ok_or_else(|| {
            ProtocolError::InvalidPayload(format!(
                "STATUS is missing the {field} field"
            ))
        })
    };

    let turn = TurnView::from_token(next("turn")?)?;
    let board_own = parse_board(next("own board")?)?;
    let board_opponent = parse_board(next("opponent board")?)?;
    let game_state = GameState::from_token(next("game state")?)?;
    let seconds = next("seconds")?;
    let seconds_remaining: u32 = parse_int(seconds).map_err(|_| {
        ProtocolError::InvalidPayload(format!(
            "invalid seconds remaining {seconds:?}"
        ))
    })?;

    Ok(Message::Status(StatusData {
        turn,
        board_own,
        board_opponent,
        game_state,
        seconds_remaining,
    }))
}

fn parse_surrender(payload: &str) -> Result<Message, ProtocolError> {
    if !payload.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "SURRENDER carries no payload".into(),
        ));
    }
    Ok(Message::Surrender)
}

fn parse_game_over(payload: &str) -> Result<Message, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "GAME_OVER winner label cannot be empty".into(),
        ));
    }
    // The winner label is opaque, but `|` would make the frame
    // ambiguous, so it is rejected outright.
    if payload.contains('|') {
        return Err(ProtocolError::InvalidPayload(
            "GAME_OVER winner label cannot contain '|'".into(),
        ));
    }
    Ok(Message::GameOver(payload.to_string()))
}

fn parse_error(payload: &str) -> Result<Message, ProtocolError> {
    if payload.contains('|') {
        return Err(ProtocolError::InvalidPayload(
            "ERROR payload cannot contain '|'".into(),
        ));
    }
    let (code, description) = payload.split_once(',').ok_or_else(|| {
        ProtocolError::InvalidPayload(
            "ERROR expects <code>,<description>".into(),
        )
    })?;
    let code: u16 = parse_int(code).map_err(|_| {
        ProtocolError::InvalidPayload(format!("invalid error code {code:?}"))
    })?;
    if description.is_empty() {
        return Err(ProtocolError::InvalidPayload(
            "error description cannot be empty".into(),
        ));
    }
    Ok(Message::Error(ErrorData {
        code,
        description: description.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

/// Parses a `<letter><number>` coordinate token.
fn parse_coordinate(token: &str) -> Result<Coordinate, ProtocolError> {
    let invalid = || ProtocolError::InvalidCoordinate(token.to_string());

    let mut chars = token.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    if !letter.is_ascii_uppercase() {
        return Err(invalid());
    }
    let digits = chars.as_str();
    let number: u16 = parse_int(digits).map_err(|_| invalid())?;
    if number == 0 {
        return Err(invalid());
    }
    Ok(Coordinate { letter, number })
}

/// Parses a comma-separated list of `coord:STATE` cells. An empty
/// string is a valid (empty) board listing.
fn parse_board(listing: &str) -> Result<Vec<Cell>, ProtocolError> {
    if listing.is_empty() {
        return Ok(Vec::new());
    }
    listing
        .split(',')
        .map(|entry| {
            let (coord, state) = entry.split_once(':').ok_or_else(|| {
                ProtocolError::InvalidPayload(format!(
                    "board entry {entry:?} expects <coord>:<state>"
                ))
            })?;
            Ok(Cell {
                coord: parse_coordinate(coord)?,
                state: CellState::from_token(state)?,
            })
        })
        .collect()
}

/// Strict decimal integer parse: no sign, no leading zeros (except the
/// literal `"0"`), no surrounding whitespace. Keeps the frame grammar
/// unambiguous so the parse/build round trip is byte-exact.
fn parse_int<T: std::str::FromStr>(token: &str) -> Result<T, ()> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(());
    }
    if token.len() > 1 && token.starts_with('0') {
        return Err(());
    }
    token.parse().map_err(|_| ())
}

fn push_coordinates(out: &mut String, cells: &[Coordinate]) {
    for (i, coord) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&coord.to_string());
    }
}

fn push_board(out: &mut String, cells: &[Cell]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&cell.coord.to_string());
        out.push(':');
        out.push_str(cell.state.as_str());
    }
}

// =========================================================================
// Tests
// =========================================================================
