//! Wire-facing event types.
//!
//! JSON shapes mirror the browser client's protocol: tagged events in
//! camelCase, grids as nine-element arrays with `null` for empty cells.

use crate::game::{Cell, Mark, Outcome};
use crate::store::Room;
use serde::{Deserialize, Serialize};

/// Events a client sends over the socket. Disconnect is implicit in the
/// socket closing and has no inbound representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Open a new room; the caller becomes participant X.
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        /// Name shown to the opponent.
        display_name: String,
    },
    /// Join an existing room as participant O.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        /// Code of the room to join.
        room_code: String,
        /// Name shown to the opponent.
        display_name: String,
    },
    /// Place the caller's mark at a grid index.
    #[serde(rename_all = "camelCase")]
    MakeMove {
        /// Code of the room to move in.
        room_code: String,
        /// Grid index 0-8.
        index: usize,
    },
    /// Restart the game in a room without touching membership.
    #[serde(rename_all = "camelCase")]
    Reset {
        /// Code of the room to reset.
        room_code: String,
    },
}

/// Public view of one participant. Connection IDs never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    /// Display name.
    pub display_name: String,
    /// Assigned mark.
    pub mark: Mark,
}

/// Full state sync sent to both participants on join and after every
/// non-terminal move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    /// Grid cells in row-major order, `null` for empty.
    pub grid: Vec<Option<Mark>>,
    /// Mark currently permitted to move.
    pub turn: Mark,
    /// Participants in join order.
    pub participants: Vec<ParticipantView>,
}

impl GameStateView {
    /// Builds the view from a live room.
    pub fn from_room(room: &Room) -> Self {
        Self {
            grid: room
                .grid
                .cells()
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => None,
                    Cell::Taken(mark) => Some(*mark),
                })
                .collect(),
            turn: room.turn,
            participants: room
                .participants
                .iter()
                .map(|p| ParticipantView {
                    display_name: p.display_name.clone(),
                    mark: p.mark,
                })
                .collect(),
        }
    }
}

/// Terminal result. `winner` is absent for a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverView {
    /// Winning participant's name, if any.
    pub winner_name: Option<String>,
    /// Winning participant's mark, if any.
    pub winner_mark: Option<Mark>,
    /// The completed index triple, if any.
    pub winning_line: Option<[usize; 3]>,
}

impl GameOverView {
    /// Builds the terminal view for the given outcome in a room.
    ///
    /// A `Win` resolves the winner's name by mark; anything non-terminal
    /// is treated as a draw view, which the coordinator never produces.
    pub fn from_outcome(room: &Room, outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Win { mark, line } => Self {
                winner_name: room
                    .participants
                    .iter()
                    .find(|p| p.mark == *mark)
                    .map(|p| p.display_name.clone()),
                winner_mark: Some(*mark),
                winning_line: Some(*line),
            },
            _ => Self {
                winner_name: None,
                winner_mark: None,
                winning_line: None,
            },
        }
    }
}

/// Events the server sends to one or both participants of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Direct reply to `createRoom` with the reserved code.
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        /// The code the creator shares with the opponent.
        room_code: String,
    },
    /// Direct reply to a successful `joinRoom`.
    #[serde(rename_all = "camelCase")]
    Joined {
        /// Code of the joined room.
        room_code: String,
    },
    /// Informational message, single or room-wide.
    Status {
        /// Human-readable text.
        message: String,
    },
    /// Full state sync.
    GameState(GameStateView),
    /// Terminal result; the room is gone once this is sent.
    GameOver(GameOverView),
    /// Rejected action, sent only to the requester.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_round_trip() {
        let json = r#"{"type":"joinRoom","roomCode":"4821","displayName":"Ada"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::JoinRoom {
                ref room_code,
                ref display_name,
            } => {
                assert_eq!(room_code, "4821");
                assert_eq!(display_name, "Ada");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_make_move_tag() {
        let json = r#"{"type":"makeMove","roomCode":"4821","index":4}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ClientEvent::MakeMove { index: 4, .. }));
    }

    #[test]
    fn test_server_event_grid_uses_nulls() {
        let view = GameStateView {
            grid: vec![None, Some(Mark::X), None, None, None, None, None, None, None],
            turn: Mark::O,
            participants: vec![],
        };
        let json = serde_json::to_string(&ServerEvent::GameState(view)).unwrap();
        assert!(json.contains(r#""grid":[null,"x",null"#));
        assert!(json.contains(r#""type":"gameState""#));
    }
}
