//! Room lifecycle and turn-taking orchestration.
//!
//! The coordinator validates every inbound event against the authoritative
//! room state, mutates the store, and returns the addressed notifications
//! the gateway should deliver. It performs no I/O itself, so every
//! operation is a synchronous call with a discriminated result: delivery
//! and retry policy stay with the transport layer.

use crate::game::{self, Mark, MoveError, Outcome};
use crate::protocol::{GameOverView, GameStateView, ServerEvent};
use crate::store::{ConnectionId, Participant, Room, RoomCode, RoomStatus, RoomStore};
use derive_more::{Display, Error, From};
use tracing::{info, instrument, warn};

/// Rejected actions. All are recoverable, reported only to the requesting
/// connection, and never terminate the room or the opponent's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum RoomError {
    /// No live room under the given code.
    #[display("room not found")]
    RoomNotFound,
    /// Room already has two participants.
    #[display("room is full")]
    RoomFull,
    /// Code is not a four-digit token.
    #[display("invalid room code format")]
    InvalidRoomCodeFormat,
    /// Requester's mark is not the room's current turn, or the game has
    /// not started yet.
    #[display("not your turn")]
    NotYourTurn,
    /// Move rejected by the rules (occupied cell or bad index).
    #[display("invalid move: {_0}")]
    #[from]
    InvalidMove(MoveError),
}

/// A notification addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Destination connection.
    pub to: ConnectionId,
    /// Event to deliver.
    pub event: ServerEvent,
}

impl Outbound {
    fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

fn broadcast(room: &Room, event: ServerEvent) -> Vec<Outbound> {
    room.participants
        .iter()
        .map(|p| Outbound::new(p.connection_id, event.clone()))
        .collect()
}

/// Orchestrates create/join/move/reset/disconnect against the room store.
#[derive(Debug, Default)]
pub struct RoomCoordinator {
    store: RoomStore,
}

impl RoomCoordinator {
    /// Creates a coordinator with an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self {
            store: RoomStore::new(),
        }
    }

    /// Read access to the store, mainly for inspection in tests.
    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    /// Opens a new Waiting room with the caller as participant X.
    ///
    /// Returns the reserved code (the direct reply) together with the
    /// creator's notifications.
    #[instrument(skip(self))]
    pub fn create_room(
        &mut self,
        connection_id: ConnectionId,
        display_name: String,
    ) -> (RoomCode, Vec<Outbound>) {
        let code = self.store.create();
        let room = self
            .store
            .get_mut(&code)
            .expect("freshly created room is live");
        room.participants.push(Participant {
            connection_id,
            display_name: display_name.clone(),
            mark: Mark::X,
        });

        info!(room_code = %code, connection_id, name = %display_name, "Room opened");

        let outbound = vec![
            Outbound::new(connection_id, ServerEvent::RoomCreated { room_code: code.clone() }),
            Outbound::new(
                connection_id,
                ServerEvent::Status {
                    message: format!(
                        "{display_name} created room {code}. Waiting for opponent..."
                    ),
                },
            ),
        ];
        (code, outbound)
    }

    /// Adds the caller as participant O and starts the game.
    ///
    /// Both participants receive a status note and a full state sync; the
    /// joiner additionally gets a direct `joined` reply.
    #[instrument(skip(self))]
    pub fn join_room(
        &mut self,
        code: &str,
        connection_id: ConnectionId,
        display_name: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        validate_code(code)?;
        let room = self.store.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        if room.participants.len() >= 2 {
            warn!(room_code = code, connection_id, "Join rejected, room full");
            return Err(RoomError::RoomFull);
        }

        room.participants.push(Participant {
            connection_id,
            display_name: display_name.clone(),
            mark: Mark::O,
        });
        room.status = RoomStatus::Active;

        info!(room_code = code, connection_id, name = %display_name, "Game starting");

        let mut outbound = vec![Outbound::new(
            connection_id,
            ServerEvent::Joined {
                room_code: code.to_string(),
            },
        )];
        outbound.extend(broadcast(
            room,
            ServerEvent::Status {
                message: format!("{display_name} joined. Game starting!"),
            },
        ));
        outbound.extend(broadcast(
            room,
            ServerEvent::GameState(GameStateView::from_room(room)),
        ));
        Ok(outbound)
    }

    /// Applies a move for the caller's mark.
    ///
    /// Outcome detection runs before anything is broadcast, so the
    /// terminal `gameOver` and the next-turn `gameState` are mutually
    /// exclusive per move. A terminal outcome deletes the room.
    #[instrument(skip(self))]
    pub fn make_move(
        &mut self,
        code: &str,
        connection_id: ConnectionId,
        index: usize,
    ) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store.get_mut(code).ok_or(RoomError::RoomNotFound)?;

        // A Waiting room has no opponent yet; the creator cannot move
        // alone. Connections outside the room have no turn either.
        let mark = room
            .participant(connection_id)
            .map(|p| p.mark)
            .ok_or(RoomError::NotYourTurn)?;
        if room.status != RoomStatus::Active || mark != room.turn {
            warn!(
                room_code = code,
                connection_id,
                requested_by = ?mark,
                turn = ?room.turn,
                "Move out of turn"
            );
            return Err(RoomError::NotYourTurn);
        }

        let next = game::apply_move(&room.grid, index, mark)?;
        room.grid = next;

        match game::detect_outcome(&room.grid) {
            outcome @ (Outcome::Win { .. } | Outcome::Draw) => {
                room.status = RoomStatus::Finished;
                info!(room_code = code, ?outcome, "Game over");
                let view = GameOverView::from_outcome(room, &outcome);
                let outbound = broadcast(room, ServerEvent::GameOver(view));
                self.store.delete(code);
                Ok(outbound)
            }
            Outcome::Ongoing => {
                room.turn = mark.opponent();
                info!(room_code = code, index, placed = ?mark, next = ?room.turn, "Move applied");
                Ok(broadcast(
                    room,
                    ServerEvent::GameState(GameStateView::from_room(room)),
                ))
            }
        }
    }

    /// Reinitializes the grid and hands the turn back to X, keeping the
    /// room and its participants. Legacy parity with single-room mode.
    #[instrument(skip(self))]
    pub fn reset(&mut self, code: &str) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        room.grid = crate::game::Grid::empty();
        room.turn = Mark::X;
        info!(room_code = code, "Room reset");
        Ok(broadcast(
            room,
            ServerEvent::GameState(GameStateView::from_room(room)),
        ))
    }

    /// Tears down the room containing the given connection, if any.
    ///
    /// The remaining participant is notified exactly once; no other room
    /// is affected. Not an error path: disconnect is the normal terminal
    /// transition for Waiting and Active rooms alike.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        let Some(code) = self.store.find_by_connection(connection_id) else {
            return Vec::new();
        };
        let room = self.store.get(&code).expect("scanned room is live");
        let outbound: Vec<_> = room
            .participants
            .iter()
            .filter(|p| p.connection_id != connection_id)
            .map(|p| {
                Outbound::new(
                    p.connection_id,
                    ServerEvent::Status {
                        message: "Opponent disconnected. Game ended.".to_string(),
                    },
                )
            })
            .collect();
        info!(room_code = %code, connection_id, "Participant disconnected, room closed");
        self.store.delete(&code);
        outbound
    }
}

fn validate_code(code: &str) -> Result<(), RoomError> {
    if code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(RoomError::InvalidRoomCodeFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_pair(coordinator: &mut RoomCoordinator) -> RoomCode {
        let (code, _) = coordinator.create_room(1, "Ada".to_string());
        coordinator.join_room(&code, 2, "Ben".to_string()).unwrap();
        code
    }

    #[test]
    fn test_create_room_replies_with_code() {
        let mut coordinator = RoomCoordinator::new();
        let (code, outbound) = coordinator.create_room(1, "Ada".to_string());
        assert_eq!(
            outbound[0],
            Outbound::new(1, ServerEvent::RoomCreated { room_code: code.clone() })
        );
        assert_eq!(coordinator.store().get(&code).unwrap().status, RoomStatus::Waiting);
    }

    #[test]
    fn test_join_unknown_room() {
        let mut coordinator = RoomCoordinator::new();
        assert_eq!(
            coordinator.join_room("0000", 2, "Ben".to_string()),
            Err(RoomError::RoomNotFound)
        );
    }

    #[test]
    fn test_join_bad_code_format() {
        let mut coordinator = RoomCoordinator::new();
        assert_eq!(
            coordinator.join_room("abc", 2, "Ben".to_string()),
            Err(RoomError::InvalidRoomCodeFormat)
        );
        assert_eq!(
            coordinator.join_room("48210", 2, "Ben".to_string()),
            Err(RoomError::InvalidRoomCodeFormat)
        );
    }

    #[test]
    fn test_join_full_room() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        assert_eq!(
            coordinator.join_room(&code, 3, "Eve".to_string()),
            Err(RoomError::RoomFull)
        );
        assert_eq!(coordinator.store().get(&code).unwrap().participants.len(), 2);
    }

    #[test]
    fn test_solo_creator_cannot_move() {
        let mut coordinator = RoomCoordinator::new();
        let (code, _) = coordinator.create_room(1, "Ada".to_string());
        assert_eq!(coordinator.make_move(&code, 1, 4), Err(RoomError::NotYourTurn));
    }

    #[test]
    fn test_move_out_of_turn_changes_nothing() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        assert_eq!(coordinator.make_move(&code, 2, 0), Err(RoomError::NotYourTurn));
        let room = coordinator.store().get(&code).unwrap();
        assert_eq!(room.turn, Mark::X);
        assert!(room.grid.is_empty(0));
    }

    #[test]
    fn test_occupied_cell_rejected_state_unchanged() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        coordinator.make_move(&code, 1, 4).unwrap();
        assert_eq!(
            coordinator.make_move(&code, 2, 4),
            Err(RoomError::InvalidMove(MoveError::Occupied))
        );
        let room = coordinator.store().get(&code).unwrap();
        assert_eq!(room.turn, Mark::O);
    }

    #[test]
    fn test_disconnect_notifies_opponent_once_and_deletes() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        let outbound = coordinator.disconnect(1);
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].to, 2);
        assert!(coordinator.store().get(&code).is_none());
    }

    #[test]
    fn test_disconnect_unknown_connection_is_noop() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        assert!(coordinator.disconnect(99).is_empty());
        assert!(coordinator.store().get(&code).is_some());
    }

    #[test]
    fn test_reset_restores_empty_grid_and_turn() {
        let mut coordinator = RoomCoordinator::new();
        let code = active_pair(&mut coordinator);
        coordinator.make_move(&code, 1, 4).unwrap();
        coordinator.make_move(&code, 2, 0).unwrap();
        coordinator.reset(&code).unwrap();
        let room = coordinator.store().get(&code).unwrap();
        assert_eq!(room.turn, Mark::X);
        assert!(room.grid.open_indices().len() == 9);
        assert_eq!(room.participants.len(), 2);
    }
}
