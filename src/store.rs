//! In-memory room registry.
//!
//! The store is the single owner of all live [`Room`] records. The
//! coordinator reads and mutates rooms through it and never keeps its own
//! copies, so there is exactly one authoritative grid per room.

use crate::game::{Grid, Mark};
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Short human-typeable token identifying a room (four digits).
pub type RoomCode = String;

/// Identifier the gateway assigns to each connected socket.
///
/// The coordinator uses it only to route notifications and to detect
/// disconnects; connection lifecycle belongs to the gateway.
pub type ConnectionId = u64;

/// One connected player bound to a room and a mark.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Routing handle into the transport layer.
    pub connection_id: ConnectionId,
    /// Name shown to the other participant.
    pub display_name: String,
    /// Mark assigned at join time, never reassigned.
    pub mark: Mark,
}

/// Lifecycle phase of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// One participant, waiting for an opponent.
    Waiting,
    /// Two participants, game in progress.
    Active,
    /// Terminal outcome reached. Finished rooms are deleted immediately,
    /// so the store only ever holds Waiting or Active rooms.
    Finished,
}

/// One isolated game session between at most two participants.
#[derive(Debug, Clone)]
pub struct Room {
    /// The room's code.
    pub code: RoomCode,
    /// Participants in join order: first is X, second is O.
    pub participants: Vec<Participant>,
    /// Authoritative grid.
    pub grid: Grid,
    /// Mark currently permitted to move.
    pub turn: Mark,
    /// Lifecycle phase.
    pub status: RoomStatus,
}

impl Room {
    fn new(code: RoomCode) -> Self {
        Self {
            code,
            participants: Vec::new(),
            grid: Grid::empty(),
            turn: Mark::X,
            status: RoomStatus::Waiting,
        }
    }

    /// Finds the participant bound to the given connection.
    pub fn participant(&self, connection_id: ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == connection_id)
    }
}

/// Registry mapping room codes to live rooms.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating room store");
        Self::default()
    }

    /// Reserves a fresh code and inserts an empty Waiting room under it.
    ///
    /// Codes are drawn uniformly from 1000-9999 and redrawn on collision
    /// with a live room, so they are pairwise distinct among live rooms.
    /// A code becomes reusable once its room is deleted.
    #[instrument(skip(self))]
    pub fn create(&mut self) -> RoomCode {
        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = rng.gen_range(1000..10000).to_string();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        self.rooms.insert(code.clone(), Room::new(code.clone()));
        info!(room_code = %code, live_rooms = self.rooms.len(), "Room created");
        code
    }

    /// Looks up a room by code.
    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Looks up a room by code for mutation.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Deletes the room, releasing its code for reuse.
    #[instrument(skip(self))]
    pub fn delete(&mut self, code: &str) {
        if self.rooms.remove(code).is_some() {
            info!(room_code = code, live_rooms = self.rooms.len(), "Room deleted");
        } else {
            debug!(room_code = code, "Delete on unknown room ignored");
        }
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the store holds no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Codes of all live rooms (unordered).
    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    /// Scans live rooms for the one containing the given connection.
    ///
    /// Linear in the number of live rooms; only disconnect handling uses
    /// it, and a connection belongs to at most one room.
    #[instrument(skip(self))]
    pub fn find_by_connection(&self, connection_id: ConnectionId) -> Option<RoomCode> {
        self.rooms
            .values()
            .find(|room| room.participant(connection_id).is_some())
            .map(|room| room.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_inserts_empty_waiting_room() {
        let mut store = RoomStore::new();
        let code = store.create();
        let room = store.get(&code).unwrap();
        assert_eq!(room.status, RoomStatus::Waiting);
        assert!(room.participants.is_empty());
        assert_eq!(room.turn, Mark::X);
    }

    #[test]
    fn test_codes_are_four_digits() {
        let mut store = RoomStore::new();
        for _ in 0..20 {
            let code = store.create();
            assert_eq!(code.len(), 4);
            assert!(code.parse::<u32>().is_ok_and(|n| (1000..10000).contains(&n)));
        }
    }

    #[test]
    fn test_live_codes_pairwise_distinct() {
        let mut store = RoomStore::new();
        let codes: Vec<_> = (0..50).map(|_| store.create()).collect();
        let mut deduped = codes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), codes.len());
        assert_eq!(store.len(), codes.len());
    }

    #[test]
    fn test_delete_releases_code() {
        let mut store = RoomStore::new();
        let code = store.create();
        store.delete(&code);
        assert!(store.get(&code).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_find_by_connection() {
        let mut store = RoomStore::new();
        let code = store.create();
        store.get_mut(&code).unwrap().participants.push(Participant {
            connection_id: 7,
            display_name: "Ada".to_string(),
            mark: Mark::X,
        });
        assert_eq!(store.find_by_connection(7), Some(code));
        assert_eq!(store.find_by_connection(8), None);
    }
}
