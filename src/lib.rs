//! Gridmatch library - real-time multiplayer tic-tac-toe rooms
//!
//! Two remote participants play through a shared session identified by a
//! short code, with state broadcast over a persistent WebSocket channel.
//!
//! # Architecture
//!
//! - **Game**: pure grid rules plus the minimax opponent
//! - **Store**: in-memory registry owning all live rooms
//! - **Coordinator**: room lifecycle and turn-taking state machine
//! - **Gateway**: WebSocket boundary dispatching events and delivering
//!   notifications

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod coordinator;
mod game;
mod gateway;
mod protocol;
mod store;

// Crate-level exports - CLI
pub use cli::Cli;

// Crate-level exports - Coordinator
pub use coordinator::{Outbound, RoomCoordinator, RoomError};

// Crate-level exports - Gateway
pub use gateway::{SessionGateway, router};

// Crate-level exports - Game types and rules
pub use game::{
    Cell, Grid, Mark, MoveError, Outcome, WIN_LINES, apply_move, detect_outcome, minimax,
};

// Crate-level exports - Wire protocol
pub use protocol::{ClientEvent, GameOverView, GameStateView, ParticipantView, ServerEvent};

// Crate-level exports - Room store
pub use store::{ConnectionId, Participant, Room, RoomCode, RoomStatus, RoomStore};
