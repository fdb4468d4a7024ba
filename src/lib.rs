//! gavel - board membership and join-request data layer.
//!
//! Persistence and authorization for boards in a collaborative case-voting
//! service: boards have members with roles, users request to join a board,
//! and board mutations broadcast typed notifications to in-process
//! subscribers. Consumed as a library by an HTTP layer.

pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;

pub use board::{
    Approval, Board, BoardMember, BoardRepository, BoardUpdate, JoinRequest,
    JoinRequestRepository, MemberRepository, MemberRole, MemberUpdate, NewBoard, NewJoinRequest,
    NewMember,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{GavelError, Result};
pub use events::{BoardEvent, EventBus, Notification};
