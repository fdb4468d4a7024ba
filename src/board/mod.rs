//! Board domain module for gavel.
//!
//! Boards, memberships and join requests, with one repository per entity.

mod join_request;
mod join_request_repository;
mod member;
mod member_repository;
mod repository;
mod types;

pub use join_request::{Approval, JoinRequest, NewJoinRequest};
pub use join_request_repository::JoinRequestRepository;
pub use member::{BoardMember, MemberUpdate, NewMember};
pub use member_repository::MemberRepository;
pub use repository::BoardRepository;
pub use types::{Board, BoardUpdate, MemberRole, NewBoard};
