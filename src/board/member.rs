//! Board membership model for gavel.

use serde::Serialize;

use super::types::MemberRole;

/// A (user, board, role) association.
#[derive(Debug, Clone, Serialize)]
pub struct BoardMember {
    /// Unique membership ID.
    pub id: i64,
    /// Board this membership belongs to.
    pub board_id: i64,
    /// User holding the membership.
    pub user_id: i64,
    /// Role held on the board.
    pub role: MemberRole,
    /// Membership creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl BoardMember {
    /// Check if this member is the board's judge.
    pub fn is_judge(&self) -> bool {
        self.role == MemberRole::Judge
    }
}

/// Data for creating a new membership.
///
/// The role is carried by the type system; there is no membership without
/// one.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// Board to join.
    pub board_id: i64,
    /// User joining the board.
    pub user_id: i64,
    /// Role to hold.
    pub role: MemberRole,
}

impl NewMember {
    /// Create a new membership.
    pub fn new(board_id: i64, user_id: i64, role: MemberRole) -> Self {
        Self {
            board_id,
            user_id,
            role,
        }
    }
}

/// Data for updating an existing membership.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    /// New role.
    pub role: Option<MemberRole>,
}

impl MemberUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new role.
    pub fn role(mut self, role: MemberRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
    }
}
