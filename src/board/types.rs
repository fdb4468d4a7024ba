//! Board model for gavel.
//!
//! This module defines the Board struct, the builder types used to create
//! and update boards, and the MemberRole enum shared by memberships and
//! join requests.

use std::fmt;

use serde::Serialize;

use crate::{GavelError, Result};

/// Role a user holds on a board.
///
/// Stored as its integer discriminant; `Judge` is the board owner and is
/// expected to be unique per board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MemberRole {
    /// Board owner; adjudicates the case.
    Judge = 0,
    /// Voting member.
    Juror = 1,
    /// Non-voting member.
    Observer = 2,
}

impl MemberRole {
    /// Integer representation stored in the database.
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    /// Parse a stored integer back into a role.
    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            0 => Ok(MemberRole::Judge),
            1 => Ok(MemberRole::Juror),
            2 => Ok(MemberRole::Observer),
            other => Err(GavelError::Database(format!("unknown member role: {other}"))),
        }
    }

    /// Get display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            MemberRole::Judge => "judge",
            MemberRole::Juror => "juror",
            MemberRole::Observer => "observer",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Board entity representing a case under discussion.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID.
    pub id: i64,
    /// Case description.
    pub description: String,
    /// The fact under dispute.
    pub fact: String,
    /// Workflow stage of the voting feature.
    pub phase: i64,
    /// Rules governing the case.
    pub rules: String,
    /// Tally of "falsy" verdicts.
    pub verdict_falsy: i64,
    /// Tally of "truthy" verdicts.
    pub verdict_truthy: i64,
    /// Board creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Data for creating a new board.
///
/// All fields are required; `validate` reports the ones that fail.
#[derive(Debug, Clone)]
pub struct NewBoard {
    /// Case description.
    pub description: String,
    /// The fact under dispute.
    pub fact: String,
    /// Workflow stage (defaults to 0).
    pub phase: i64,
    /// Rules governing the case.
    pub rules: String,
    /// Initial "falsy" tally (defaults to 0).
    pub verdict_falsy: i64,
    /// Initial "truthy" tally (defaults to 0).
    pub verdict_truthy: i64,
}

impl NewBoard {
    /// Create a new board with the required text fields.
    pub fn new(
        description: impl Into<String>,
        fact: impl Into<String>,
        rules: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            fact: fact.into(),
            phase: 0,
            rules: rules.into(),
            verdict_falsy: 0,
            verdict_truthy: 0,
        }
    }

    /// Set the workflow phase.
    pub fn with_phase(mut self, phase: i64) -> Self {
        self.phase = phase;
        self
    }

    /// Set the initial verdict tallies.
    pub fn with_verdicts(mut self, falsy: i64, truthy: i64) -> Self {
        self.verdict_falsy = falsy;
        self.verdict_truthy = truthy;
        self
    }

    /// Validate required fields.
    ///
    /// Text fields must be non-empty and counters non-negative. Returns a
    /// validation error naming every failing field.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.description.trim().is_empty() {
            fields.push("description");
        }
        if self.fact.trim().is_empty() {
            fields.push("fact");
        }
        if self.phase < 0 {
            fields.push("phase");
        }
        if self.rules.trim().is_empty() {
            fields.push("rules");
        }
        if self.verdict_falsy < 0 {
            fields.push("verdict_falsy");
        }
        if self.verdict_truthy < 0 {
            fields.push("verdict_truthy");
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(GavelError::validation(fields))
        }
    }
}

/// Data for updating an existing board.
///
/// Only fields that are set will be modified.
#[derive(Debug, Clone, Default)]
pub struct BoardUpdate {
    /// New description.
    pub description: Option<String>,
    /// New fact.
    pub fact: Option<String>,
    /// New phase.
    pub phase: Option<i64>,
    /// New rules.
    pub rules: Option<String>,
    /// New "falsy" tally.
    pub verdict_falsy: Option<i64>,
    /// New "truthy" tally.
    pub verdict_truthy: Option<i64>,
}

impl BoardUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set new fact.
    pub fn fact(mut self, fact: impl Into<String>) -> Self {
        self.fact = Some(fact.into());
        self
    }

    /// Set new phase.
    pub fn phase(mut self, phase: i64) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Set new rules.
    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Set new "falsy" tally.
    pub fn verdict_falsy(mut self, verdict_falsy: i64) -> Self {
        self.verdict_falsy = Some(verdict_falsy);
        self
    }

    /// Set new "truthy" tally.
    pub fn verdict_truthy(mut self, verdict_truthy: i64) -> Self {
        self.verdict_truthy = Some(verdict_truthy);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.fact.is_none()
            && self.phase.is_none()
            && self.rules.is_none()
            && self.verdict_falsy.is_none()
            && self.verdict_truthy.is_none()
    }

    /// Validate the fields that are set.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            fields.push("description");
        }
        if matches!(&self.fact, Some(f) if f.trim().is_empty()) {
            fields.push("fact");
        }
        if matches!(self.phase, Some(p) if p < 0) {
            fields.push("phase");
        }
        if matches!(&self.rules, Some(r) if r.trim().is_empty()) {
            fields.push("rules");
        }
        if matches!(self.verdict_falsy, Some(v) if v < 0) {
            fields.push("verdict_falsy");
        }
        if matches!(self.verdict_truthy, Some(v) if v < 0) {
            fields.push("verdict_truthy");
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(GavelError::validation(fields))
        }
    }
}
