//! Database schema and migrations for gavel.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users table
    //
    // The User aggregate is owned by the account system; this table holds
    // the minimal columns needed for foreign keys and the judge lookup.
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_username ON users(username);
"#,
    // v2: Boards table
    r#"
CREATE TABLE boards (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    description     TEXT NOT NULL,
    fact            TEXT NOT NULL,
    phase           INTEGER NOT NULL DEFAULT 0,
    rules           TEXT NOT NULL,
    verdict_falsy   INTEGER NOT NULL DEFAULT 0,
    verdict_truthy  INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_boards_created_at ON boards(created_at);
"#,
    // v3: Board members table
    //
    // Deleting a board removes its memberships. A user holds at most one
    // membership per board.
    r#"
CREATE TABLE board_members (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id    INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role        INTEGER NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(board_id, user_id)
);

CREATE INDEX idx_board_members_board_id ON board_members(board_id);
CREATE INDEX idx_board_members_user_id ON board_members(user_id);
CREATE INDEX idx_board_members_role ON board_members(role);
"#,
    // v4: Join requests table
    //
    // A user holds at most one pending request per board. Rows are deleted
    // on approval (replaced by a membership) or withdrawal.
    r#"
CREATE TABLE join_requests (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id        INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    motivation      TEXT NOT NULL,
    preferred_role  INTEGER NOT NULL,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(board_id, user_id)
);

CREATE INDEX idx_join_requests_board_id ON join_requests(board_id);
CREATE INDEX idx_join_requests_user_id ON join_requests(user_id);
CREATE INDEX idx_join_requests_created_at ON join_requests(created_at);
"#,
];
