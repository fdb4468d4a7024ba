//! Board repository for gavel.
//!
//! This module provides CRUD operations for boards, the authorization
//! queries built on memberships, and the owning-membership creation
//! transaction. Every successful board mutation publishes exactly one
//! event on the injected bus, after the database commit.

use sqlx::QueryBuilder;
use tracing::debug;

use super::join_request::JoinRequest;
use super::join_request_repository::JoinRequestRow;
use super::member::{BoardMember, NewMember};
use super::member_repository::MemberRepository;
use super::types::{Board, BoardUpdate, MemberRole, NewBoard};
use crate::db::{DbPool, User, SQL_NOW};
use crate::events::{BoardEvent, EventBus};
use crate::{GavelError, Result};

/// Repository for board CRUD operations and authorization queries.
pub struct BoardRepository<'a> {
    pool: &'a DbPool,
    events: &'a EventBus,
}

impl<'a> BoardRepository<'a> {
    /// Create a new BoardRepository with the given pool and event bus.
    pub fn new(pool: &'a DbPool, events: &'a EventBus) -> Self {
        Self { pool, events }
    }

    /// List all boards, ordered by creation time.
    pub async fn list(&self) -> Result<Vec<Board>> {
        let boards = sqlx::query_as::<_, Board>(
            "SELECT id, description, fact, phase, rules, verdict_falsy, verdict_truthy,
                    created_at, updated_at
             FROM boards ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(boards)
    }

    /// Get a board by ID.
    pub async fn get(&self, id: i64) -> Result<Option<Board>> {
        let result = sqlx::query_as::<_, Board>(
            "SELECT id, description, fact, phase, rules, verdict_falsy, verdict_truthy,
                    created_at, updated_at
             FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get a board by ID, failing loudly when absent.
    pub async fn get_strict(&self, id: i64) -> Result<Board> {
        self.get(id)
            .await?
            .ok_or_else(|| GavelError::NotFound("board".to_string()))
    }

    /// Create a new board in the database.
    ///
    /// Validates required fields, persists the row and publishes
    /// `board_created`. On validation failure nothing is persisted and
    /// nothing is published.
    pub async fn create(&self, new_board: &NewBoard) -> Result<Board> {
        new_board.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO boards (description, fact, phase, rules, verdict_falsy, verdict_truthy)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&new_board.description)
        .bind(&new_board.fact)
        .bind(new_board.phase)
        .bind(&new_board.rules)
        .bind(new_board.verdict_falsy)
        .bind(new_board.verdict_truthy)
        .fetch_one(self.pool)
        .await?;

        let board = self.get_strict(id).await?;
        debug!(board_id = board.id, "board created");
        self.events.publish(BoardEvent::Created(board.clone()));
        Ok(board)
    }

    /// Create a new board together with its owning membership.
    ///
    /// Inserts the board and a `Judge` membership for `user_id` in one
    /// transaction; either both rows exist afterwards or neither does.
    /// Publishes `board_created` (board only) after the commit.
    pub async fn create_with_owner(
        &self,
        new_board: &NewBoard,
        user_id: i64,
    ) -> Result<(Board, BoardMember)> {
        new_board.validate()?;

        let mut tx = self.pool.begin().await?;

        let board_id: i64 = sqlx::query_scalar(
            "INSERT INTO boards (description, fact, phase, rules, verdict_falsy, verdict_truthy)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&new_board.description)
        .bind(&new_board.fact)
        .bind(new_board.phase)
        .bind(&new_board.rules)
        .bind(new_board.verdict_falsy)
        .bind(new_board.verdict_truthy)
        .fetch_one(&mut *tx)
        .await?;

        let owner = NewMember::new(board_id, user_id, MemberRole::Judge);
        let member_id: i64 = sqlx::query_scalar(
            "INSERT INTO board_members (board_id, user_id, role)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(owner.board_id)
        .bind(owner.user_id)
        .bind(owner.role.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let board = self.get_strict(board_id).await?;
        let member = MemberRepository::new(self.pool).get_strict(member_id).await?;

        debug!(board_id = board.id, user_id, "board created with owner");
        self.events.publish(BoardEvent::Created(board.clone()));
        Ok((board, member))
    }

    /// Update a board by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated board, or None if not found. Publishes
    /// `board_updated` on success.
    #[cfg(feature = "sqlite")]
    pub async fn update(&self, id: i64, update: &BoardUpdate) -> Result<Option<Board>> {
        update.validate()?;
        if update.is_empty() {
            return self.get(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE boards SET ");
        let mut separated = query.separated(", ");

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(ref fact) = update.fact {
            separated.push("fact = ");
            separated.push_bind_unseparated(fact.clone());
        }
        if let Some(phase) = update.phase {
            separated.push("phase = ");
            separated.push_bind_unseparated(phase);
        }
        if let Some(ref rules) = update.rules {
            separated.push("rules = ");
            separated.push_bind_unseparated(rules.clone());
        }
        if let Some(verdict_falsy) = update.verdict_falsy {
            separated.push("verdict_falsy = ");
            separated.push_bind_unseparated(verdict_falsy);
        }
        if let Some(verdict_truthy) = update.verdict_truthy {
            separated.push("verdict_truthy = ");
            separated.push_bind_unseparated(verdict_truthy);
        }
        separated.push(format!("updated_at = {SQL_NOW}"));

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let board = self.get_strict(id).await?;
        debug!(board_id = board.id, "board updated");
        self.events.publish(BoardEvent::Updated(board.clone()));
        Ok(Some(board))
    }

    /// Update a board by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated board, or None if not found. Publishes
    /// `board_updated` on success.
    #[cfg(feature = "postgres")]
    pub async fn update(&self, id: i64, update: &BoardUpdate) -> Result<Option<Board>> {
        update.validate()?;
        if update.is_empty() {
            return self.get(id).await;
        }

        let mut query: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE boards SET ");
        let mut separated = query.separated(", ");

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(ref fact) = update.fact {
            separated.push("fact = ");
            separated.push_bind_unseparated(fact.clone());
        }
        if let Some(phase) = update.phase {
            separated.push("phase = ");
            separated.push_bind_unseparated(phase);
        }
        if let Some(ref rules) = update.rules {
            separated.push("rules = ");
            separated.push_bind_unseparated(rules.clone());
        }
        if let Some(verdict_falsy) = update.verdict_falsy {
            separated.push("verdict_falsy = ");
            separated.push_bind_unseparated(verdict_falsy);
        }
        if let Some(verdict_truthy) = update.verdict_truthy {
            separated.push("verdict_truthy = ");
            separated.push_bind_unseparated(verdict_truthy);
        }
        separated.push(format!("updated_at = {SQL_NOW}"));

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let board = self.get_strict(id).await?;
        debug!(board_id = board.id, "board updated");
        self.events.publish(BoardEvent::Updated(board.clone()));
        Ok(Some(board))
    }

    /// Delete a board.
    ///
    /// Memberships and join requests are removed by the cascade rules.
    /// Returns true if the board was deleted, false if it no longer
    /// existed. Publishes `board_deleted` with the removed entity only
    /// when a row was actually deleted.
    pub async fn delete(&self, board: &Board) -> Result<bool> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board.id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        debug!(board_id = board.id, "board deleted");
        self.events.publish(BoardEvent::Deleted(board.clone()));
        Ok(true)
    }

    /// Count memberships referencing a board.
    pub async fn members_count(&self, board_id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM board_members WHERE board_id = $1")
                .bind(board_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count.0)
    }

    /// Get the board's judge, the user whose membership role is `Judge`.
    ///
    /// Returns None when the board has no judge. Should two users hold the
    /// role, the earliest membership wins.
    pub async fn judge(&self, board_id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.created_at
             FROM users u
             JOIN board_members m ON m.user_id = u.id
             WHERE m.board_id = $1 AND m.role = $2
             ORDER BY m.id ASC LIMIT 1",
        )
        .bind(board_id)
        .bind(MemberRole::Judge.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Check whether a user is a member of a board.
    pub async fn is_member(&self, board_id: i64, user_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists.0)
    }

    /// Get the role a user holds on a board, or None if not a member.
    pub async fn role_of(&self, board_id: i64, user_id: i64) -> Result<Option<MemberRole>> {
        let role: Option<i64> = sqlx::query_scalar(
            "SELECT role FROM board_members WHERE board_id = $1 AND user_id = $2",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        role.map(MemberRole::from_i64).transpose()
    }

    /// List the board's events, most recent first.
    ///
    /// Currently the only board events are join requests; this is the
    /// extension point for merging other event types later.
    pub async fn events(&self, board_id: i64) -> Result<Vec<JoinRequest>> {
        let rows: Vec<JoinRequestRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, motivation, preferred_role, created_at
             FROM join_requests WHERE board_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_join_request()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, EventBus) {
        let db = Database::open_in_memory().await.unwrap();
        (db, EventBus::default())
    }

    async fn create_user(db: &Database, name: &str) -> User {
        UserRepository::new(db.pool())
            .create(&NewUser::new(name))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo
            .create(&NewBoard::new("a dispute", "the fact", "the rules").with_phase(1))
            .await
            .unwrap();

        assert_eq!(board.id, 1);
        assert_eq!(board.description, "a dispute");
        assert_eq!(board.fact, "the fact");
        assert_eq!(board.phase, 1);
        assert_eq!(board.rules, "the rules");
        assert_eq!(board.verdict_falsy, 0);
        assert_eq!(board.verdict_truthy, 0);
    }

    #[tokio::test]
    async fn test_create_publishes_event() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let mut rx = bus.subscribe();

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.event.name(), "board_created");
        assert_eq!(notification.event.board().id, board.id);
        // Exactly one event
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_invalid_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let mut rx = bus.subscribe();

        let result = repo.create(&NewBoard::new("", "f", "r")).await;
        assert!(matches!(result, Err(GavelError::Validation { .. })));

        // No row persisted, no event published
        assert!(repo.list().await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_get_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let created = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();

        let found = repo.get(created.id).await.unwrap();
        assert!(found.is_some());

        let not_found = repo.get(999).await.unwrap();
        assert!(not_found.is_none());

        let strict = repo.get_strict(999).await;
        assert!(matches!(strict, Err(GavelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_owner() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let user = create_user(&db, "alice").await;
        let mut rx = bus.subscribe();

        let (board, member) = repo
            .create_with_owner(&NewBoard::new("d", "f", "r").with_phase(1), user.id)
            .await
            .unwrap();

        assert_eq!(member.board_id, board.id);
        assert_eq!(member.user_id, user.id);
        assert_eq!(member.role, MemberRole::Judge);

        assert_eq!(repo.members_count(board.id).await.unwrap(), 1);
        assert!(repo.is_member(board.id, user.id).await.unwrap());

        // One board_created event, nothing for the membership
        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.event.name(), "board_created");
        assert_eq!(notification.event.board().id, board.id);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_with_owner_rolls_back_on_failure() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let mut rx = bus.subscribe();

        // User 999 does not exist; the membership insert violates its
        // foreign key, so the board insert must be rolled back too.
        let result = repo
            .create_with_owner(&NewBoard::new("d", "f", "r"), 999)
            .await;
        assert!(result.is_err());

        assert!(repo.list().await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        let mut rx = bus.subscribe();

        let updated = repo
            .update(
                board.id,
                &BoardUpdate::new().description("new d").verdict_truthy(2),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, "new d");
        assert_eq!(updated.verdict_truthy, 2);
        // Unchanged fields
        assert_eq!(updated.fact, "f");
        assert_eq!(updated.rules, "r");

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.event.name(), "board_updated");
        assert_eq!(notification.event.board().description, "new d");
    }

    #[tokio::test]
    async fn test_update_invalid_fields() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        let mut rx = bus.subscribe();

        let result = repo.update(board.id, &BoardUpdate::new().rules("")).await;
        assert!(matches!(result, Err(GavelError::Validation { .. })));

        // Untouched and unannounced
        assert_eq!(repo.get_strict(board.id).await.unwrap().rules, "r");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_nonexistent_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let mut rx = bus.subscribe();

        let result = repo
            .update(999, &BoardUpdate::new().description("x"))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_empty() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        let mut rx = bus.subscribe();

        let result = repo.update(board.id, &BoardUpdate::new()).await.unwrap();
        assert!(result.is_some());
        // No mutation, no event
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_board() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        let mut rx = bus.subscribe();

        assert!(repo.delete(&board).await.unwrap());
        assert!(repo.get(board.id).await.unwrap().is_none());

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.event.name(), "board_deleted");
        assert_eq!(notification.event.board().id, board.id);

        // Deleting again returns false and publishes nothing
        assert!(!repo.delete(&board).await.unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_members_and_requests() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let user = create_user(&db, "alice").await;

        let (board, _member) = repo
            .create_with_owner(&NewBoard::new("d", "f", "r"), user.id)
            .await
            .unwrap();

        let requester = create_user(&db, "bob").await;
        sqlx::query(
            "INSERT INTO join_requests (board_id, user_id, motivation, preferred_role)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(board.id)
        .bind(requester.id)
        .bind("please")
        .bind(1_i64)
        .execute(db.pool())
        .await
        .unwrap();

        assert!(repo.delete(&board).await.unwrap());

        let members: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM board_members")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let requests: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM join_requests")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(members.0, 0);
        assert_eq!(requests.0, 0);
    }

    #[tokio::test]
    async fn test_judge_and_role_queries() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);
        let owner = create_user(&db, "alice").await;
        let juror = create_user(&db, "bob").await;
        let outsider = create_user(&db, "carol").await;

        let (board, _) = repo
            .create_with_owner(&NewBoard::new("d", "f", "r"), owner.id)
            .await
            .unwrap();

        MemberRepository::new(db.pool())
            .create(&NewMember::new(board.id, juror.id, MemberRole::Juror))
            .await
            .unwrap();

        let judge = repo.judge(board.id).await.unwrap().unwrap();
        assert_eq!(judge.id, owner.id);

        assert!(repo.is_member(board.id, owner.id).await.unwrap());
        assert!(repo.is_member(board.id, juror.id).await.unwrap());
        assert!(!repo.is_member(board.id, outsider.id).await.unwrap());

        assert_eq!(
            repo.role_of(board.id, owner.id).await.unwrap(),
            Some(MemberRole::Judge)
        );
        assert_eq!(
            repo.role_of(board.id, juror.id).await.unwrap(),
            Some(MemberRole::Juror)
        );
        assert_eq!(repo.role_of(board.id, outsider.id).await.unwrap(), None);

        assert_eq!(repo.members_count(board.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_judge_absent() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        assert!(repo.judge(board.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_events_newest_first() {
        let (db, bus) = setup().await;
        let repo = BoardRepository::new(db.pool(), &bus);

        let board = repo.create(&NewBoard::new("d", "f", "r")).await.unwrap();
        let first = create_user(&db, "alice").await;
        let second = create_user(&db, "bob").await;

        for user_id in [first.id, second.id] {
            sqlx::query(
                "INSERT INTO join_requests (board_id, user_id, motivation, preferred_role)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(board.id)
            .bind(user_id)
            .bind("please")
            .bind(1_i64)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let events = repo.events(board.id).await.unwrap();
        assert_eq!(events.len(), 2);
        // Most recent first
        assert_eq!(events[0].user_id, second.id);
        assert_eq!(events[1].user_id, first.id);
    }
}
