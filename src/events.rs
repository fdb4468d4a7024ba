//! Typed notification bus for board events.
//!
//! Board mutations publish events on a single fixed topic using tokio's
//! broadcast channel. Delivery is fire-and-forget: only subscribers that are
//! registered at publish time receive the event, lagging subscribers lose the
//! oldest buffered events, and nothing is persisted or replayed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::board::Board;

/// Default number of events buffered per subscriber.
const DEFAULT_CAPACITY: usize = 100;

/// Logical topic all board events are published on.
pub const TOPIC: &str = "boards";

/// An event describing a successful board mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "board")]
pub enum BoardEvent {
    /// A board was created.
    #[serde(rename = "board_created")]
    Created(Board),
    /// A board was updated.
    #[serde(rename = "board_updated")]
    Updated(Board),
    /// A board was deleted.
    #[serde(rename = "board_deleted")]
    Deleted(Board),
}

impl BoardEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::Created(_) => "board_created",
            BoardEvent::Updated(_) => "board_updated",
            BoardEvent::Deleted(_) => "board_deleted",
        }
    }

    /// The board the event refers to.
    pub fn board(&self) -> &Board {
        match self {
            BoardEvent::Created(board) => board,
            BoardEvent::Updated(board) => board,
            BoardEvent::Deleted(board) => board,
        }
    }
}

/// A published event together with its publish timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Topic the event was published on.
    pub topic: &'static str,
    /// The event itself.
    pub event: BoardEvent,
    /// When the event was published.
    pub published_at: DateTime<Utc>,
}

/// In-process event bus for board notifications.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new subscriber.
    ///
    /// The subscriber only sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// A send error only means no subscriber is currently registered,
    /// which is not a failure for a fire-and-forget bus.
    pub fn publish(&self, event: BoardEvent) {
        debug!(topic = TOPIC, event = event.name(), board_id = event.board().id, "publishing event");
        let _ = self.tx.send(Notification {
            topic: TOPIC,
            event,
            published_at: Utc::now(),
        });
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
