use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::domain::session::{SenderId, Session, SessionPatch};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session exists for sender `{0}`")]
    NotFound(SenderId),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the sender's session, creating one with defaults when absent.
    async fn get_or_create(&self, sender_id: &SenderId, display_name: &str) -> Session;

    /// Merges `patch` into an existing session and returns the updated copy.
    async fn update(&self, sender_id: &SenderId, patch: SessionPatch)
        -> Result<Session, SessionError>;

    /// Drops sessions idle past the store's TTL and returns how many were removed.
    async fn evict_expired(&self) -> usize;
}

/// Process-local session store with idle-TTL eviction.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SenderId, Session>>,
    idle_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(86_400), Arc::new(SystemClock))
    }
}

impl InMemorySessionStore {
    pub fn new(idle_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_ttl, clock }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn get(&self, sender_id: &SenderId) -> Option<Session> {
        self.sessions.read().await.get(sender_id).cloned()
    }

    fn is_expired(&self, session: &Session) -> bool {
        let idle = self.clock.now().signed_duration_since(session.updated_at);
        idle.to_std().map(|idle| idle > self.idle_ttl).unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, sender_id: &SenderId, display_name: &str) -> Session {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(sender_id) {
            if !self.is_expired(existing) {
                return existing.clone();
            }
            debug!(
                event_name = "session.evicted",
                identity = %sender_id,
                "replacing expired session"
            );
        }

        let session = Session::new(sender_id.clone(), display_name, self.clock.now());
        sessions.insert(sender_id.clone(), session.clone());
        debug!(event_name = "session.created", identity = %sender_id, "session created");
        session
    }

    async fn update(
        &self,
        sender_id: &SenderId,
        patch: SessionPatch,
    ) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session =
            sessions.get_mut(sender_id).ok_or_else(|| SessionError::NotFound(sender_id.clone()))?;
        session.apply(patch, self.clock.now());
        Ok(session.clone())
    }

    async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(event_name = "session.evicted", evicted, "expired sessions evicted");
        }
        evicted
    }
}

/// Keyed async mutexes that serialize message handling per sender.
///
/// Distinct senders never contend. Entries nobody holds are pruned on each acquire.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<SenderId, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, sender_id: &SenderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(locks) => locks,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks.retain(|key, lock| key == sender_id || Arc::strong_count(lock) > 1);
            locks.entry(sender_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn tracked(&self) -> usize {
        match self.locks.lock() {
            Ok(locks) => locks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use super::{IdentityLocks, InMemorySessionStore, SessionError, SessionStore};
    use crate::clock::Clock;
    use crate::domain::program::Program;
    use crate::domain::session::{ConversationStage, SenderId, SessionPatch};

    struct SteppingClock {
        now: std::sync::Mutex<DateTime<Utc>>,
    }

    impl SteppingClock {
        fn new() -> Self {
            Self { now: std::sync::Mutex::new(Utc::now()) }
        }

        fn advance(&self, seconds: i64) {
            let mut now = self.now.lock().expect("clock lock");
            *now += chrono::Duration::seconds(seconds);
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock lock")
        }

        fn local_hour(&self) -> u32 {
            9
        }
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_per_sender() {
        let store = InMemorySessionStore::default();
        let sender = SenderId::new("447700900001");

        let first = store.get_or_create(&sender, "Asha").await;
        let second = store.get_or_create(&sender, "Someone Else").await;

        assert_eq!(first, second);
        assert_eq!(second.display_name, "Asha");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_before_create_is_not_found() {
        let store = InMemorySessionStore::default();
        let sender = SenderId::new("missing");
        let error = store
            .update(&sender, SessionPatch::default())
            .await
            .expect_err("update without session should fail");
        assert_eq!(error, SessionError::NotFound(sender));
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let store = InMemorySessionStore::default();
        let sender = SenderId::new("1");
        store.get_or_create(&sender, "Asha").await;

        let updated = store
            .update(
                &sender,
                SessionPatch::default()
                    .with_topic(Program::AgenticAi)
                    .with_stage(ConversationStage::TopicSelected),
            )
            .await
            .expect("update");

        assert_eq!(updated.current_topic, Some(Program::AgenticAi));
        assert_eq!(store.get(&sender).await, Some(updated));
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let clock = Arc::new(SteppingClock::new());
        let store = InMemorySessionStore::new(Duration::from_secs(60), clock.clone());
        let idle = SenderId::new("idle");
        let active = SenderId::new("active");

        store.get_or_create(&idle, "Idle").await;
        store
            .update(&idle, SessionPatch { message_count: Some(3), ..SessionPatch::default() })
            .await
            .expect("update idle");
        clock.advance(45);
        store.get_or_create(&active, "Active").await;
        clock.advance(30);

        assert_eq!(store.evict_expired().await, 1);
        assert!(store.get(&idle).await.is_none());
        assert!(store.get(&active).await.is_some());
    }

    #[tokio::test]
    async fn expired_session_is_replaced_on_access() {
        let clock = Arc::new(SteppingClock::new());
        let store = InMemorySessionStore::new(Duration::from_secs(10), clock.clone());
        let sender = SenderId::new("1");

        store.get_or_create(&sender, "Asha").await;
        store
            .update(&sender, SessionPatch { message_count: Some(5), ..SessionPatch::default() })
            .await
            .expect("update");
        clock.advance(11);

        let fresh = store.get_or_create(&sender, "Asha").await;
        assert_eq!(fresh.message_count, 0);
        assert_eq!(fresh.stage, ConversationStage::New);
    }

    #[tokio::test]
    async fn identity_locks_serialize_same_sender_only() {
        let locks = IdentityLocks::new();
        let asha = SenderId::new("asha");
        let ravi = SenderId::new("ravi");

        let held = locks.acquire(&asha).await;
        // A different sender is not blocked while asha's lock is held.
        let other = tokio::time::timeout(Duration::from_millis(200), locks.acquire(&ravi)).await;
        assert!(other.is_ok());

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&asha)).await;
        assert!(blocked.is_err(), "same sender must wait for the held lock");

        drop(held);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(200), locks.acquire(&asha)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn idle_lock_entries_are_pruned() {
        let locks = IdentityLocks::new();
        for index in 0..10 {
            let guard = locks.acquire(&SenderId::new(format!("sender-{index}"))).await;
            drop(guard);
        }
        assert!(locks.tracked() <= 1);
    }
}
