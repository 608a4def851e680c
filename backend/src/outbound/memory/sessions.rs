//! In-process session store.
//!
//! Session state stays on the server and the cookie only carries an opaque
//! key, so purging a session on logout invalidates every copy of the cookie.
//! Used when no Redis URL is configured. State is lost on restart and not
//! shared between processes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time;
use tokio::sync::RwLock;
use uuid::Uuid;

type State = HashMap<String, String>;

#[derive(Debug, Clone)]
struct Entry {
    state: State,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(state: State, ttl: &time::Duration) -> Self {
        let lifetime = Duration::from_secs(u64::try_from(ttl.whole_seconds()).unwrap_or(0));
        Self {
            state,
            expires_at: Instant::now().checked_add(lifetime),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// [`SessionStore`] keeping session state in process memory.
///
/// Clones share the same map, so one store can back every worker.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Whether no live session is held.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn fresh_key() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<State>, LoadError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get(session_key.as_ref()) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.state.clone())),
            Some(_) => {
                sessions.remove(session_key.as_ref());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        session_state: State,
        ttl: &time::Duration,
    ) -> Result<SessionKey, SaveError> {
        let key = Self::fresh_key();
        let session_key =
            SessionKey::try_from(key.clone()).map_err(|err| SaveError::Other(err.into()))?;
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.is_live(now));
        sessions.insert(key, Entry::new(session_state, ttl));
        Ok(session_key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: State,
        ttl: &time::Duration,
    ) -> Result<SessionKey, UpdateError> {
        {
            let now = Instant::now();
            let mut sessions = self.sessions.write().await;
            if let Some(entry) = sessions.get_mut(session_key.as_ref()) {
                if entry.is_live(now) {
                    *entry = Entry::new(session_state, ttl);
                    return Ok(session_key);
                }
            }
        }
        // Expired or deleted meanwhile: start over under a new key.
        self.save(session_state, ttl).await.map_err(|err| match err {
            SaveError::Serialization(cause) => UpdateError::Serialization(cause),
            SaveError::Other(cause) => UpdateError::Other(cause),
        })
    }

    async fn update_ttl(
        &self,
        session_key: &SessionKey,
        ttl: &time::Duration,
    ) -> Result<(), anyhow::Error> {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_key.as_ref()) {
            let state = std::mem::take(&mut entry.state);
            *entry = Entry::new(state, ttl);
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.sessions.write().await.remove(session_key.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemorySessionStore {
        MemorySessionStore::new()
    }

    fn state(user_id: &str) -> State {
        HashMap::from([("user_id".to_owned(), format!("\"{user_id}\""))])
    }

    fn key(raw: &str) -> SessionKey {
        SessionKey::try_from(raw.to_owned()).expect("valid key")
    }

    const TWO_HOURS: time::Duration = time::Duration::hours(2);

    #[rstest]
    #[tokio::test]
    async fn saved_state_loads_under_its_key(store: MemorySessionStore) {
        let session_key = store.save(state("a"), &TWO_HOURS).await.expect("save");

        assert_eq!(session_key.as_ref().len(), 64);
        let loaded = store.load(&session_key).await.expect("load");
        assert_eq!(loaded, Some(state("a")));
    }

    #[rstest]
    #[tokio::test]
    async fn each_save_issues_a_new_key(store: MemorySessionStore) {
        let first = store.save(state("a"), &TWO_HOURS).await.expect("save");
        let second = store.save(state("a"), &TWO_HOURS).await.expect("save");
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_sessions_no_longer_load(store: MemorySessionStore) {
        let session_key = store.save(state("a"), &TWO_HOURS).await.expect("save");

        store.delete(&session_key).await.expect("delete");

        assert_eq!(store.load(&session_key).await.expect("load"), None);
        assert!(store.is_empty().await);
    }

    #[rstest]
    #[tokio::test]
    async fn expired_sessions_no_longer_load(store: MemorySessionStore) {
        let session_key = store
            .save(state("a"), &time::Duration::ZERO)
            .await
            .expect("save");

        assert_eq!(store.load(&session_key).await.expect("load"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_state_in_place(store: MemorySessionStore) {
        let session_key = store.save(state("a"), &TWO_HOURS).await.expect("save");
        let raw = session_key.as_ref().to_owned();

        let updated = store
            .update(session_key, state("b"), &TWO_HOURS)
            .await
            .expect("update");

        assert_eq!(updated.as_ref(), raw);
        assert_eq!(store.load(&updated).await.expect("load"), Some(state("b")));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_key_starts_a_new_session(store: MemorySessionStore) {
        let updated = store
            .update(key("gone"), state("b"), &TWO_HOURS)
            .await
            .expect("update");

        assert_ne!(updated.as_ref(), "gone");
        assert_eq!(store.load(&updated).await.expect("load"), Some(state("b")));
    }

    #[rstest]
    #[tokio::test]
    async fn update_ttl_can_expire_a_session(store: MemorySessionStore) {
        let session_key = store.save(state("a"), &TWO_HOURS).await.expect("save");

        store
            .update_ttl(&session_key, &time::Duration::ZERO)
            .await
            .expect("update ttl");

        assert_eq!(store.load(&session_key).await.expect("load"), None);
    }
}
