//! In-memory per-player session storage.
use convertrail_game::GameSession;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;

const SESSION_ID_BYTES: usize = 16;

type Slot = Arc<Mutex<GameSession>>;

/// Session id to game session cache.
///
/// Every session sits behind its own mutex, so two requests from the same
/// player are applied one after the other while different players never
/// contend. Sessions idle for longer than the TTL expire, and once
/// `max_sessions` is reached the least recently used one is evicted.
pub struct SessionStore {
    slots: Cache<String, Slot>,
    ttl: Duration,
    max_sessions: u64,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration, max_sessions: u64) -> Self {
        let slots: Cache<String, Slot> = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |id: Arc<String>, _slot: Slot, cause| {
                if cause == RemovalCause::Size {
                    log::info!("evicted session {id} (capacity {max_sessions})");
                } else if cause == RemovalCause::Expired {
                    log::debug!("session {id} expired");
                }
            })
            .build();
        Self {
            slots,
            ttl,
            max_sessions,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub const fn max_sessions(&self) -> u64 {
        self.max_sessions
    }

    /// Allocate a new, not yet started session and return its id.
    pub fn create(&self) -> String {
        let id = new_session_id();
        self.slots
            .insert(id.clone(), Arc::new(Mutex::new(GameSession::new())));
        log::debug!("created session {id}");
        id
    }

    /// Whether `id` names a live session.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Run `f` with exclusive access to session `id`.
    ///
    /// Returns `None` when the session does not exist or has expired.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut GameSession) -> T) -> Option<T> {
        let slot = self.slots.get(id)?;
        let mut session = slot.lock();
        Some(f(&mut session))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Live session count, after applying pending expirations and evictions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.run_pending_tasks();
        usize::try_from(self.slots.entry_count()).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.slots.entry_count())
            .field("ttl", &self.ttl)
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convertrail_game::{Rules, TestRequest};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::thread;

    #[test]
    fn created_sessions_start_empty() {
        let store = SessionStore::new(Duration::from_secs(60), 100);
        let id = store.create();
        assert_eq!(id.len(), SESSION_ID_BYTES * 2);
        assert!(store.contains(&id));
        assert_eq!(store.with_session(&id, |s| s.is_started()), Some(false));
        assert_eq!(store.len(), 1);
        assert!(store.with_session("missing", |_| ()).is_none());
    }

    #[test]
    fn expired_sessions_disappear() {
        let store = SessionStore::new(Duration::from_millis(10), 100);
        let id = store.create();
        thread::sleep(Duration::from_millis(50));
        assert!(!store.contains(&id));
        assert!(store.with_session(&id, |_| ()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn capacity_bounds_live_sessions() {
        let store = SessionStore::new(Duration::from_secs(60), 4);
        let ids: Vec<String> = (0..20).map(|_| store.create()).collect();
        assert!(store.len() <= 4, "{} sessions live", store.len());
        assert!(store.contains(&ids[19]));
    }

    #[test]
    fn removed_sessions_are_gone() {
        let store = SessionStore::new(Duration::from_secs(60), 10);
        let id = store.create();
        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(!store.contains(&id));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let rules = Arc::new(Rules::standard());
        let store = Arc::new(SessionStore::new(Duration::from_secs(60), 100));
        let id = store.create();
        store.with_session(&id, |s| {
            s.start_game(&rules);
        });

        let handles: Vec<_> = (0..5)
            .map(|seed| {
                let store = Arc::clone(&store);
                let rules = Arc::clone(&rules);
                let id = id.clone();
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    store.with_session(&id, |s| {
                        s.run_test(&rules, &TestRequest::new("image", "image2", 1), &mut rng)
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap().is_ok());
        }

        let (day, budget, tests) = store
            .with_session(&id, |s| {
                let state = s.state().unwrap();
                (state.day, state.budget, state.tests.len())
            })
            .unwrap();
        assert_eq!(day, 5);
        assert_eq!(budget, 500);
        assert_eq!(tests, 5);
    }
}
