//! In-memory session registry keyed by client-supplied session id.
//!
//! Bounded by an LRU: once `capacity` sessions are live, starting a new one
//! evicts the least recently used conversation.

use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    cfg::DEFAULT_MAX_SESSIONS,
    session::{Tutor, TutorSession},
};

/// Id used when the client sends none; matches the single-user web app.
pub const DEFAULT_SESSION_ID: &str = "default";

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_MAX_SESSIONS) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

pub struct SessionStore {
    sessions: Mutex<LruCache<String, Arc<Mutex<TutorSession>>>>,
}

impl SessionStore {
    /// Zero falls back to the default capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the session for `id`, creating a fresh one on first use.
    ///
    /// Callers hold the returned mutex for the whole turn. An evicted session
    /// that is mid-turn finishes normally; its state is dropped afterwards.
    pub async fn get_or_create(&self, tutor: &Tutor, id: &str) -> Arc<Mutex<TutorSession>> {
        let mut cache = self.sessions.lock().await;
        if let Some(s) = cache.get(id) {
            return s.clone();
        }

        let session = Arc::new(Mutex::new(tutor.new_session()));
        if let Some((evicted, _)) = cache.push(id.to_string(), session.clone()) {
            debug!(session_id = %evicted, "session evicted");
        }
        debug!(session_id = id, live = cache.len(), "session created");
        session
    }

    /// Drops the session; the next turn starts over with topic detection.
    /// Returns whether a session existed.
    pub async fn reset(&self, id: &str) -> bool {
        self.sessions.lock().await.pop(id).is_some()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PromptLibrary, TutorConfig, prompts::tests::write_prompt_set};
    use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};

    fn offline_tutor(dir: &std::path::Path) -> Tutor {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "m".into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        };
        let llm = Arc::new(LlmServiceProfiles::new(cfg.clone(), cfg, Some(1)).unwrap());
        Tutor::new(
            llm,
            PromptLibrary::load(dir).unwrap(),
            TutorConfig {
                prompts_dir: dir.to_path_buf(),
                artifacts_dir: dir.to_path_buf(),
                max_sessions: 8,
            },
        )
    }

    #[tokio::test]
    async fn same_id_shares_one_session() {
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        let tutor = offline_tutor(dir.path());
        let store = SessionStore::with_capacity(8);

        let a = store.get_or_create(&tutor, "alice").await;
        let b = store.get_or_create(&tutor, "alice").await;
        let c = store.get_or_create(&tutor, DEFAULT_SESSION_ID).await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn reset_forgets_the_session() {
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        let tutor = offline_tutor(dir.path());
        let store = SessionStore::with_capacity(8);

        let first = store.get_or_create(&tutor, "s").await;
        assert!(store.reset("s").await);
        assert!(!store.reset("s").await);

        let second = store.get_or_create(&tutor, "s").await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.turns(), 0);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let dir = tempfile::tempdir().unwrap();
        write_prompt_set(dir.path());
        let tutor = offline_tutor(dir.path());
        let store = SessionStore::with_capacity(3);

        for i in 0..500 {
            store.get_or_create(&tutor, &format!("client-{i}")).await;
        }
        assert_eq!(store.count().await, 3);

        let a = store.get_or_create(&tutor, "a").await;
        store.get_or_create(&tutor, "b").await;
        store.get_or_create(&tutor, "c").await;
        // Touching `a` makes `b` the oldest.
        let a_again = store.get_or_create(&tutor, "a").await;
        assert!(Arc::ptr_eq(&a, &a_again));

        store.get_or_create(&tutor, "d").await;
        assert_eq!(store.count().await, 3);
        assert!(!store.reset("b").await);
        assert!(store.reset("a").await);
    }
}
