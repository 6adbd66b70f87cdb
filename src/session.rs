// src/session.rs

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// The authenticated session a request acts on, injected into request
/// extensions by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

/// Server-side state for one unlocked client.
///
/// A `Session` only exists after the access gate accepted the shared
/// password, and every practice route sits behind the token middleware, so
/// holding a session id is what "authenticated" means here.
#[derive(Debug, Clone)]
pub struct Session {
    /// The most recently generated question. Replaced, never appended.
    pub current_prompt: Option<String>,

    /// Topic label attached to `current_prompt`, used for history rows.
    pub current_theme: String,

    /// Free text the user is composing. Accepted verbatim, never validated.
    pub draft_answer: String,

    /// Latest evaluation for the current question/answer pair.
    pub last_feedback: Option<String>,

    /// When the countdown was armed. Re-arming overwrites it.
    pub timer_start: Option<DateTime<Utc>>,

    /// Cached answer-outline hint for the current question.
    pub suggested_structure: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_prompt: None,
            current_theme: String::new(),
            draft_answer: String::new(),
            last_feedback: None,
            timer_start: None,
            suggested_structure: None,
            created_at: now,
        }
    }

    /// Replaces the current question.
    ///
    /// Feedback and the cached outline hint belong to the previous question,
    /// so both are dropped here. The answer draft is deliberately kept: the
    /// user may want to carry notes over to the new question.
    pub fn install_prompt(&mut self, theme: &str, text: &str) {
        self.current_prompt = Some(text.to_string());
        self.current_theme = theme.to_string();
        self.last_feedback = None;
        self.suggested_structure = None;
    }

    /// Stores the answer draft and returns its character count.
    pub fn set_draft(&mut self, text: String) -> usize {
        self.draft_answer = text;
        self.draft_answer.chars().count()
    }

    pub fn set_feedback(&mut self, text: String) {
        self.last_feedback = Some(text);
    }

    /// Arms (or re-arms) the countdown. No stacking: the previous start
    /// time, if any, is overwritten.
    pub fn arm_timer(&mut self, now: DateTime<Utc>) {
        self.timer_start = Some(now);
    }
}

/// In-memory session map, keyed by the id carried in the session token.
///
/// Two clients get two independent entries; nothing is shared between them.
/// Entries older than the token lifetime are pruned lazily on creation, so
/// the map cannot grow past the set of sessions whose tokens could still
/// validate.
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Creates a fresh session and returns its id.
    pub async fn create(&self) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut map = self.inner.write().await;

        let cutoff = now
            - chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::hours(8));
        map.retain(|_, s| s.created_at > cutoff);

        map.insert(id, Session::new(now));
        id
    }

    /// Returns a snapshot of the session, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.inner.read().await.contains_key(&id)
    }

    /// Runs a mutation against the session under the write lock.
    /// Returns `None` when the session no longer exists.
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.inner.write().await.get_mut(&id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_prompt_clears_stale_feedback_and_hint() {
        let mut session = Session::new(Utc::now());
        session.install_prompt("Leadership vision", "First question?");
        session.set_feedback("Good answer. Score: 20/25".to_string());
        session.suggested_structure = Some("1. Context 2. Actions".to_string());
        session.set_draft("my notes".to_string());

        session.install_prompt("Crisis management", "Second question?");

        assert_eq!(session.current_prompt.as_deref(), Some("Second question?"));
        assert_eq!(session.current_theme, "Crisis management");
        assert!(session.last_feedback.is_none());
        assert!(session.suggested_structure.is_none());
        // The draft survives a question change.
        assert_eq!(session.draft_answer, "my notes");
    }

    #[test]
    fn set_draft_counts_characters_not_bytes() {
        let mut session = Session::new(Utc::now());
        let count = session.set_draft("品格教育".to_string());
        assert_eq!(count, 4);
    }

    #[test]
    fn arming_twice_overwrites_the_start_time() {
        let mut session = Session::new(Utc::now());
        let first = Utc::now();
        session.arm_timer(first);
        let second = first + chrono::Duration::seconds(30);
        session.arm_timer(second);
        assert_eq!(session.timer_start, Some(second));
    }

    #[tokio::test]
    async fn store_isolates_sessions() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let a = store.create().await;
        let b = store.create().await;

        store
            .update(a, |s| s.install_prompt("Leadership vision", "Q?"))
            .await
            .unwrap();

        assert!(store.get(a).await.unwrap().current_prompt.is_some());
        assert!(store.get(b).await.unwrap().current_prompt.is_none());
    }

    #[tokio::test]
    async fn update_on_missing_session_returns_none() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let missing = Uuid::new_v4();
        assert!(store.update(missing, |s| s.set_draft("x".into())).await.is_none());
    }
}
