//! Small-talk handling and per-session conversation state.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::sync::RwLock;

use crate::composer::Route;

/// Categories of conversational queries answered from canned replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalkKind {
    /// "hi", "hello", "good morning"
    Greeting,
    /// "thanks", "appreciate it"
    Thanks,
    /// "bye", "see you"
    Farewell,
    /// "what can you do", "who are you"
    Capabilities,
}

/// Detects small talk and serves replies from fixed pools.
///
/// Reply selection rotates by turn count instead of random choice so
/// conversations are reproducible.
#[derive(Debug)]
pub struct SmallTalk {
    patterns: Vec<(SmallTalkKind, Regex)>,
}

impl Default for SmallTalk {
    fn default() -> Self {
        // Compiled from literals; the patterns are valid by construction.
        let patterns = vec![
            (
                SmallTalkKind::Greeting,
                Regex::new(r"(?i)\b(hi|hello|hey|good (morning|afternoon|evening)|greetings)\b")
                    .expect("valid greeting pattern"),
            ),
            (
                SmallTalkKind::Thanks,
                Regex::new(r"(?i)\b(thank you|thanks|thx|appreciate)\b")
                    .expect("valid thanks pattern"),
            ),
            (
                SmallTalkKind::Farewell,
                Regex::new(r"(?i)\b(bye|goodbye|see you|farewell)\b")
                    .expect("valid farewell pattern"),
            ),
            (
                SmallTalkKind::Capabilities,
                Regex::new(r"(?i)\b(what can you do|who are you|what are you|help me|your capabilities)\b")
                    .expect("valid capabilities pattern"),
            ),
        ];
        Self { patterns }
    }
}

impl SmallTalk {
    /// Classify a query as small talk, if it is one.
    pub fn detect(&self, query: &str) -> Option<SmallTalkKind> {
        self.patterns.iter().find(|(_, re)| re.is_match(query)).map(|(kind, _)| *kind)
    }

    /// Pick a reply for the given kind, rotating through the pool.
    pub fn reply(&self, kind: SmallTalkKind, turn: usize) -> &'static str {
        let pool: &[&str] = match kind {
            SmallTalkKind::Greeting => &[
                "Hello! I'm the KneadQuality assistant. Ask me about quality management, \
                 process improvement, or the documents in your knowledge base.",
                "Hi there. What quality or process question can I help with today?",
                "Hello! Ready to help with quality tools, methods, or your indexed documents.",
            ],
            SmallTalkKind::Thanks => &[
                "You're welcome. Ask anytime.",
                "Glad that helped. Anything else about your processes?",
                "My pleasure. I'm here when the next question comes up.",
            ],
            SmallTalkKind::Farewell => &[
                "Goodbye! Keep those processes improving.",
                "See you later. The knowledge base will be here when you're back.",
                "Take care!",
            ],
            SmallTalkKind::Capabilities => &[
                "I answer questions about quality management - the 7 QC tools, Six Sigma, \
                 PDCA, lean, root cause analysis - and I can search your indexed documents \
                 for relevant passages. Upload a document and I can answer questions \
                 scoped to it.",
            ],
        };
        pool[turn % pool.len()]
    }
}

/// One completed request/response cycle within a session.
#[derive(Debug, Clone)]
pub struct Turn {
    /// The user's query text.
    pub query: String,
    /// The answer that was returned.
    pub answer: String,
    /// Which strategy produced the answer.
    pub route: Route,
    /// When the turn completed.
    pub asked_at: DateTime<Utc>,
}

const DEFAULT_SESSION_CAPACITY: usize = 10;

/// In-memory conversation state, a capped ring of recent turns per session.
///
/// Ephemeral by design: state does not survive process restart.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, VecDeque<Turn>>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    /// Create a store keeping at most `capacity` recent turns per session.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), capacity: capacity.max(1) }
    }

    /// Append a turn to a session, evicting the oldest beyond capacity.
    pub async fn record(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        if turns.len() == self.capacity {
            turns.pop_front();
        }
        turns.push_back(turn);
    }

    /// The recent turns of a session, oldest first.
    pub async fn recent(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|t| t.iter().cloned().collect()).unwrap_or_default()
    }

    /// How many turns a session has recorded (capped at capacity).
    pub async fn turn_count(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map_or(0, VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_greetings_and_thanks() {
        let st = SmallTalk::default();
        assert_eq!(st.detect("Hello there"), Some(SmallTalkKind::Greeting));
        assert_eq!(st.detect("good morning!"), Some(SmallTalkKind::Greeting));
        assert_eq!(st.detect("thanks a lot"), Some(SmallTalkKind::Thanks));
        assert_eq!(st.detect("what can you do?"), Some(SmallTalkKind::Capabilities));
        assert_eq!(st.detect("What is Six Sigma?"), None);
    }

    #[test]
    fn replies_rotate_deterministically() {
        let st = SmallTalk::default();
        let first = st.reply(SmallTalkKind::Greeting, 0);
        let second = st.reply(SmallTalkKind::Greeting, 1);
        assert_ne!(first, second);
        assert_eq!(first, st.reply(SmallTalkKind::Greeting, 3));
    }

    #[tokio::test]
    async fn session_ring_caps_recent_turns() {
        let store = SessionStore::with_capacity(2);
        for i in 0..3 {
            store
                .record(
                    "s1",
                    Turn {
                        query: format!("q{i}"),
                        answer: format!("a{i}"),
                        route: Route::Fallback,
                        asked_at: Utc::now(),
                    },
                )
                .await;
        }

        let turns = store.recent("s1").await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].query, "q1");
        assert_eq!(turns[1].query, "q2");
        assert_eq!(store.turn_count("unknown").await, 0);
    }
}
