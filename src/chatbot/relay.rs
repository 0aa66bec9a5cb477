//! Platform-independent handling of the `ask`, `clear` and `status` commands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::types::MessageRole;

use super::persona::build_request;
use super::split::split_message;
use super::store::{ConversationStore, EntryStats};
use super::worker::{GenerationPool, Generator};

/// Stored and sent when the model answers with no usable text.
pub const FALLBACK_REPLY: &str =
    "Hmm, it seems my genius is temporarily unavailable. Try again, human.";

pub const CLEARED_MESSAGE: &str =
    "🗑️ Finally! I wiped our conversation. Now I can pretend we never met.";

pub const NOTHING_TO_CLEAR_MESSAGE: &str =
    "🤔 We have no history to clear. You're about as memorable as a goldfish.";

/// Number of slash commands the bot exposes.
pub const COMMAND_COUNT: usize = 3;

/// Who is asking. Ids are opaque strings.
#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
    pub id: &'a str,
    pub display_name: &'a str,
}

/// Data shown by the `status` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub turn_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    pub total_users: usize,
    pub command_count: usize,
}

impl StatusReport {
    /// Last activity as time of day, or "never".
    #[must_use]
    pub fn last_activity_label(&self) -> String {
        self.last_activity.map_or_else(
            || "never".to_string(),
            |at| at.format("%H:%M:%S UTC").to_string(),
        )
    }
}

/// Ties the conversation store to the generation workers.
pub struct Relay {
    store: Mutex<ConversationStore>,
    pool: GenerationPool,
}

impl Relay {
    pub fn new(store: ConversationStore, generator: Arc<dyn Generator>, workers: usize) -> Self {
        Self {
            store: Mutex::new(store),
            pool: GenerationPool::new(generator, workers),
        }
    }

    /// Answer a question with the user's context and return the message chunks to send.
    ///
    /// Generation failures are not returned as errors: the user gets an
    /// apology and their question stays in history for the next attempt.
    pub async fn ask(&self, requester: Requester<'_>, question: &str) -> Vec<String> {
        let (entry_id, request) = {
            let mut store = self.store.lock().await;
            store.sweep_expired(Utc::now());
            let entry_id = store.get_or_create(requester.id).id();
            store.append(requester.id, MessageRole::User, question);
            let request = build_request(requester.display_name, store.snapshot(requester.id));
            (entry_id, request)
        };
        debug!(
            "Built request for {} with {} turns",
            requester.id,
            request.len()
        );

        let reply = match self.pool.submit(request).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                info!("No usable text for {}, sending fallback", requester.id);
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                error!(
                    "Failed to generate reply for {} ({}): {e}",
                    requester.display_name, requester.id
                );
                return vec![e.user_message()];
            }
        };

        let recorded = self.store.lock().await.append_to_entry(
            requester.id,
            entry_id,
            MessageRole::Model,
            reply.as_str(),
        );
        if !recorded {
            info!(
                "Conversation for {} was cleared while generating, reply not stored",
                requester.id
            );
        }

        split_message(&reply)
    }

    /// Forget the user's conversation and return the confirmation to show.
    pub async fn clear(&self, user_id: &str) -> &'static str {
        if self.store.lock().await.clear(user_id) {
            info!("Cleared conversation for {user_id}");
            CLEARED_MESSAGE
        } else {
            NOTHING_TO_CLEAR_MESSAGE
        }
    }

    pub async fn status(&self, user_id: &str) -> StatusReport {
        let store = self.store.lock().await;
        let EntryStats {
            turn_count,
            last_activity,
        } = store.stats(user_id);

        StatusReport {
            turn_count,
            last_activity,
            total_users: store.total_users(),
            command_count: COMMAND_COUNT,
        }
    }

    #[cfg(test)]
    async fn history(&self, user_id: &str) -> Vec<crate::types::Turn> {
        self.store.lock().await.snapshot(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::{APOLOGY_MESSAGE, BotError, Result};
    use crate::types::Turn;

    /// Replays canned results and records every request it receives.
    struct Scripted {
        replies: StdMutex<Vec<Result<Option<String>>>>,
        requests: StdMutex<Vec<Vec<Turn>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Option<String>>>) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.into_iter().rev().collect()),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Vec<Turn>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for Scripted {
        async fn generate(&self, turns: &[Turn]) -> Result<Option<String>> {
            self.requests.lock().unwrap().push(turns.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(None))
        }
    }

    /// Holds its reply until released, so commands can run mid-generation.
    struct Gated {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Generator for Gated {
        async fn generate(&self, _turns: &[Turn]) -> Result<Option<String>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(Some("late reply".to_string()))
        }
    }

    fn relay(generator: Arc<dyn Generator>) -> Relay {
        Relay::new(ConversationStore::default(), generator, 2)
    }

    const ALICE: Requester<'static> = Requester {
        id: "1001",
        display_name: "Alice",
    };

    #[tokio::test]
    async fn ask_sends_reply_and_records_both_turns() {
        let generator = Scripted::new(vec![Ok(Some("Nya~ hello, servant!".to_string()))]);
        let relay = relay(generator.clone());

        let chunks = relay.ask(ALICE, "hi Yuno").await;
        assert_eq!(chunks, vec!["Nya~ hello, servant!".to_string()]);
        assert_eq!(
            relay.history(ALICE.id).await,
            vec![Turn::user("hi Yuno"), Turn::model("Nya~ hello, servant!")]
        );

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);
        assert!(requests[0][0].text.contains("Alice"));
        assert_eq!(requests[0][1], Turn::user("hi Yuno"));
    }

    #[tokio::test]
    async fn follow_up_carries_previous_turns() {
        let generator = Scripted::new(vec![
            Ok(Some("first".to_string())),
            Ok(Some("second".to_string())),
        ]);
        let relay = relay(generator.clone());

        relay.ask(ALICE, "one").await;
        relay.ask(ALICE, "two").await;

        let last = generator.requests().pop().unwrap();
        assert_eq!(
            &last[1..],
            &[Turn::user("one"), Turn::model("first"), Turn::user("two")]
        );
    }

    #[tokio::test]
    async fn empty_reply_uses_fallback() {
        let generator = Scripted::new(vec![Ok(None)]);
        let relay = relay(generator);

        let before = relay.status(ALICE.id).await;
        let chunks = relay.ask(ALICE, "anyone there?").await;
        let after = relay.status(ALICE.id).await;

        assert_eq!(chunks, vec![FALLBACK_REPLY.to_string()]);
        assert_eq!(after.turn_count, before.turn_count + 2);
        assert_eq!(
            relay.history(ALICE.id).await.last(),
            Some(&Turn::model(FALLBACK_REPLY))
        );
    }

    #[tokio::test]
    async fn failed_generation_keeps_only_question() {
        let generator = Scripted::new(vec![Err(BotError::GeminiResponse(
            "upstream exploded".to_string(),
        ))]);
        let relay = relay(generator);

        let chunks = relay.ask(ALICE, "will this work?").await;

        assert_eq!(chunks, vec![APOLOGY_MESSAGE.to_string()]);
        assert_eq!(
            relay.history(ALICE.id).await,
            vec![Turn::user("will this work?")]
        );
    }

    #[tokio::test]
    async fn long_reply_is_split() {
        let generator = Scripted::new(vec![Ok(Some("a".repeat(2500)))]);
        let relay = relay(generator);

        let chunks = relay.ask(ALICE, "monologue please").await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 2000));
        // Full reply is stored, not the chunks.
        assert_eq!(
            relay.history(ALICE.id).await.last().unwrap().text.len(),
            2500
        );
    }

    #[tokio::test]
    async fn clear_then_status() {
        let generator = Scripted::new(vec![Ok(Some("hi".to_string()))]);
        let relay = relay(generator);

        assert_eq!(relay.clear(ALICE.id).await, NOTHING_TO_CLEAR_MESSAGE);

        relay.ask(ALICE, "hello").await;
        assert_eq!(relay.status(ALICE.id).await.total_users, 1);

        assert_eq!(relay.clear(ALICE.id).await, CLEARED_MESSAGE);
        let status = relay.status(ALICE.id).await;
        assert_eq!(status.turn_count, 0);
        assert_eq!(status.last_activity_label(), "never");
        assert_eq!(status.total_users, 0);
        assert_eq!(status.command_count, COMMAND_COUNT);
    }

    #[tokio::test]
    async fn clear_during_generation_is_not_undone_by_reply() {
        let generator = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });
        let relay = Arc::new(relay(generator.clone()));

        let pending = tokio::spawn({
            let relay = Arc::clone(&relay);
            async move { relay.ask(ALICE, "slow question").await }
        });
        generator.started.notified().await;

        assert_eq!(relay.clear(ALICE.id).await, CLEARED_MESSAGE);
        generator.release.notify_one();

        let chunks = pending.await.unwrap();
        assert_eq!(chunks, vec!["late reply".to_string()]);

        let status = relay.status(ALICE.id).await;
        assert_eq!(status.turn_count, 0);
        assert_eq!(status.last_activity_label(), "never");
        assert_eq!(status.total_users, 0);
        assert!(relay.history(ALICE.id).await.is_empty());
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let generator = Scripted::new(vec![Ok(Some("a".to_string())), Ok(Some("b".to_string()))]);
        let relay = relay(generator);
        let bob = Requester {
            id: "2002",
            display_name: "Bob",
        };

        relay.ask(ALICE, "from alice").await;
        relay.ask(bob, "from bob").await;

        assert_eq!(relay.status(ALICE.id).await.turn_count, 2);
        assert_eq!(relay.status(bob.id).await.turn_count, 2);
        assert_eq!(relay.status(bob.id).await.total_users, 2);
        assert_eq!(relay.history(bob.id).await[0], Turn::user("from bob"));
    }

    #[test]
    fn last_activity_is_time_of_day() {
        let report = StatusReport {
            turn_count: 2,
            last_activity: DateTime::from_timestamp(1_700_000_000, 0),
            total_users: 1,
            command_count: COMMAND_COUNT,
        };
        assert_eq!(report.last_activity_label(), "22:13:20 UTC");
    }
}
