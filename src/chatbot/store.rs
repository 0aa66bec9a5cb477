//! Per-user conversation history with bounded length and expiry.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::types::{MessageRole, Turn};

/// Maximum number of turns kept per user.
pub const MAX_TURNS: usize = 20;

/// Hours of inactivity after which a conversation is discarded.
pub const EXPIRE_HOURS: i64 = 24;

/// Stored conversation state for one user.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    id: u64,
    turns: Vec<Turn>,
    last_activity: DateTime<Utc>,
}

impl ConversationEntry {
    fn new(id: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            turns: Vec::new(),
            last_activity: now,
        }
    }

    /// Identifies this entry; a user's entry created after a clear or
    /// expiry gets a new id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Turns in insertion order, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    fn push(&mut self, turn: Turn, now: DateTime<Utc>, max_turns: usize) {
        self.turns.push(turn);
        self.last_activity = now;

        if self.turns.len() > max_turns {
            let excess = self.turns.len() - max_turns;
            self.turns.drain(..excess);
        }
    }
}

/// Read-only snapshot of one user's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStats {
    pub turn_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Process-wide map from user id to conversation entry.
#[derive(Debug)]
pub struct ConversationStore {
    entries: HashMap<String, ConversationEntry>,
    next_id: u64,
    max_turns: usize,
    ttl: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(MAX_TURNS, Duration::hours(EXPIRE_HOURS))
    }
}

impl ConversationStore {
    #[must_use]
    pub fn new(max_turns: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 0,
            max_turns: max_turns.max(1),
            ttl,
        }
    }

    /// Returns the user's entry, creating an empty one if needed.
    pub fn get_or_create(&mut self, user_id: &str) -> &mut ConversationEntry {
        self.get_or_create_at(user_id, Utc::now())
    }

    fn get_or_create_at(&mut self, user_id: &str, now: DateTime<Utc>) -> &mut ConversationEntry {
        let next_id = &mut self.next_id;
        self.entries.entry(user_id.to_string()).or_insert_with(|| {
            *next_id += 1;
            ConversationEntry::new(*next_id, now)
        })
    }

    /// Appends a turn for the user and refreshes their activity timestamp.
    pub fn append(&mut self, user_id: &str, role: MessageRole, text: impl Into<String>) {
        self.append_at(user_id, role, text, Utc::now());
    }

    pub fn append_at(
        &mut self,
        user_id: &str,
        role: MessageRole,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let max_turns = self.max_turns;
        self.get_or_create_at(user_id, now)
            .push(Turn::new(role, text), now, max_turns);
    }

    /// Appends a turn only if the user's entry is still entry `entry_id`.
    ///
    /// Returns `false`, leaving the store untouched, when that entry was
    /// cleared or expired in the meantime.
    pub fn append_to_entry(
        &mut self,
        user_id: &str,
        entry_id: u64,
        role: MessageRole,
        text: impl Into<String>,
    ) -> bool {
        self.append_to_entry_at(user_id, entry_id, role, text, Utc::now())
    }

    pub fn append_to_entry_at(
        &mut self,
        user_id: &str,
        entry_id: u64,
        role: MessageRole,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let max_turns = self.max_turns;
        match self.entries.get_mut(user_id) {
            Some(entry) if entry.id == entry_id => {
                entry.push(Turn::new(role, text), now, max_turns);
                true
            }
            _ => false,
        }
    }

    /// Removes the user's entry. Returns whether one existed.
    pub fn clear(&mut self, user_id: &str) -> bool {
        self.entries.remove(user_id).is_some()
    }

    /// Drops every entry idle for strictly longer than the expiry window.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.last_activity) <= ttl);

        let removed = before - self.entries.len();
        if removed > 0 {
            info!("Swept {removed} expired conversations");
        }
        removed
    }

    #[must_use]
    pub fn stats(&self, user_id: &str) -> EntryStats {
        match self.entries.get(user_id) {
            Some(entry) => EntryStats {
                turn_count: entry.turns.len(),
                last_activity: Some(entry.last_activity),
            },
            None => EntryStats {
                turn_count: 0,
                last_activity: None,
            },
        }
    }

    #[must_use]
    pub fn total_users(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the user's turns, oldest first. Empty for unknown users.
    #[must_use]
    pub fn snapshot(&self, user_id: &str) -> Vec<Turn> {
        self.entries
            .get(user_id)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default()
    }
}
