//! AI chatbot module - per-user conversations relayed to Gemini.

mod commands;
mod persona;
mod relay;
mod response;
mod split;
mod store;
mod worker;

pub use commands::chatbot_commands;
pub use persona::{PERSONA_PROMPT, build_request, persona_preamble};
pub use relay::{
    CLEARED_MESSAGE, COMMAND_COUNT, FALLBACK_REPLY, NOTHING_TO_CLEAR_MESSAGE, Relay, Requester,
    StatusReport,
};
pub use split::{HARD_LIMIT, SOFT_LIMIT, split_message, split_with_limits};
pub use store::{ConversationEntry, ConversationStore, EXPIRE_HOURS, EntryStats, MAX_TURNS};
pub use worker::{GenerationPool, Generator};
