//! Response sending utilities for Discord.

use log::info;

use crate::bot::Data;
use crate::error::{BotError, Result};

type Context<'a> = poise::Context<'a, Data, BotError>;

/// Send reply chunks in order as separate messages.
///
/// After `defer`, poise routes the first chunk to the deferred response
/// and the rest to followups.
pub async fn send_chunks(ctx: Context<'_>, chunks: Vec<String>) -> Result<()> {
    let total = chunks.len();
    for chunk in chunks {
        ctx.say(chunk).await?;
    }

    info!(
        "Replied to {} in channel {} with {total} message(s)",
        ctx.author().tag(),
        ctx.channel_id()
    );
    Ok(())
}
