//! Poise slash commands for talking to Yuno.

use poise::CreateReply;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter, Member, User};

use crate::bot::Data;
use crate::error::{BotError, Result};

use super::relay::{Requester, StatusReport};
use super::response::send_chunks;

/// Context type for chatbot commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

const STATUS_COLOUR: u32 = 0x7289_da;

/// Guild nickname when there is one, otherwise the user's own display name.
fn requester_name(member: Option<&Member>, user: &User) -> String {
    match member {
        Some(member) => member.display_name().to_string(),
        None => user.display_name().to_string(),
    }
}

/// Talk to Yuno. She remembers your recent messages.
#[poise::command(slash_command)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question for Yuno"] question: String,
) -> Result<()> {
    ctx.defer().await?;

    let user_id = ctx.author().id.to_string();
    let display_name = requester_name(ctx.author_member().await.as_deref(), ctx.author());
    let requester = Requester {
        id: &user_id,
        display_name: &display_name,
    };

    let chunks = ctx.data().relay().ask(requester, &question).await;
    send_chunks(ctx, chunks).await
}

/// Wipe your conversation with Yuno.
#[poise::command(slash_command)]
pub async fn clear(ctx: Context<'_>) -> Result<()> {
    let user_id = ctx.author().id.to_string();
    let message = ctx.data().relay().clear(&user_id).await;

    ctx.send(CreateReply::default().content(message).ephemeral(true))
        .await?;
    Ok(())
}

/// Show your conversation stats.
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<()> {
    let user_id = ctx.author().id.to_string();
    let report = ctx.data().relay().status(&user_id).await;

    ctx.send(CreateReply::default().embed(status_embed(&report)))
        .await?;
    Ok(())
}

fn status_embed(report: &StatusReport) -> CreateEmbed {
    CreateEmbed::new()
        .title("🤖 Yuno Status")
        .description("Information about your favourite (and only) AI")
        .colour(STATUS_COLOUR)
        .field(
            "📊 Your stats",
            format!(
                "Messages exchanged: {}\nLast activity: {}",
                report.turn_count,
                report.last_activity_label()
            ),
            true,
        )
        .field(
            "🌐 Global stats",
            format!(
                "Active users: {}\nAvailable commands: {}",
                report.total_users, report.command_count
            ),
            true,
        )
        .footer(CreateEmbedFooter::new("Yuno - your trusted sarcastic AI"))
}

/// Get available chatbot commands.
#[must_use]
pub fn chatbot_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![ask(), clear(), status()]
}
