//! Discord bot setup and framework-level error handling.

use std::sync::Arc;

use log::{debug, error, info, warn};
use poise::{
    CreateReply, Framework, FrameworkError, FrameworkOptions, builtins,
    serenity_prelude::{
        ClientBuilder, CreateInteractionResponse, CreateInteractionResponseFollowup,
        CreateInteractionResponseMessage, GatewayIntents,
    },
};

use crate::chatbot::{ConversationStore, Relay, chatbot_commands};
use crate::config::Config;
use crate::error::{BotError, GENERIC_FAILURE_MESSAGE, Result};
use crate::gemini::GeminiClient;

type Context<'a> = poise::Context<'a, Data, BotError>;

pub struct Data {
    relay: Relay,
}

impl Data {
    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }
}

/// Run the Discord bot.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the Discord client
/// cannot be created or started.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing Gemini client");
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_timeout,
    )?;

    let store = ConversationStore::new(config.history_max_turns, config.history_ttl);
    let relay = Relay::new(store, Arc::new(gemini), config.generation_workers);

    let intents = GatewayIntents::non_privileged();

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: chatbot_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord as {}", ready.user.name);
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    "Registered {} commands",
                    framework.options().commands.len()
                );
                Ok(Data { relay })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn on_error(error: FrameworkError<'_, Data, BotError>) {
    match error {
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let message = format!(
                "🕐 Easy, human! Wait {:.1} seconds.",
                remaining_cooldown.as_secs_f32()
            );
            if let Err(e) = reply_ephemeral(ctx, message).await {
                warn!("Failed to send cooldown notice: {e}");
            }
        }
        FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Slash command /{} failed for {}: {} - {error}",
                ctx.command().name,
                ctx.author().tag(),
                error.kind()
            );
            if let Err(e) = reply_ephemeral(ctx, error.user_message()).await {
                warn!("Failed to send failure notice: {e}");
            }
        }
        FrameworkError::CommandPanic { payload, ctx, .. } => {
            error!(
                "Slash command /{} panicked: {}",
                ctx.command().name,
                payload.as_deref().unwrap_or("<no payload>")
            );
            if let Err(e) = reply_ephemeral(ctx, GENERIC_FAILURE_MESSAGE.to_string()).await {
                warn!("Failed to send failure notice: {e}");
            }
        }
        FrameworkError::UnknownCommand { msg_content, .. } => {
            debug!("Ignoring unknown command: {msg_content}");
        }
        FrameworkError::UnknownInteraction { interaction, .. } => {
            debug!("Ignoring unknown interaction: {}", interaction.data.name);
        }
        other => {
            if let Err(e) = builtins::on_error(other).await {
                error!("Error while handling framework error: {e}");
            }
        }
    }
}

/// Send an ephemeral message on whichever response channel is still free.
///
/// The initial interaction response is tried first; if the interaction was
/// already answered (or deferred) the message goes out as a followup.
async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<()> {
    match ctx {
        poise::Context::Application(app) => {
            let initial = CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content.clone())
                    .ephemeral(true),
            );
            if let Err(e) = app
                .interaction
                .create_response(ctx.serenity_context(), initial)
                .await
            {
                debug!("Initial response unavailable ({e}), using followup");
                let followup = CreateInteractionResponseFollowup::new()
                    .content(content)
                    .ephemeral(true);
                app.interaction
                    .create_followup(ctx.serenity_context(), followup)
                    .await?;
            }
        }
        poise::Context::Prefix(_) => {
            ctx.send(CreateReply::default().content(content).ephemeral(true))
                .await?;
        }
    }
    Ok(())
}
