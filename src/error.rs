use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Gemini API error ({status}): {message}")]
    GeminiApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Gemini response error: {0}")]
    GeminiResponse(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Generation worker error: {0}")]
    Worker(String),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Short name of the error kind, used in log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Serenity(_) => "Serenity",
            BotError::Config(_) => "Config",
            BotError::EnvVar(_) => "EnvVar",
            BotError::GeminiApi { .. } => "GeminiApi",
            BotError::GeminiResponse(_) => "GeminiResponse",
            BotError::Reqwest(_) => "Reqwest",
            BotError::Worker(_) => "Worker",
        }
    }

    /// Returns the fixed message shown in Discord for this error.
    ///
    /// Every failure of the generation call gets the same apology; anything
    /// else is reported with the generic failure message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::GeminiApi { .. }
            | BotError::GeminiResponse(_)
            | BotError::Reqwest(_)
            | BotError::Worker(_) => APOLOGY_MESSAGE.to_string(),
            BotError::Serenity(_) | BotError::Config(_) | BotError::EnvVar(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// Sent when a generation call fails for any reason.
pub const APOLOGY_MESSAGE: &str = "Apparently my superior circuits are too busy to deal with your trivial question. Try again.";

/// Sent when a command fails outside the generation call.
pub const GENERIC_FAILURE_MESSAGE: &str = "❌ Something went wrong. Even my perfection has limits.";

pub type Result<T> = std::result::Result<T, BotError>;
