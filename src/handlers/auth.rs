//! Authentication and onboarding handlers.
//!
//! - `/start` - welcome text, adapted to the chat's auth state
//! - `/help` - command reference
//! - `/key` - which access key this chat is using
//! - bare access-key messages - the authentication attempt itself

use crate::auth::AuthOutcome;
use crate::bot::Bot;
use crate::error::BotError;
use crate::models::{CommandRequest, Reply};
use crate::time::format_local_datetime;

/// Reply for any gated command in an unauthenticated chat.
pub const NOT_AUTHENTICATED: &str =
    "This chat isn't authenticated yet. Send your access key as a plain message (five words separated by dashes).";

/// `/start` greeting.
pub async fn welcome(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    if bot.gate.is_authenticated(req.chat_id).await? {
        Ok(Reply::text(
            "You're all set. Use /fast to start a fast, or /help for the full command list.",
        ))
    } else {
        Ok(Reply::text(format!(
            "Welcome to the fasting tracker. {NOT_AUTHENTICATED}"
        )))
    }
}

/// `/help` command reference. Static; available without authentication.
pub fn help() -> Reply {
    Reply::text(
        "Commands:\n\
         /fast [time] - start a fast (optionally backdated, e.g. /fast 2h or /fast 08:30)\n\
         /endfast [time] - end the current fast\n\
         /cancelfast - discard the current fast without recording it\n\
         /status - show the current fast\n\
         /stats - weekly and monthly statistics\n\
         /history - recent fasts\n\
         /timezone [zone] - show or set your timezone (IANA name, e.g. Europe/Paris)\n\
         /key - show which access key this chat uses\n\
         Times can be relative (2h, 30m, 1d, signed like +1h) or a clock time (14:30).",
    )
}

/// `/key` - current grant details, rendered in the user's timezone.
pub async fn key_details(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    match bot.gate.auth_details(req.chat_id).await? {
        Some(details) => {
            let record = bot.fasting.load(req.actor.id).await?;
            let tz = bot.fasting.timezone_of(&record);
            Ok(Reply::text(format!(
                "This chat uses key \"{}\" (expires {}).\nAuthenticated by {} at {}.",
                details.key_name,
                format_local_datetime(details.expires_at, tz),
                details.authenticated_by.name,
                format_local_datetime(details.authenticated_at, tz),
            )))
        }
        None => Ok(Reply::text(NOT_AUTHENTICATED)),
    }
}

/// A bare message that looks like an access key; `req.args` carries it.
pub async fn submit_key(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);

    match bot.gate.authenticate(req.chat_id, &req.actor, &req.args).await? {
        AuthOutcome::Granted {
            key_name,
            expires_at,
        } => Ok(Reply::text(format!(
            "Access granted with key \"{key_name}\" (valid until {}). Use /fast to start a fast.",
            format_local_datetime(expires_at, tz)
        ))),
        AuthOutcome::InvalidKey { failed_attempts } => Ok(Reply::text(format!(
            "That access key isn't valid (failed attempts: {failed_attempts}). Check for typos and try again."
        ))),
        AuthOutcome::ExpiredKey { failed_attempts } => Ok(Reply::text(format!(
            "That access key has expired (failed attempts: {failed_attempts}). Ask whoever runs the bot for a new one."
        ))),
        AuthOutcome::Locked { until } => Ok(Reply::text(format!(
            "Too many failed attempts. Try again after {}.",
            format_local_datetime(until, tz)
        ))),
    }
}
