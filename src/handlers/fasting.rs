//! Fasting command handlers.
//!
//! This module implements the fasting-related commands:
//! - `/fast [time]` - start a fast, optionally backdated
//! - `/endfast [time]` - end the current fast, optionally backdated
//! - `/cancelfast` - discard the current fast without recording it
//! - `/status` - show the open fast or the last completed one
//! - `/timezone [zone]` - show or change the user's timezone
//!
//! Handlers parse and validate the time adjustment before touching the
//! state machine, so a rejected input leaves the stored record untouched.

use crate::bot::Bot;
use crate::error::BotError;
use crate::handlers::actions;
use crate::models::{Button, CommandRequest, Keyboard, Reply};
use crate::services::fasting::FastingError;
use crate::services::stats::last_fast;
use crate::time::{
    check_timeline, format_duration_ms, format_local_datetime, parse_adjustment, Boundary,
};

fn active_fast_keyboard() -> Keyboard {
    Keyboard::single_row(vec![
        Button::new("End fast", actions::END_FAST),
        Button::new("Cancel fast", actions::CANCEL_FAST),
    ])
}

fn not_fasting_reply() -> Reply {
    Reply::text("You're not fasting right now. Use /fast to start one.")
}

/// Start a fast.
///
/// # Process
///
/// 1. Load the record for the timezone and any open session
/// 2. Parse the optional adjustment (`2h`, `+30m`, `08:30`)
/// 3. Timeline-check an adjusted start against now and the open session
/// 4. Hand the start to the state machine
///
/// A fast already being active is a normal reply, not an error; parse and
/// timeline failures surface through the command boundary with their own
/// message.
pub async fn start_fast(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let now = bot.clock.now();

    let adjusted = parse_adjustment(&req.args, now, tz)?;
    if let Some(candidate) = adjusted {
        check_timeline(candidate, now, record.current_fast.as_ref(), Boundary::Start)?;
    }

    match bot.fasting.start_fast(req.actor.id, &req.actor, adjusted).await {
        Ok(current) => Ok(Reply::with_keyboard(
            format!(
                "Fasting started at {}.",
                format_local_datetime(current.started_at, tz)
            ),
            active_fast_keyboard(),
        )),
        Err(FastingError::AlreadyFasting { since }) => Ok(Reply::text(format!(
            "You're already fasting (started {}). Use /endfast to finish it or /cancelfast to discard it.",
            format_local_datetime(since, tz)
        ))),
        Err(err) => Err(err.into()),
    }
}

/// End the current fast and show the recorded entry.
pub async fn end_fast(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let now = bot.clock.now();

    let adjusted = parse_adjustment(&req.args, now, tz)?;
    if let Some(candidate) = adjusted {
        check_timeline(candidate, now, record.current_fast.as_ref(), Boundary::End)?;
    }

    match bot.fasting.end_fast(req.actor.id, &req.actor, adjusted).await {
        Ok(entry) => Ok(Reply::with_keyboard(
            format!(
                "Fast ended after {}.\nStarted {}, ended {}.",
                format_duration_ms(entry.duration_ms),
                format_local_datetime(entry.started_at, tz),
                format_local_datetime(entry.ended_at, tz),
            ),
            super::stats::stats_keyboard(),
        )),
        Err(FastingError::NotFasting) => Ok(not_fasting_reply()),
        Err(err) => Err(err.into()),
    }
}

/// Discard the current fast without recording history.
pub async fn cancel_fast(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);

    match bot.fasting.cancel_fast(req.actor.id).await {
        Ok(discarded) => Ok(Reply::text(format!(
            "Cancelled the fast started at {}. Nothing was recorded.",
            format_local_datetime(discarded.started_at, tz)
        ))),
        Err(FastingError::NotFasting) => Ok(not_fasting_reply()),
        Err(err) => Err(err.into()),
    }
}

/// Show the open fast, or the last completed one when idle.
pub async fn status(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let now = bot.clock.now();

    match &record.current_fast {
        Some(current) => {
            let elapsed_ms = (now - current.started_at).num_milliseconds();
            Ok(Reply::with_keyboard(
                format!(
                    "Fasting for {} (started {} by {}).",
                    format_duration_ms(elapsed_ms),
                    format_local_datetime(current.started_at, tz),
                    current.started_by.name,
                ),
                active_fast_keyboard(),
            ))
        }
        None => match last_fast(&record.history) {
            Some(last) => Ok(Reply::text(format!(
                "Not fasting. Last fast: {} (ended {}).",
                format_duration_ms(last.duration_ms),
                format_local_datetime(last.ended_at, tz),
            ))),
            None => Ok(Reply::text(
                "Not fasting yet. Use /fast to start your first one.",
            )),
        },
    }
}

/// Show or change the user's timezone.
///
/// Zone names are validated by parsing into [`chrono_tz::Tz`]; anything
/// the tz database does not know is rejected with a hint.
pub async fn set_timezone(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let arg = req.args.trim();
    if arg.is_empty() {
        let record = bot.fasting.load(req.actor.id).await?;
        let tz = bot.fasting.timezone_of(&record);
        return Ok(Reply::text(format!(
            "Your timezone is {}. Change it with /timezone <zone>, e.g. /timezone Europe/Paris.",
            tz.name()
        )));
    }

    match arg.parse::<chrono_tz::Tz>() {
        Ok(zone) => {
            bot.fasting.set_timezone(req.actor.id, zone).await?;
            Ok(Reply::text(format!("Timezone set to {}.", zone.name())))
        }
        Err(_) => Ok(Reply::text(format!(
            "Unknown timezone: {arg}. Use an IANA name like Europe/Paris or Asia/Tokyo."
        ))),
    }
}
