//! Statistics and history command handlers.
//!
//! - `/stats` - weekly and monthly summary with quick-view buttons
//! - `/history` - recent completed fasts, most recent first

use crate::bot::Bot;
use crate::error::BotError;
use crate::handlers::actions;
use crate::models::{Button, CommandRequest, Keyboard, Reply};
use crate::services::stats::{monthly_stats, recent_fasts, weekly_stats, FastStatistics};
use crate::time::{format_duration_ms, format_local_datetime};

pub(crate) fn stats_keyboard() -> Keyboard {
    Keyboard::single_row(vec![
        Button::new("This week", actions::WEEK_STATS),
        Button::new("This month", actions::MONTH_STATS),
    ])
}

fn render_window(label: &str, stats: &FastStatistics) -> String {
    if stats.total_fasts == 0 {
        return format!("{label}: no completed fasts yet.");
    }
    format!(
        "{label}: {} fasts, {:.1} h total.\nAverage: {}. Longest: {}.",
        stats.total_fasts,
        stats.total_hours,
        format_duration_ms(stats.average_duration_ms),
        format_duration_ms(stats.longest_fast_ms),
    )
}

/// Weekly and monthly summary in one reply.
pub async fn overview(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let now = bot.clock.now();

    let week = weekly_stats(&record.history, now, tz);
    let month = monthly_stats(&record.history, now, tz);
    Ok(Reply::with_keyboard(
        format!(
            "{}\n\n{}",
            render_window("This week", &week),
            render_window("This month", &month)
        ),
        stats_keyboard(),
    ))
}

/// Weekly summary alone; reached from the stats keyboard.
pub async fn weekly(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let week = weekly_stats(&record.history, bot.clock.now(), tz);
    Ok(Reply::text(render_window("This week", &week)))
}

/// Monthly summary alone; reached from the stats keyboard.
pub async fn monthly(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);
    let month = monthly_stats(&record.history, bot.clock.now(), tz);
    Ok(Reply::text(render_window("This month", &month)))
}

/// Most recent completed fasts, newest first, page size from config.
pub async fn history(bot: &Bot, req: &CommandRequest) -> Result<Reply, BotError> {
    let record = bot.fasting.load(req.actor.id).await?;
    let tz = bot.fasting.timezone_of(&record);

    let recent = recent_fasts(&record.history, bot.history_page_size);
    if recent.is_empty() {
        return Ok(Reply::text(
            "No fasts recorded yet. End your first fast with /endfast and it will show up here.",
        ));
    }

    let mut lines = vec![format!("Last {} fasts, most recent first:", recent.len())];
    for entry in recent {
        lines.push(format!(
            "{} to {} ({})",
            format_local_datetime(entry.started_at, tz),
            format_local_datetime(entry.ended_at, tz),
            format_duration_ms(entry.duration_ms),
        ));
    }
    Ok(Reply::text(lines.join("\n")))
}
