//! Fasting Tracker Bot - Dev REPL Entry Point
//!
//! A line-based stand-in for the webhook router, driving the bot core from
//! stdin against in-memory stores. Useful for exercising the command flow
//! without a Telegram connection.
//!
//! # Input Forms
//!
//! - `/verb args` - a routed command, e.g. `/fast 2h`
//! - bare text - the plain-message path (access keys land here)
//! - `@action` - simulates pressing an inline button, e.g. `@fast:end`
//!
//! # Startup Flow
//!
//! 1. Initialize logging (RUST_LOG, default "info")
//! 2. Load configuration from environment variables
//! 3. Assemble the bot over in-memory stores and the system clock
//! 4. Issue a 30-day demo access key and print it
//! 5. Read stdin until EOF

use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use fastbot::clock::SystemClock;
use fastbot::models::{Actor, CommandRequest, Reply};
use fastbot::{Bot, BotStores, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Assemble the bot core
    let bot = Bot::new(BotStores::in_memory(), &config, Arc::new(SystemClock))?;
    tracing::info!("Bot assembled with in-memory stores");

    // Issue a demo key so the auth flow can be exercised end to end
    let demo_key = bot.issue_key("dev", Utc::now() + Duration::days(30)).await?;
    println!("Demo access key (valid 30 days): {demo_key}");
    println!("Send it as a bare line to authenticate, /help for commands, @action to press a button. Ctrl-D exits.");

    // The REPL talks to a single pretend chat
    let actor = Actor::new(1, "dev");
    let chat_id = 1;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = if let Some(action) = line.strip_prefix('@') {
            bot.handle_callback(chat_id, &actor, action).await
        } else if let Some(command) = line.strip_prefix('/') {
            let (verb, args) = command
                .split_once(char::is_whitespace)
                .unwrap_or((command, ""));
            let req = CommandRequest::new(verb.to_lowercase(), args.trim(), actor.clone(), chat_id);
            bot.handle_command(&req).await
        } else {
            bot.handle_text(chat_id, &actor, line).await
        };

        render(&reply);
    }

    Ok(())
}

/// Print a reply the way the chat transport would show it, with buttons
/// rendered as the `@action` lines that trigger them.
fn render(reply: &Reply) {
    println!("{}", reply.text);
    if let Some(keyboard) = &reply.keyboard {
        for row in &keyboard.rows {
            let buttons: Vec<String> = row
                .iter()
                .map(|b| format!("[{} -> @{}]", b.label, b.action))
                .collect();
            println!("  {}", buttons.join("  "));
        }
    }
}
