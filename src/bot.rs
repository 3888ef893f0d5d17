//! Bot facade: verb dispatch, authentication gating and the error boundary.
//!
//! The host layer (webhook router, or the dev REPL) hands every inbound
//! message to one of three entry points:
//! - [`Bot::handle_command`] for `/verb args` messages
//! - [`Bot::handle_text`] for bare messages (access keys land here)
//! - [`Bot::handle_callback`] for inline-keyboard presses
//!
//! None of them return an error: storage failures are logged and turned
//! into a generic "try again" reply, validation failures surface their own
//! explanation. A failed command never leaves partial record state behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::auth::{looks_like_api_key, AuthGate};
use crate::clock::SharedClock;
use crate::config::{Config, ConfigError};
use crate::error::BotError;
use crate::handlers::{self, actions};
use crate::models::{Actor, CommandRequest, Reply};
use crate::services::fasting::FastingService;
use crate::store::{KvStore, MemoryKvStore};

/// The four logical store handles the bot reads and writes.
///
/// They may share one physical namespace or not; key formats do not
/// collide within a handle, and the bot never scans across them.
pub struct BotStores {
    pub api_keys: Arc<dyn KvStore>,
    pub chat_auth: Arc<dyn KvStore>,
    pub rate_limits: Arc<dyn KvStore>,
    pub fasting: Arc<dyn KvStore>,
}

impl BotStores {
    /// Four independent in-memory stores, for tests and the dev REPL.
    pub fn in_memory() -> Self {
        Self {
            api_keys: Arc::new(MemoryKvStore::new()),
            chat_auth: Arc::new(MemoryKvStore::new()),
            rate_limits: Arc::new(MemoryKvStore::new()),
            fasting: Arc::new(MemoryKvStore::new()),
        }
    }
}

/// The assembled bot core.
pub struct Bot {
    pub(crate) gate: AuthGate,
    pub(crate) fasting: FastingService,
    pub(crate) clock: SharedClock,
    pub(crate) history_page_size: usize,
}

impl Bot {
    /// Wire the components together.
    ///
    /// # Errors
    ///
    /// Fails when the configured default timezone does not name a real
    /// IANA zone.
    pub fn new(stores: BotStores, config: &Config, clock: SharedClock) -> Result<Self, ConfigError> {
        let tz: Tz = config.timezone()?;
        let gate = AuthGate::new(
            stores.api_keys,
            stores.chat_auth,
            stores.rate_limits,
            clock.clone(),
        );
        let fasting = FastingService::new(stores.fasting, clock.clone(), tz);
        Ok(Self {
            gate,
            fasting,
            clock,
            history_page_size: config.history_page_size,
        })
    }

    /// Mint and store a new access key, returning its plaintext once.
    pub async fn issue_key(
        &self,
        name: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, BotError> {
        Ok(self.gate.issue_key(name, expires_at).await?)
    }

    /// Handle a routed `/verb args` command.
    pub async fn handle_command(&self, req: &CommandRequest) -> Reply {
        match self.dispatch(req).await {
            Ok(reply) => reply,
            Err(err) => self.reply_for_error(req, err),
        }
    }

    /// Handle a bare message: access-key candidates go through
    /// authentication, anything else gets a pointer to `/help`.
    pub async fn handle_text(&self, chat_id: i64, actor: &Actor, text: &str) -> Reply {
        let trimmed = text.trim();
        if looks_like_api_key(trimmed) {
            let req = CommandRequest::new("auth", trimmed, actor.clone(), chat_id);
            match handlers::auth::submit_key(self, &req).await {
                Ok(reply) => reply,
                Err(err) => self.reply_for_error(&req, err),
            }
        } else {
            Reply::text(
                "I only understand commands and access keys. Send /help for the command list.",
            )
        }
    }

    /// Handle an inline-keyboard press. Buttons reuse the command paths,
    /// so a stale button behaves exactly like typing the command now.
    pub async fn handle_callback(&self, chat_id: i64, actor: &Actor, action: &str) -> Reply {
        let req = CommandRequest::new("callback", "", actor.clone(), chat_id);
        let result = self.dispatch_callback(&req, action).await;
        match result {
            Ok(reply) => reply,
            Err(err) => self.reply_for_error(&req, err),
        }
    }

    async fn dispatch_callback(
        &self,
        req: &CommandRequest,
        action: &str,
    ) -> Result<Reply, BotError> {
        if !self.gate.is_authenticated(req.chat_id).await? {
            return Ok(Reply::text(handlers::auth::NOT_AUTHENTICATED));
        }
        match action {
            actions::END_FAST => handlers::fasting::end_fast(self, req).await,
            actions::CANCEL_FAST => handlers::fasting::cancel_fast(self, req).await,
            actions::WEEK_STATS => handlers::stats::weekly(self, req).await,
            actions::MONTH_STATS => handlers::stats::monthly(self, req).await,
            _ => Ok(Reply::text(
                "That button isn't wired to anything anymore. Send /help for commands.",
            )),
        }
    }

    async fn dispatch(&self, req: &CommandRequest) -> Result<Reply, BotError> {
        // /start and /help work before authentication; everything else is
        // behind the gate.
        match req.verb.as_str() {
            "start" => return handlers::auth::welcome(self, req).await,
            "help" => return Ok(handlers::auth::help()),
            _ => {}
        }
        if !self.gate.is_authenticated(req.chat_id).await? {
            return Ok(Reply::text(handlers::auth::NOT_AUTHENTICATED));
        }

        match req.verb.as_str() {
            "fast" => handlers::fasting::start_fast(self, req).await,
            "endfast" => handlers::fasting::end_fast(self, req).await,
            "cancelfast" => handlers::fasting::cancel_fast(self, req).await,
            "status" => handlers::fasting::status(self, req).await,
            "timezone" => handlers::fasting::set_timezone(self, req).await,
            "stats" => handlers::stats::overview(self, req).await,
            "history" => handlers::stats::history(self, req).await,
            "key" => handlers::auth::key_details(self, req).await,
            other => Ok(Reply::text(format!(
                "Unknown command /{other}. Send /help for the list."
            ))),
        }
    }

    fn reply_for_error(&self, req: &CommandRequest, err: BotError) -> Reply {
        if err.is_internal() {
            tracing::error!(
                chat_id = req.chat_id,
                verb = %req.verb,
                error = %err,
                "command failed"
            );
        } else {
            tracing::debug!(
                chat_id = req.chat_id,
                verb = %req.verb,
                error = %err,
                "command rejected"
            );
        }
        Reply::text(err.user_message())
    }
}
