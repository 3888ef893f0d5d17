//! Core of a Telegram intermittent-fasting tracker bot.
//!
//! Authenticated users start and end fasting sessions, retroactively adjust
//! timestamps (`-2h`, `+30m`, `14:00`), and query weekly/monthly statistics.
//! The crate owns everything between a routed command and its reply text;
//! the Telegram wire format, webhook routing and store provisioning belong
//! to the embedding host.
//!
//! # Architecture
//!
//! - **Storage**: an async [`store::KvStore`] contract with JSON records,
//!   confined to one (de)serialization seam
//! - **Authentication**: SHA-256-hashed multi-word access keys behind a
//!   per-chat rate limiter with escalating lockouts
//! - **Time handling**: IANA-zone-aware adjustment parsing and timeline
//!   validation, with all "now" reads behind the [`clock::Clock`] trait
//! - **State machine**: one fasting record per user, single
//!   read-modify-write per transition
//!
//! # Concurrency
//!
//! Each inbound command runs as one task; all cross-request state lives in
//! the store. There is no transaction across a transition's get/put pair:
//! two racing commands for the same user resolve by last write wins.
//! Telegram delivers a chat's messages serially in practice, so this is a
//! documented limitation rather than a guarded path.

pub mod auth;
pub mod bot;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod time;

pub use bot::{Bot, BotStores};
pub use config::Config;
pub use error::BotError;
