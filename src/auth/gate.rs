//! Chat authentication against issued API keys.
//!
//! A chat authenticates once by presenting a key; the gate stores a
//! [`ChatAuthRecord`] pointing at the key's hash and every later lookup
//! re-validates that the key still exists and has not expired. Plaintext
//! keys are never stored — the key store is indexed by `sha256:<hex>`.
//!
//! # Security
//! - The rate limiter runs before any credential comparison, so a locked
//!   chat learns nothing about key validity.
//! - A chat record pointing at a deleted or expired key is removed on
//!   first sight, forcing re-authentication.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::keys::{hash_api_key, KeyGenError, KeyGenerator};
use crate::auth::rate_limit::{RateLimitVerdict, RateLimiter};
use crate::clock::SharedClock;
use crate::models::auth::{ApiKeyRecord, ChatAuthRecord};
use crate::models::Actor;
use crate::store::{self, KvStore, StoreError};

/// Result of presenting a key to [`AuthGate::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Key accepted; the chat is authenticated until the key expires or is
    /// revoked.
    Granted {
        key_name: String,
        expires_at: DateTime<Utc>,
    },
    /// No key with that hash exists.
    InvalidKey { failed_attempts: u32 },
    /// The key exists but its expiry has passed.
    ExpiredKey { failed_attempts: u32 },
    /// The chat is locked out; the key was not checked.
    Locked { until: DateTime<Utc> },
}

/// Details of a chat's current authentication, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDetails {
    pub key_name: String,
    pub expires_at: DateTime<Utc>,
    pub authenticated_at: DateTime<Utc>,
    pub authenticated_by: Actor,
}

#[derive(Debug, Error)]
pub enum IssueKeyError {
    #[error(transparent)]
    Random(#[from] KeyGenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authentication gate over the key, chat-auth and rate-limit stores.
pub struct AuthGate {
    api_keys: Arc<dyn KvStore>,
    chat_auth: Arc<dyn KvStore>,
    rate_limiter: RateLimiter,
    clock: SharedClock,
}

impl AuthGate {
    pub fn new(
        api_keys: Arc<dyn KvStore>,
        chat_auth: Arc<dyn KvStore>,
        rate_limits: Arc<dyn KvStore>,
        clock: SharedClock,
    ) -> Self {
        let rate_limiter = RateLimiter::new(rate_limits, clock.clone());
        Self {
            api_keys,
            chat_auth,
            rate_limiter,
            clock,
        }
    }

    fn chat_key(chat_id: i64) -> String {
        chat_id.to_string()
    }

    /// Look up the chat's auth record and re-validate the key behind it.
    ///
    /// Removes the chat record when the key it points at is gone or
    /// expired, so stale grants do not survive key revocation.
    async fn resolve(
        &self,
        chat_id: i64,
    ) -> Result<Option<(ChatAuthRecord, ApiKeyRecord)>, StoreError> {
        let chat_key = Self::chat_key(chat_id);
        let Some(chat_record) =
            store::get_record::<ChatAuthRecord>(self.chat_auth.as_ref(), &chat_key).await?
        else {
            return Ok(None);
        };

        let key_record =
            store::get_record::<ApiKeyRecord>(self.api_keys.as_ref(), &chat_record.api_key_hash)
                .await?;
        match key_record {
            Some(key) if key.expiry > self.clock.now() => Ok(Some((chat_record, key))),
            Some(key) => {
                tracing::info!(chat_id, key_name = %key.name, "auth record expired, clearing");
                self.chat_auth.delete(&chat_key).await?;
                Ok(None)
            }
            None => {
                tracing::info!(chat_id, "auth record points at revoked key, clearing");
                self.chat_auth.delete(&chat_key).await?;
                Ok(None)
            }
        }
    }

    /// Whether the chat currently holds a valid grant.
    pub async fn is_authenticated(&self, chat_id: i64) -> Result<bool, StoreError> {
        Ok(self.resolve(chat_id).await?.is_some())
    }

    /// Current grant details, if any.
    pub async fn auth_details(&self, chat_id: i64) -> Result<Option<AuthDetails>, StoreError> {
        Ok(self.resolve(chat_id).await?.map(|(chat, key)| AuthDetails {
            key_name: key.name,
            expires_at: key.expiry,
            authenticated_at: chat.authenticated_at,
            authenticated_by: chat.authenticated_by,
        }))
    }

    /// Present a plaintext key on behalf of `actor`.
    ///
    /// # Process
    /// 1. Rate-limit check — a locked chat is refused before the key is
    ///    even hashed, and the failure counter does not advance.
    /// 2. Hash the key and look it up.
    /// 3. Unknown or expired keys count as failures; a valid key writes the
    ///    chat's grant and wipes the failure record.
    pub async fn authenticate(
        &self,
        chat_id: i64,
        actor: &Actor,
        raw_key: &str,
    ) -> Result<AuthOutcome, StoreError> {
        if let RateLimitVerdict::Locked { until } = self.rate_limiter.check(chat_id).await? {
            tracing::warn!(chat_id, %until, "auth attempt while locked out");
            return Ok(AuthOutcome::Locked { until });
        }

        let hash = hash_api_key(raw_key.trim());
        let key_record =
            store::get_record::<ApiKeyRecord>(self.api_keys.as_ref(), &hash).await?;

        let key = match key_record {
            Some(key) => key,
            None => {
                let record = self.rate_limiter.record_failure(chat_id).await?;
                tracing::warn!(
                    chat_id,
                    failed_attempts = record.failed_attempts,
                    "rejected unknown api key"
                );
                return Ok(AuthOutcome::InvalidKey {
                    failed_attempts: record.failed_attempts,
                });
            }
        };

        if key.expiry <= self.clock.now() {
            let record = self.rate_limiter.record_failure(chat_id).await?;
            tracing::warn!(
                chat_id,
                key_name = %key.name,
                failed_attempts = record.failed_attempts,
                "rejected expired api key"
            );
            return Ok(AuthOutcome::ExpiredKey {
                failed_attempts: record.failed_attempts,
            });
        }

        let grant = ChatAuthRecord {
            api_key_hash: hash,
            authenticated_at: self.clock.now(),
            authenticated_by: actor.clone(),
        };
        store::put_record(self.chat_auth.as_ref(), &Self::chat_key(chat_id), &grant, None).await?;
        self.rate_limiter.clear(chat_id).await?;

        tracing::info!(chat_id, key_name = %key.name, actor = %actor, "chat authenticated");
        Ok(AuthOutcome::Granted {
            key_name: key.name,
            expires_at: key.expiry,
        })
    }

    /// Mint a new key, store its hash and hand back the plaintext once.
    ///
    /// The plaintext is never persisted; losing the return value means
    /// issuing a new key.
    pub async fn issue_key(
        &self,
        name: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, IssueKeyError> {
        let plaintext = KeyGenerator::default().generate()?;
        let record = ApiKeyRecord {
            name: name.to_string(),
            expiry: expires_at,
            created: self.clock.now(),
        };
        store::put_record(
            self.api_keys.as_ref(),
            &hash_api_key(&plaintext),
            &record,
            None,
        )
        .await?;
        tracing::info!(key_name = %name, %expires_at, "issued api key");
        Ok(plaintext)
    }
}
