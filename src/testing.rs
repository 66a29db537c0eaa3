//! Test doubles for downstream crates (and this one) to exercise MFA call
//! sites without a real database.

use crate::store::UserStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug, Default)]
struct MfaRecord {
    secret: Option<String>,
    active: Option<bool>,
}

/// In-memory [`UserStore`] with call counting and failure injection.
///
/// Each mutator counts its invocations so tests can assert that a gated or
/// failed operation performed exactly the writes it was allowed to.
#[derive(Default)]
pub struct InMemoryUserStore {
    records: Mutex<HashMap<String, MfaRecord>>,
    secret_calls: AtomicUsize,
    active_calls: AtomicUsize,
    fail_secret: AtomicBool,
    fail_active: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `update_mfa_secret` call fail.
    pub fn fail_on_secret(self) -> Self {
        self.fail_secret.store(true, Ordering::Relaxed);
        self
    }

    /// Make every `update_mfa_active` call fail.
    pub fn fail_on_active(self) -> Self {
        self.fail_active.store(true, Ordering::Relaxed);
        self
    }

    /// Number of `update_mfa_secret` calls seen (including failed ones).
    pub fn secret_calls(&self) -> usize {
        self.secret_calls.load(Ordering::Relaxed)
    }

    /// Number of `update_mfa_active` calls seen (including failed ones).
    pub fn active_calls(&self) -> usize {
        self.active_calls.load(Ordering::Relaxed)
    }

    /// The last successfully stored secret for a user, if any.
    pub fn stored_secret(&self, user_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .and_then(|r| r.secret.clone())
    }

    /// The last successfully stored active flag for a user, if any.
    pub fn stored_active(&self, user_id: &str) -> Option<bool> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .and_then(|r| r.active)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn update_mfa_secret(&self, user_id: &str, secret: &str) -> anyhow::Result<()> {
        self.secret_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_secret.load(Ordering::Relaxed) {
            anyhow::bail!("injected failure: update_mfa_secret");
        }
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.entry(user_id.to_string()).or_default().secret = Some(secret.to_string());
        Ok(())
    }

    async fn update_mfa_active(&self, user_id: &str, active: bool) -> anyhow::Result<()> {
        self.active_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_active.load(Ordering::Relaxed) {
            anyhow::bail!("injected failure: update_mfa_active");
        }
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.entry(user_id.to_string()).or_default().active = Some(active);
        Ok(())
    }
}
