//! Configuration snapshot and providers.
//!
//! The MFA manager never reads global state: it holds a [`ConfigProvider`]
//! and asks it for a fresh snapshot on every call, so a hot-reloaded
//! configuration takes effect immediately.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Configuration snapshot consumed by the MFA manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MfaConfig {
    /// Global gate: when false, every MFA operation fails without touching
    /// the store.
    #[serde(default = "default_mfa_enabled")]
    pub mfa_enabled: bool,
    /// Externally visible site URL, used (canonicalized) as the issuer label
    /// in provisioning payloads. May be empty.
    #[serde(default)]
    pub site_url: String,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            mfa_enabled: default_mfa_enabled(),
            site_url: String::new(),
        }
    }
}

fn default_mfa_enabled() -> bool {
    false
}

impl MfaConfig {
    /// Create a config with the gate open and the given site URL.
    pub fn enabled(site_url: impl Into<String>) -> Self {
        Self {
            mfa_enabled: true,
            site_url: site_url.into(),
        }
    }

    /// Load configuration from environment variables with the `TWOSTEP_`
    /// prefix (`TWOSTEP_MFA_ENABLED`, `TWOSTEP_SITE_URL`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(enabled) = std::env::var("TWOSTEP_MFA_ENABLED") {
            config.mfa_enabled = enabled.parse().unwrap_or(false);
        }
        if let Ok(site_url) = std::env::var("TWOSTEP_SITE_URL") {
            config.site_url = site_url;
        }
        config
    }
}

/// Source of configuration snapshots.
///
/// Implementations must return the *current* configuration; the manager
/// re-reads it on every operation and never caches the gate.
pub trait ConfigProvider: Send + Sync {
    fn get_config(&self) -> MfaConfig;
}

/// A fixed configuration is its own provider. Useful for tests and for
/// deployments that restart on config changes.
impl ConfigProvider for MfaConfig {
    fn get_config(&self) -> MfaConfig {
        self.clone()
    }
}

/// Shared, hot-reloadable configuration holder.
///
/// Clone it freely; all clones observe [`SharedConfig::replace`] on the next
/// manager call.
#[derive(Clone, Default)]
pub struct SharedConfig(Arc<RwLock<MfaConfig>>);

impl SharedConfig {
    pub fn new(config: MfaConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    /// Swap in a new configuration snapshot.
    pub fn replace(&self, config: MfaConfig) {
        let mut guard = self.0.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
    }
}

impl ConfigProvider for SharedConfig {
    fn get_config(&self) -> MfaConfig {
        self.0
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
