//! Twostep - TOTP multi-factor authentication management
//!
//! Twostep owns the MFA lifecycle for user accounts: generating a per-user
//! shared secret, presenting it as a scannable provisioning payload,
//! activating it once the user proves possession of a correct code,
//! validating codes at login time, and removing MFA again. The TOTP
//! algorithm, the user store, and the transport layer are all consumed
//! through narrow seams, never owned.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use twostep::{MfaConfig, MfaManager, SharedConfig, User};
//!
//! // Config is injected and re-read on every call, so a reload takes
//! // effect immediately.
//! let config = SharedConfig::new(MfaConfig::enabled("https://chat.example.com"));
//! let manager = MfaManager::new(config, my_user_store);
//!
//! // Enrollment: show the QR image, then activate with the user's code.
//! let setup = manager.generate_secret(&user).await?;
//! manager.activate(&user, &submitted_code).await?;
//!
//! // Login: branch on the bool, a wrong code is not an error here.
//! if manager.validate_token(&user.mfa_secret, &submitted_code)? {
//!     // let them in
//! }
//! ```

mod config;
mod error;
mod issuer;
mod manager;
mod secret;
mod store;
pub mod testing;
mod totp;

pub use config::{ConfigProvider, MfaConfig, SharedConfig};
pub use error::{MfaError, Result};
pub use issuer::issuer_from_site_url;
pub use manager::{MfaManager, MfaSetup};
pub use secret::{generate_secret, SECRET_LEN};
pub use store::{User, UserStore};
pub use totp::Totp;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults.
///
/// Respects the `RUST_LOG` environment variable, defaulting to `info`.
/// Call once at startup; embedding applications with their own subscriber
/// should skip this.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
