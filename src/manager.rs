//! MFA enrollment, activation, and validation.

use crate::config::{ConfigProvider, MfaConfig};
use crate::error::{MfaError, Result};
use crate::issuer::issuer_from_site_url;
use crate::secret::generate_secret;
use crate::store::{User, UserStore};
use crate::totp::Totp;
use qrcode::render::svg;
use qrcode::QrCode;

/// Data returned when starting MFA enrollment for a user.
///
/// Transient: none of this is kept by the manager, and a new payload is
/// produced on every [`MfaManager::generate_secret`] call.
pub struct MfaSetup {
    /// The base32-encoded secret, exactly as persisted to the store.
    pub secret: String,
    /// `otpauth://` payload for authenticator apps.
    pub provisioning_uri: String,
    /// The payload rendered as a scannable SVG image.
    pub qr_svg: String,
}

// The secret must never reach logs, and the provisioning URI embeds it.
impl std::fmt::Debug for MfaSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfaSetup")
            .field("secret", &"<redacted>")
            .field("provisioning_uri", &"<redacted>")
            .field("qr_svg", &format_args!("<{} bytes of svg>", self.qr_svg.len()))
            .finish()
    }
}

/// Manages per-user MFA state against a user store.
///
/// Every operation re-reads the configuration snapshot and fails with
/// [`MfaError::Disabled`] before any computation or store access when the
/// global gate is closed. Writes are plain sequential store calls with no
/// transaction; see [`MfaManager::deactivate`] for the accepted
/// partial-failure state.
pub struct MfaManager<C, S> {
    config: C,
    store: S,
    totp: Totp,
}

impl<C, S> MfaManager<C, S>
where
    C: ConfigProvider,
    S: UserStore,
{
    pub fn new(config: C, store: S) -> Self {
        Self {
            config,
            store,
            totp: Totp::new(),
        }
    }

    /// Start enrollment: generate a fresh secret, persist it, and render the
    /// provisioning payload.
    ///
    /// The active flag is untouched; enrollment completes only via
    /// [`MfaManager::activate`]. On a store failure nothing is returned and
    /// the caller must treat enrollment as not started.
    pub async fn generate_secret(&self, user: &User) -> Result<MfaSetup> {
        let config = self.ensure_enabled()?;

        let secret = generate_secret();
        let issuer = issuer_from_site_url(&config.site_url);
        let provisioning_uri = provisioning_uri(&issuer, &user.id, &secret);

        self.store
            .update_mfa_secret(&user.id, &secret)
            .await
            .map_err(MfaError::SaveSecret)?;

        let qr_svg = render_qr(&provisioning_uri)?;

        tracing::debug!(user_id = %user.id, "generated mfa secret");

        Ok(MfaSetup {
            secret,
            provisioning_uri,
            qr_svg,
        })
    }

    /// Complete enrollment by verifying a code against the user's stored
    /// secret, then persisting `active = true`.
    ///
    /// A token that fails format validation is [`MfaError::Authenticate`]; a
    /// well-formed token that matches no code in the drift window is
    /// [`MfaError::BadToken`]. Neither touches the store.
    pub async fn activate(&self, user: &User, token: &str) -> Result<()> {
        self.ensure_enabled()?;

        if !self.totp.authenticate(&user.mfa_secret, token)? {
            return Err(MfaError::BadToken);
        }

        self.store
            .update_mfa_active(&user.id, true)
            .await
            .map_err(MfaError::SaveActive)?;

        tracing::info!(user_id = %user.id, "mfa activated");
        Ok(())
    }

    /// Remove MFA for a user: clear the active flag, then the secret.
    ///
    /// The flag is written first and a failure there stops the operation, so
    /// "active implies a secret is present" always holds. If only the secret
    /// write fails, the user is left inactive with a stale secret; that
    /// residual state is accepted rather than reordered away.
    pub async fn deactivate(&self, user_id: &str) -> Result<()> {
        self.ensure_enabled()?;

        self.store
            .update_mfa_active(user_id, false)
            .await
            .map_err(MfaError::SaveActive)?;

        self.store
            .update_mfa_secret(user_id, "")
            .await
            .map_err(MfaError::SaveSecret)?;

        tracing::info!(user_id = %user_id, "mfa deactivated");
        Ok(())
    }

    /// Stateless login-time verification of a token against a raw secret.
    ///
    /// Asymmetric with [`MfaManager::activate`]: a wrong (but well-formed)
    /// code is `Ok(false)`, not an error. Callers must branch on the bool.
    pub fn validate_token(&self, secret: &str, token: &str) -> Result<bool> {
        self.ensure_enabled()?;
        self.totp.authenticate(secret, token)
    }

    fn ensure_enabled(&self) -> Result<MfaConfig> {
        let config = self.config.get_config();
        if !config.mfa_enabled {
            return Err(MfaError::Disabled);
        }
        Ok(config)
    }
}

/// Build the `otpauth://` provisioning payload.
///
/// `issuer` arrives already query-escaped from the canonicalizer and is
/// embedded verbatim; the account label is escaped here.
fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> String {
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&algorithm=SHA1&digits=6&period=30",
        account = urlencoding::encode(account),
    )
}

fn render_qr(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| MfaError::encode(e.to_string()))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .build())
}
