//! Error type for MFA operations.

/// The error type for all MFA operations.
///
/// Each variant corresponds to a distinct failure callers are expected to
/// surface differently: a disabled gate is a configuration problem, a
/// malformed token is a client input problem, a non-matching token is a
/// wrong code, and the save variants are storage outages.
#[derive(Debug, thiserror::Error)]
pub enum MfaError {
    /// Multi-factor authentication is disabled in the configuration.
    /// No operation was attempted.
    #[error("multi-factor authentication is disabled")]
    Disabled,

    /// The submitted token failed format validation (or the stored secret
    /// could not be decoded), so it was never compared against a code.
    #[error("token failed authentication: {0}")]
    Authenticate(String),

    /// A well-formed token that does not match any code in the accepted
    /// time window.
    #[error("token does not match")]
    BadToken,

    /// The user store failed to persist the MFA secret.
    #[error("failed to store the MFA secret")]
    SaveSecret(#[source] anyhow::Error),

    /// The user store failed to persist the MFA active flag.
    #[error("failed to store the MFA active flag")]
    SaveActive(#[source] anyhow::Error),

    /// Rendering the provisioning payload as a QR image failed.
    #[error("failed to render the provisioning QR code: {0}")]
    Encode(String),
}

impl MfaError {
    pub fn authenticate(msg: impl Into<String>) -> Self {
        Self::Authenticate(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

/// Result type alias for MFA operations.
pub type Result<T> = std::result::Result<T, MfaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MfaError::Disabled.to_string(),
            "multi-factor authentication is disabled"
        );
        assert_eq!(
            MfaError::authenticate("unable to parse token").to_string(),
            "token failed authentication: unable to parse token"
        );
        assert_eq!(MfaError::BadToken.to_string(), "token does not match");
    }

    #[test]
    fn test_save_errors_keep_source() {
        use std::error::Error;

        let err = MfaError::SaveSecret(anyhow::anyhow!("connection reset"));
        assert!(err.source().is_some());
        assert!(format!("{}", err.source().unwrap()).contains("connection reset"));

        let err = MfaError::SaveActive(anyhow::anyhow!("timeout"));
        assert!(err.source().is_some());
    }
}
