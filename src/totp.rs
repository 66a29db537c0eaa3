//! TOTP verification.
//!
//! Thin wrapper over a standard RFC 6238 implementation. Code computation
//! itself is the library's concern; this module owns the usage contract:
//! strict token format checking (a malformed token is an error, not a wrong
//! code) and a fixed, small verification window.

use crate::error::{MfaError, Result};
use data_encoding::BASE32;
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, TOTP};

/// Number of digits in a code.
const DIGITS: usize = 6;

/// Length of one time step in seconds.
const STEP_SECONDS: u64 = 30;

/// Accepted clock drift, in time steps before/after now.
const SKEW_STEPS: u8 = 1;

/// TOTP verifier with fixed SHA-1 / 6 digit / 30 second parameters.
///
/// The de-facto authenticator-app defaults; changing them would break every
/// already-enrolled secret, so they are constants rather than configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Totp;

impl Totp {
    pub fn new() -> Self {
        Self
    }

    /// Verify a submitted token against a base32-encoded secret.
    ///
    /// Returns an error for a token that is not exactly six ASCII digits
    /// (or a secret that does not decode); returns `Ok(false)` for a
    /// well-formed token that matches no code within ±[`SKEW_STEPS`] time
    /// steps of now.
    pub fn authenticate(&self, secret: &str, token: &str) -> Result<bool> {
        if token.len() != DIGITS || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MfaError::authenticate(format!(
                "expected a {DIGITS}-digit code"
            )));
        }

        let totp = self.build(secret)?;
        Ok(totp.check(token, unix_now()?))
    }

    /// Compute the code for a given unix timestamp.
    ///
    /// Part of the verifier contract for test and verification tooling;
    /// production call paths only ever verify.
    pub fn compute_code(&self, secret: &str, time: u64) -> Result<String> {
        Ok(self.build(secret)?.generate(time))
    }

    fn build(&self, secret: &str) -> Result<TOTP> {
        // Padded alphabet: generated secrets carry RFC 4648 '=' padding.
        let secret_bytes = BASE32
            .decode(secret.as_bytes())
            .map_err(|e| MfaError::authenticate(format!("secret is not valid base32: {e}")))?;

        TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW_STEPS,
            STEP_SECONDS,
            secret_bytes,
        )
        .map_err(|e| MfaError::authenticate(format!("unable to initialize verifier: {e}")))
    }
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| MfaError::authenticate(format!("system clock is before the epoch: {e}")))
}
