//! Shared-secret generation.

use data_encoding::BASE32;
use rand::RngCore;

/// Bytes of entropy in a freshly generated secret. Base32 with padding turns
/// this into exactly [`SECRET_LEN`] characters.
pub const SECRET_ENTROPY_BYTES: usize = 16;

/// Length of the textual secret handed to authenticator apps.
pub const SECRET_LEN: usize = 32;

/// Generate a new shared secret: [`SECRET_ENTROPY_BYTES`] bytes from the OS
/// CSPRNG, RFC 4648 base32-encoded.
///
/// Secrets are not checked for uniqueness across users; a collision does not
/// weaken either account. Predictability would, so nothing weaker than
/// `OsRng` may be used here.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_ENTROPY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    BASE32.encode(&bytes)
}
