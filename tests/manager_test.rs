//! Integration tests for the MFA manager.
//!
//! These drive the four operations end-to-end against the in-memory store,
//! asserting error kinds, persisted state, and exact store write counts.

use std::time::{SystemTime, UNIX_EPOCH};
use twostep::testing::InMemoryUserStore;
use twostep::{generate_secret, MfaConfig, MfaError, MfaManager, SharedConfig, Totp, User};

fn enabled_config() -> MfaConfig {
    MfaConfig::enabled("https://chat.example.com")
}

fn disabled_config() -> MfaConfig {
    MfaConfig::default()
}

fn enrolled_user() -> User {
    let mut user = User::new("user-1", "system_user");
    user.mfa_secret = generate_secret();
    user
}

fn current_code(secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    Totp::new().compute_code(secret, now).unwrap()
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn disabled_gate_blocks_every_operation_without_store_access() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(disabled_config(), store);
    let user = enrolled_user();

    assert!(matches!(
        manager.generate_secret(&user).await,
        Err(MfaError::Disabled)
    ));
    assert!(matches!(
        manager.activate(&user, "123456").await,
        Err(MfaError::Disabled)
    ));
    assert!(matches!(
        manager.deactivate(&user.id).await,
        Err(MfaError::Disabled)
    ));
    assert!(matches!(
        manager.validate_token(&user.mfa_secret, "123456"),
        Err(MfaError::Disabled)
    ));
}

#[tokio::test]
async fn disabled_gate_performs_zero_store_writes() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(disabled_config(), &store);
    let user = enrolled_user();

    let _ = manager.generate_secret(&user).await;
    let _ = manager.activate(&user, "123456").await;
    let _ = manager.deactivate(&user.id).await;
    let _ = manager.validate_token(&user.mfa_secret, "123456");

    assert_eq!(store.secret_calls(), 0);
    assert_eq!(store.active_calls(), 0);
}

#[tokio::test]
async fn reloaded_config_reopens_the_gate() {
    let config = SharedConfig::new(disabled_config());
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(config.clone(), &store);
    let user = enrolled_user();

    assert!(matches!(
        manager.generate_secret(&user).await,
        Err(MfaError::Disabled)
    ));

    config.replace(enabled_config());
    assert!(manager.generate_secret(&user).await.is_ok());
}

// =============================================================================
// GenerateSecret
// =============================================================================

#[tokio::test]
async fn generate_secret_persists_and_returns_setup() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();

    let setup = manager.generate_secret(&user).await.unwrap();

    assert_eq!(setup.secret.len(), 32);
    assert!(!setup.qr_svg.is_empty());
    assert!(setup.provisioning_uri.starts_with("otpauth://totp/"));
    assert!(setup.provisioning_uri.contains("issuer=chat.example.com"));
    assert!(setup.provisioning_uri.contains("algorithm=SHA1"));
    assert_eq!(store.stored_secret(&user.id), Some(setup.secret.clone()));
    // Enrollment has started, not completed.
    assert_eq!(store.stored_active(&user.id), None);
}

#[tokio::test]
async fn generate_secret_fails_when_store_write_fails() {
    let store = InMemoryUserStore::new().fail_on_secret();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();

    let err = manager.generate_secret(&user).await.unwrap_err();
    assert!(matches!(err, MfaError::SaveSecret(_)));
    assert_eq!(store.stored_secret(&user.id), None);
}

#[tokio::test]
async fn generate_secret_is_fresh_per_call() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();

    let first = manager.generate_secret(&user).await.unwrap();
    let second = manager.generate_secret(&user).await.unwrap();

    assert_ne!(first.secret, second.secret);
    // Last write wins in the store.
    assert_eq!(store.stored_secret(&user.id), Some(second.secret));
}

// =============================================================================
// Activate
// =============================================================================

#[tokio::test]
async fn activate_with_current_code_persists_active() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();
    let code = current_code(&user.mfa_secret);

    manager.activate(&user, &code).await.unwrap();

    assert_eq!(store.stored_active(&user.id), Some(true));
    assert_eq!(store.active_calls(), 1);
}

#[tokio::test]
async fn activate_with_malformed_token_fails_before_any_write() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();

    let err = manager.activate(&user, "invalid-token").await.unwrap_err();

    assert!(matches!(err, MfaError::Authenticate(_)));
    assert_eq!(store.active_calls(), 0);
    assert_eq!(store.secret_calls(), 0);
}

#[tokio::test]
async fn activate_with_wrong_code_is_bad_token() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();

    let wrong = wrong_code(&user.mfa_secret);
    let err = manager.activate(&user, &wrong).await.unwrap_err();

    assert!(matches!(err, MfaError::BadToken));
    assert_eq!(store.active_calls(), 0);
}

#[tokio::test]
async fn activate_fails_when_store_write_fails() {
    let store = InMemoryUserStore::new().fail_on_active();
    let manager = MfaManager::new(enabled_config(), &store);
    let user = enrolled_user();
    let code = current_code(&user.mfa_secret);

    let err = manager.activate(&user, &code).await.unwrap_err();
    assert!(matches!(err, MfaError::SaveActive(_)));
}

// =============================================================================
// Deactivate
// =============================================================================

#[tokio::test]
async fn deactivate_clears_flag_and_secret() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);

    manager.deactivate("user-1").await.unwrap();

    assert_eq!(store.stored_active("user-1"), Some(false));
    assert_eq!(store.stored_secret("user-1"), Some(String::new()));
    assert_eq!(store.active_calls(), 1);
    assert_eq!(store.secret_calls(), 1);
}

#[tokio::test]
async fn deactivate_stops_after_failed_active_write() {
    let store = InMemoryUserStore::new().fail_on_active();
    let manager = MfaManager::new(enabled_config(), &store);

    let err = manager.deactivate("user-1").await.unwrap_err();

    assert!(matches!(err, MfaError::SaveActive(_)));
    // Fail fast: the secret write must never be attempted.
    assert_eq!(store.active_calls(), 1);
    assert_eq!(store.secret_calls(), 0);
}

#[tokio::test]
async fn deactivate_reports_failed_secret_write() {
    let store = InMemoryUserStore::new().fail_on_secret();
    let manager = MfaManager::new(enabled_config(), &store);

    let err = manager.deactivate("user-1").await.unwrap_err();

    assert!(matches!(err, MfaError::SaveSecret(_)));
    // The flag write happened; inactive-with-secret is the accepted residual.
    assert_eq!(store.stored_active("user-1"), Some(false));
    assert_eq!(store.active_calls(), 1);
    assert_eq!(store.secret_calls(), 1);
}

// =============================================================================
// ValidateToken
// =============================================================================

#[tokio::test]
async fn validate_token_matrix() {
    let store = InMemoryUserStore::new();
    let manager = MfaManager::new(enabled_config(), &store);
    let secret = generate_secret();

    // Malformed: an error, before any comparison.
    assert!(matches!(
        manager.validate_token(&secret, "invalid-token"),
        Err(MfaError::Authenticate(_))
    ));

    // Well-formed but wrong: false, not an error.
    let wrong = wrong_code(&secret);
    assert!(!manager.validate_token(&secret, &wrong).unwrap());

    // Correct: true.
    let code = current_code(&secret);
    assert!(manager.validate_token(&secret, &code).unwrap());

    // Stateless: no store interaction at all.
    assert_eq!(store.secret_calls(), 0);
    assert_eq!(store.active_calls(), 0);
}

/// A well-formed 6-digit code guaranteed not to verify: "000000", bumped if
/// the secret happens to produce it inside the drift window.
fn wrong_code(secret: &str) -> String {
    let totp = Totp::new();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let window: Vec<String> = [now.saturating_sub(30), now, now + 30]
        .iter()
        .map(|t| totp.compute_code(secret, *t).unwrap())
        .collect();

    for candidate in ["000000", "000001", "000002", "000003"] {
        if !window.iter().any(|c| c == candidate) {
            return candidate.to_string();
        }
    }
    unreachable!("three window codes cannot cover four candidates");
}
