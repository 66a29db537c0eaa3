//! User store trait and the user record consumed by the manager.

use async_trait::async_trait;

/// The slice of a user record the MFA manager reads.
///
/// Users are owned by the store; the manager never creates or deletes them,
/// it only updates the two MFA fields through [`UserStore`].
#[derive(Clone, Default)]
pub struct User {
    /// Unique user identifier, also used as the account label in the
    /// provisioning payload.
    pub id: String,
    /// Role string, accepted for context but not enforced here.
    pub roles: String,
    /// Base32-encoded TOTP secret, empty if enrollment has not started.
    pub mfa_secret: String,
    /// True only after the user has proven possession of a correct code.
    pub mfa_active: bool,
}

impl User {
    pub fn new(id: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into(),
            ..Default::default()
        }
    }
}

// The secret must never reach logs, including through `{:?}`.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("roles", &self.roles)
            .field("mfa_secret", &"<redacted>")
            .field("mfa_active", &self.mfa_active)
            .finish()
    }
}

/// Trait for persisting a user's MFA fields.
///
/// Implement this for your database layer. Both writes are independent and
/// non-transactional; the manager's error kinds tell callers which step
/// failed.
///
/// # Example
///
/// ```rust,ignore
/// use twostep::UserStore;
/// use async_trait::async_trait;
///
/// struct MyUserStore {
///     db: DatabasePool,
/// }
///
/// #[async_trait]
/// impl UserStore for MyUserStore {
///     async fn update_mfa_secret(&self, user_id: &str, secret: &str) -> anyhow::Result<()> {
///         sqlx::query("UPDATE users SET mfa_secret = $1 WHERE id = $2")
///             .bind(secret)
///             .bind(user_id)
///             .execute(&self.db)
///             .await?;
///         Ok(())
///     }
///
///     // ... implement update_mfa_active
/// }
/// ```
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist the user's MFA secret (empty string clears it).
    async fn update_mfa_secret(&self, user_id: &str, secret: &str) -> anyhow::Result<()>;

    /// Persist the user's MFA active flag.
    async fn update_mfa_active(&self, user_id: &str, active: bool) -> anyhow::Result<()>;
}

/// Stores are usually shared; a reference to a store is itself a store.
#[async_trait]
impl<'a, T: UserStore + ?Sized> UserStore for &'a T {
    async fn update_mfa_secret(&self, user_id: &str, secret: &str) -> anyhow::Result<()> {
        (**self).update_mfa_secret(user_id, secret).await
    }

    async fn update_mfa_active(&self, user_id: &str, active: bool) -> anyhow::Result<()> {
        (**self).update_mfa_active(user_id, active).await
    }
}

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for std::sync::Arc<T> {
    async fn update_mfa_secret(&self, user_id: &str, secret: &str) -> anyhow::Result<()> {
        (**self).update_mfa_secret(user_id, secret).await
    }

    async fn update_mfa_active(&self, user_id: &str, active: bool) -> anyhow::Result<()> {
        (**self).update_mfa_active(user_id, active).await
    }
}
