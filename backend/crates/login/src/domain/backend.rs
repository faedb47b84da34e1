//! Authentication Backends
//!
//! A backend turns `(field, login, password)` into a user or nothing.
//! Backends compose in order with [`Chain`]; the first one that returns a
//! user wins.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::login_field::LoginField;
use crate::error::LoginResult;

/// Credentials presented for one login field
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub field: LoginField,
    pub login: &'a str,
    pub password: &'a ClearTextPassword,
}

/// Pluggable authentication backend.
///
/// `Ok(None)` means the credentials were not accepted; `Err` is reserved
/// for backend failures.
#[trait_variant::make(AuthBackend: Send)]
pub trait LocalAuthBackend {
    async fn authenticate(&self, credentials: Credentials<'_>) -> LoginResult<Option<User>>;
}

/// Authenticates against the user repository with Argon2id hashes
pub struct ModelBackend<U> {
    users: Arc<U>,
    pepper: Option<Vec<u8>>,
}

impl<U> ModelBackend<U> {
    pub fn new(users: Arc<U>, pepper: Option<Vec<u8>>) -> Self {
        Self { users, pepper }
    }

    fn pepper(&self) -> Option<&[u8]> {
        self.pepper.as_deref()
    }
}

impl<U> Clone for ModelBackend<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            pepper: self.pepper.clone(),
        }
    }
}

impl<U> AuthBackend for ModelBackend<U>
where
    U: UserRepository + Send + Sync,
{
    async fn authenticate(&self, credentials: Credentials<'_>) -> LoginResult<Option<User>> {
        let Some(user) = self
            .users
            .find_user_by_field(credentials.field, credentials.login)
            .await?
        else {
            // Burn a hash so a missing user costs the same as a wrong password
            let _ = credentials.password.hash(self.pepper());
            return Ok(None);
        };

        if !user.password_hash.verify(credentials.password, self.pepper()) {
            return Ok(None);
        }

        if !user.is_active {
            tracing::debug!(user_id = %user.user_id, "Inactive user rejected");
            return Ok(None);
        }

        // Upgrade hashes made with an older algorithm while the password is at hand
        let mut user = user;
        if user.password_hash.needs_rehash() {
            let upgraded = credentials.password.hash(self.pepper())?;
            self.users
                .update_password_hash(&user.user_id, &upgraded)
                .await?;
            tracing::info!(user_id = %user.user_id, "Password hash upgraded");
            user.password_hash = upgraded;
        }

        Ok(Some(user))
    }
}

/// Try `first`, then `second`
#[derive(Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> AuthBackend for Chain<A, B>
where
    A: AuthBackend + Sync,
    B: AuthBackend + Sync,
{
    async fn authenticate(&self, credentials: Credentials<'_>) -> LoginResult<Option<User>> {
        if let Some(user) = self.first.authenticate(credentials).await? {
            return Ok(Some(user));
        }
        self.second.authenticate(credentials).await
    }
}
