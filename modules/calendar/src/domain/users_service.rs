use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::context::RequestCtx;
use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::credentials::{self, CredentialManager};
use crate::domain::error::DomainError;
use crate::domain::identity::require_login;
use crate::domain::repo::{DuplicateLogin, StoredUser, UserChanges, UserDraft, UsersRepository};

/// Configuration for the users service
#[derive(Debug, Clone)]
pub struct UsersServiceConfig {
    /// bcrypt work factor for password hashes.
    pub bcrypt_cost: u32,
}

impl Default for UsersServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Domain service for user accounts: registration, login and owner-only changes.
#[derive(Clone)]
pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
    credentials: CredentialManager,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UsersRepository>, config: UsersServiceConfig) -> Self {
        Self {
            repo,
            credentials: CredentialManager::new(config.bcrypt_cost),
        }
    }

    /// Register a new account. Anyone may register, so no ownership check applies.
    #[instrument(name = "calendar.users.add_user", skip(self, _ctx, new_user), fields(login = %new_user.login))]
    pub async fn add_user(&self, _ctx: &RequestCtx, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        credentials::validate_login(&new_user.login)?;
        credentials::validate_timezone(&new_user.timezone)?;
        credentials::validate_password(&new_user.password)?;

        if self
            .repo
            .login_exists(&new_user.login)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::login_taken());
        }

        let password_hash = self.credentials.hash(new_user.password).await?;
        let stored = self
            .repo
            .insert(UserDraft {
                login: new_user.login,
                password_hash,
                timezone: new_user.timezone,
            })
            .await
            .map_err(login_write_error)?;

        info!("Successfully registered user with id={}", stored.id);
        Ok(stored.into())
    }

    #[instrument(name = "calendar.users.update_user", skip(self, ctx, patch), fields(user_id = id))]
    pub async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: i64,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        info!("Updating user");

        // Ownership is settled before the payload is looked at.
        let current = self.require_owner(ctx, id).await?;

        let login = patch.login.filter(|l| !l.is_empty());
        let password = patch.password.filter(|p| !p.is_empty());
        let timezone = patch.timezone.filter(|t| !t.is_empty());

        if let Some(ref login) = login {
            credentials::validate_login(login)?;
        }
        if let Some(ref password) = password {
            credentials::validate_password(password)?;
        }
        if let Some(ref timezone) = timezone {
            credentials::validate_timezone(timezone)?;
        }

        if let Some(ref new_login) = login {
            if new_login != &current.login
                && self
                    .repo
                    .login_exists(new_login)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
            {
                return Err(DomainError::login_taken());
            }
        }

        let password_hash = match password {
            Some(p) => Some(self.credentials.hash(p).await?),
            None => None,
        };

        let updated = self
            .repo
            .update(
                id,
                UserChanges {
                    login,
                    password_hash,
                    timezone,
                },
            )
            .await
            .map_err(login_write_error)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!("Successfully updated user");
        Ok(updated.into())
    }

    #[instrument(name = "calendar.users.delete_user", skip(self, ctx), fields(user_id = id))]
    pub async fn delete_user(&self, ctx: &RequestCtx, id: i64) -> Result<(), DomainError> {
        info!("Deleting user");

        self.require_owner(ctx, id).await?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }

    /// Check a login/password pair. Unknown logins and wrong passwords fail identically.
    #[instrument(name = "calendar.users.login_user", skip(self, _ctx, password))]
    pub async fn login_user(
        &self,
        _ctx: &RequestCtx,
        login: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        self.verified_user(login, password).await.map(|_| ())
    }

    #[instrument(name = "calendar.users.get_user_by_login", skip(self, _ctx))]
    pub async fn get_user_by_login(&self, _ctx: &RequestCtx, login: &str) -> Result<User, DomainError> {
        debug!("Looking up user by login");

        self.repo
            .find_by_login(login)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .map(User::from)
            .ok_or_else(DomainError::incorrect_credentials)
    }

    /// Verify credentials and build the identity context for the rest of the request.
    #[instrument(name = "calendar.users.authenticate", skip(self, password))]
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<RequestCtx, DomainError> {
        let user = self.verified_user(login, password).await?;
        debug!(user_id = user.id, "Caller authenticated");
        Ok(RequestCtx::new(user.login, user.timezone))
    }

    // --- helpers ---

    async fn verified_user(&self, login: &str, password: &str) -> Result<StoredUser, DomainError> {
        let user = self
            .repo
            .find_by_login(login)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let Some(user) = user else {
            debug!("Login attempt for unknown account");
            return Err(DomainError::incorrect_credentials());
        };

        self.credentials
            .verify(user.password_hash.clone(), password.to_string())
            .await
            .inspect_err(|_| debug!("Login attempt with incorrect password"))?;
        Ok(user)
    }

    /// Resolve the caller's own account and require that it is the target `id`.
    async fn require_owner(&self, ctx: &RequestCtx, id: i64) -> Result<StoredUser, DomainError> {
        let login = require_login(ctx)?;

        let current = self
            .repo
            .find_by_login(login)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(DomainError::incorrect_credentials)?;

        if current.id != id {
            warn!(caller_id = current.id, target_id = id, "Attempt to modify another user's account");
            return Err(DomainError::foreign_account());
        }
        Ok(current)
    }
}

/// A concurrent writer may claim the login between the existence check and the write.
fn login_write_error(e: anyhow::Error) -> DomainError {
    if e.downcast_ref::<DuplicateLogin>().is_some() {
        debug!("Login claimed by a concurrent write");
        DomainError::login_taken()
    } else {
        DomainError::database(e.to_string())
    }
}
