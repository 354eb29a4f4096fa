use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument, warn, Span};

use crate::{
    auth::{
        jwt::{SigningError, TokenIssuer},
        password::{CredentialHasher, HashingError},
    },
    config::SigningKeySource,
    users::{
        dto::{LoginRequest, LoginResponse, SignupRequest, ValidationError},
        repo::StoreError,
        repo_types::{Profile, User},
        services::AccountService,
    },
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid request body: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Hashing(#[from] HashingError),
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Signup and login workflow. Every collaborator is injected.
#[derive(Clone)]
pub struct UserUsecase {
    accounts: AccountService,
    keys: Arc<dyn SigningKeySource>,
    tokens: Arc<dyn TokenIssuer>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserUsecase {
    pub fn new(
        accounts: AccountService,
        keys: Arc<dyn SigningKeySource>,
        tokens: Arc<dyn TokenIssuer>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            accounts,
            keys,
            tokens,
            hasher,
        }
    }

    /// Creates the account and its placeholder profile.
    ///
    /// The two inserts are not one transaction: if the profile insert fails the
    /// account stays behind without a profile.
    #[instrument(name = "UserUsecase::signup", skip_all, fields(email = %req.email))]
    pub async fn signup(&self, req: SignupRequest) -> Result<(), UserError> {
        let input = req.validate()?;

        let password_hash = self.hash_password(input.password).await?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 0,
            email: input.email,
            password_hash,
            name: input.name,
            birth_date: input.birth_date,
            gender: input.gender,
            location: input.location,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        };
        let user_id = self.accounts.create_user(&user).await?;

        let profile = Profile::placeholder(user_id, now);
        if let Err(e) = self.accounts.create_profile(&profile).await {
            warn!(user_id, error = %e, "account created without profile");
            return Err(e.into());
        }

        info!(user_id, "user signed up");
        Ok(())
    }

    /// Checks credentials and mints a session token.
    ///
    /// Unknown email and wrong password stay distinguishable:
    /// `Store(NotFound)` versus `InvalidCredentials`.
    #[instrument(name = "UserUsecase::login", skip_all, fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, UserError> {
        let input = req.validate()?;

        let user = self.accounts.find_user_by_email(&input.email).await?;

        if !self
            .verify_password(input.password, user.password_hash.clone())
            .await?
        {
            warn!(user_id = user.id, "login invalid password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_token(&user.email, self.keys.signing_key())?;

        info!(user_id = user.id, "user logged in");
        Ok(LoginResponse { token })
    }

    // CPU-bound; runs on the blocking pool.
    async fn hash_password(&self, password: String) -> Result<String, HashingError> {
        let hasher = Arc::clone(&self.hasher);
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| hasher.hash(&password)))
            .await
            .map_err(|e| HashingError::Task(e.to_string()))?
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, HashingError> {
        let hasher = Arc::clone(&self.hasher);
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| hasher.verify(&password, &digest)))
            .await
            .map_err(|e| HashingError::Task(e.to_string()))
    }
}
