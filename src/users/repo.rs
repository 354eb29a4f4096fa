use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use crate::users::repo_types::{Profile, User, UserRow};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule was violated: email for users, owner for profiles.
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Duplicate(a), Self::Duplicate(b)) => a == b,
            (Self::NotFound, Self::NotFound) => true,
            (Self::Database(_), Self::Database(_)) => true,
            _ => false,
        }
    }
}

/// Persistence contract for accounts and their profiles.
///
/// Inserts must check uniqueness and write in one atomic step: among concurrent
/// inserts with the same key exactly one succeeds and the rest get
/// [`StoreError::Duplicate`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the id assigned to the new user.
    async fn insert_user(&self, user: &User) -> Result<i64, StoreError>;
    /// Exact match on the already-normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
}

pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn classify(entity: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => StoreError::Duplicate(entity),
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(name = "insert user", skip_all)]
    async fn insert_user(&self, user: &User) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, name, birth_date, gender, location,
                               profile_picture_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.birth_date)
        .bind(user.gender.as_str())
        .bind(&user.location)
        .bind(&user.profile_picture_url)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&self.db)
        .await
        .map_err(classify("user"))?;

        id.ok_or(StoreError::Duplicate("user"))
    }

    #[instrument(name = "find user by email", skip_all)]
    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, birth_date, gender, location,
                   profile_picture_url, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        User::try_from(row).map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
    }

    #[instrument(name = "insert profile", skip_all, fields(user_id = profile.user_id))]
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, bio, interests, verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(profile.verified)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.db)
        .await
        .map_err(classify("profile"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate("profile"));
        }
        Ok(())
    }
}
