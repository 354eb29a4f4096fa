use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Error)]
#[error("unknown gender {0:?}")]
pub struct UnknownGender(pub String);

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownGender;

    /// Case-insensitive: "male", "Male" and "MALE" are the same gender.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            _ => Err(UnknownGender(s.to_owned())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account. `id` is 0 until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,         // lowercase, unique
    pub password_hash: String, // never the plaintext
    pub name: String,
    pub birth_date: Date,
    pub gender: Gender,
    pub location: String,
    pub profile_picture_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Row shape of `users`; gender is stored as text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub birth_date: Date,
    pub gender: String,
    pub location: String,
    pub profile_picture_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownGender;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            name: r.name,
            birth_date: r.birth_date,
            gender: r.gender.parse()?,
            location: r.location,
            profile_picture_url: r.profile_picture_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Profile owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub interests: String,
    pub verified: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Profile {
    /// Empty, unverified profile created alongside a new account.
    pub fn placeholder(user_id: i64, now: OffsetDateTime) -> Self {
        Self {
            id: 0,
            user_id,
            bio: String::new(),
            interests: String::new(),
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
