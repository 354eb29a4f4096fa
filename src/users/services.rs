use std::sync::Arc;

use tracing::instrument;

use crate::users::{
    repo::{AccountStore, StoreError},
    repo_types::{Profile, User},
};

/// Pass-through over the account store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(email = %user.email))]
    pub async fn create_user(&self, user: &User) -> Result<i64, StoreError> {
        self.store.insert_user(user).await
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.store.find_user_by_email(email).await
    }

    #[instrument(skip_all, fields(user_id = profile.user_id))]
    pub async fn create_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.store.insert_profile(profile).await
    }
}
