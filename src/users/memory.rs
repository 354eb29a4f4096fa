use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::{
    repo::{AccountStore, StoreError},
    repo_types::{Profile, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    profiles: HashMap<i64, Profile>,
    next_user_id: i64,
    next_profile_id: i64,
}

/// In-process store; every insert runs under one write lock.
#[derive(Default)]
pub struct MemoryAccountStore {
    tables: RwLock<Tables>,
}

impl MemoryAccountStore {
    pub async fn profile_of(&self, user_id: i64) -> Option<Profile> {
        self.tables.read().await.profiles.get(&user_id).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert_user(&self, user: &User) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.email) {
            return Err(StoreError::Duplicate("user"));
        }
        tables.next_user_id += 1;
        let id = tables.next_user_id;
        tables.users.insert(
            user.email.clone(),
            User {
                id,
                ..user.clone()
            },
        );
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.user_id) {
            return Err(StoreError::Duplicate("profile"));
        }
        tables.next_profile_id += 1;
        let id = tables.next_profile_id;
        tables.profiles.insert(
            profile.user_id,
            Profile {
                id,
                ..profile.clone()
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::{macros::date, OffsetDateTime};

    use super::*;
    use crate::users::repo_types::Gender;

    fn user(email: &str) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 0,
            email: email.into(),
            password_hash: "digest".into(),
            name: "A".into(),
            birth_date: date!(2024 - 01 - 01),
            gender: Gender::Male,
            location: "ID".into(),
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_find_returns_user() {
        let store = MemoryAccountStore::default();
        let a = store.insert_user(&user("a@b.com")).await.unwrap();
        let b = store.insert_user(&user("c@d.com")).await.unwrap();
        assert_ne!(a, b);
        assert!(a > 0 && b > 0);

        let found = store.find_user_by_email("a@b.com").await.unwrap();
        assert_eq!(found.id, a);
        assert_eq!(found.email, "a@b.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryAccountStore::default();
        store.insert_user(&user("a@b.com")).await.unwrap();
        let err = store.insert_user(&user("a@b.com")).await.unwrap_err();
        assert_eq!(err, StoreError::Duplicate("user"));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn find_is_exact_match() {
        let store = MemoryAccountStore::default();
        store.insert_user(&user("a@b.com")).await.unwrap();
        assert_eq!(
            store.find_user_by_email("a@b.co").await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn second_profile_for_same_user_is_rejected() {
        let store = MemoryAccountStore::default();
        let now = OffsetDateTime::now_utc();
        store.insert_profile(&Profile::placeholder(1, now)).await.unwrap();
        let err = store
            .insert_profile(&Profile::placeholder(1, now))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("profile"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_same_email_inserts_have_one_winner() {
        let store = Arc::new(MemoryAccountStore::default());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert_user(&user("race@b.com")).await
            }));
        }

        let mut ok = 0;
        let mut dup = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(StoreError::Duplicate(_)) => dup += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 15);
    }
}
