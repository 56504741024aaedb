//! In-memory credential store used by tests and local development.

use crate::error::{AuthError, Result};
use crate::models::{NewUser, User};
use crate::store::CredentialStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))?;
        Ok(users.get(&id).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))?;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: new_user.is_active,
            student_class: new_user.student_class,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))?;
        let user = users.get_mut(&id).ok_or(AuthError::PrincipalNotFound)?;
        user.password_hash = password_hash.to_owned();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AuthError::Internal("user store lock poisoned".into()))?;
        let user = users.get_mut(&id).ok_or(AuthError::PrincipalNotFound)?;
        user.is_active = is_active;
        user.updated_at = Utc::now();
        Ok(())
    }
}
