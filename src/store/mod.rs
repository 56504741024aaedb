/// Credential store: the narrow interface between the auth core and the
/// system of record for user identities.
///
/// "Not found" is always `Ok(None)`, distinct from transport or query
/// failures, which surface as `DependencyUnavailable` so callers never
/// conflate an outage with bad credentials. Email uniqueness is enforced at
/// write time inside the store (single atomic insert), not by a
/// read-then-write from callers.
pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{NewUser, User};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a credential record by case-normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a credential record by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert a new credential record; duplicate email fails with
    /// `EmailAlreadyExists` from the store's own uniqueness constraint
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Replace the stored password digest. This is the final, atomic step of
    /// every secret rotation.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// Flip the active flag (suspension / reinstatement)
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<()>;
}

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
