//! Authentication service: registration, login, session refresh and
//! password lifecycle.
//!
//! Every outcome that could leak whether an email is registered collapses to
//! the same observable result: login misses run a dummy digest verification
//! before failing, and reset initiation reports success regardless of whether
//! a record was found.

use crate::error::{AuthError, Result};
use crate::models::{
    ChangePasswordRequest, LoginRequest, NewUser, RegisterRequest, User, UserSummary,
};
use crate::security::jwt::{TokenCodec, TokenError, TokenKind, TokenPair};
use crate::security::password::{
    dummy_verify, hash_password, validate_password_policy, verify_password,
};
use crate::services::email::Notifier;
use crate::store::CredentialStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Session payload returned from login and refresh
#[derive(Debug)]
pub struct Session {
    pub user: UserSummary,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: TokenCodec,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            codec,
            notifier,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create a new credential record
    ///
    /// The plaintext password is policy-checked and hashed here; it never
    /// reaches the store. Email uniqueness is the store's single atomic
    /// insert, not a read-then-write.
    #[instrument(skip_all, fields(email = %mask_email(&request.email)))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserSummary> {
        request.validate()?;
        validate_password_policy(&request.password)?;

        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;

        let user = self
            .store
            .create_user(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
                role: request.role,
                is_active: request.is_active.unwrap_or(true),
                student_class: request.student_class,
            })
            .await?;

        info!(user_id = %user.id, role = user.role.as_str(), "user registered");
        Ok(UserSummary::from(&user))
    }

    /// Authenticate with email and password, returning a fresh session
    ///
    /// A missing record and a wrong password are indistinguishable to the
    /// caller: both cost one digest verification and both answer
    /// `InvalidCredentials`. Suspension is only disclosed after the password
    /// has matched.
    #[instrument(skip_all, fields(email = %mask_email(&request.email)))]
    pub async fn login(&self, request: LoginRequest) -> Result<Session> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                dummy_verify(&request.password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login attempt on suspended account");
            return Err(AuthError::AccountSuspended);
        }

        let tokens = self.codec.issue_pair(user.id)?;
        info!(user_id = %user.id, "login successful");

        Ok(Session {
            user: UserSummary::from(&user),
            tokens,
        })
    }

    /// Rotate a session from a refresh token
    ///
    /// The old refresh token is not revoked; it stays usable until its own
    /// expiry. Rotation limits exposure of any single token, it is not a
    /// single-use scheme. The principal is re-fetched so a suspension or
    /// deletion since issuance ends the session here.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let user_id = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::SessionExpired,
                TokenError::Malformed | TokenError::WrongKind => AuthError::InvalidToken,
            })?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !user.is_active {
            warn!(user_id = %user.id, "refresh attempt on suspended account");
            return Err(AuthError::AccountSuspended);
        }

        let tokens = self.codec.issue_pair(user.id)?;
        info!(user_id = %user.id, "session refreshed");

        Ok(Session {
            user: UserSummary::from(&user),
            tokens,
        })
    }

    /// Change a password for an authenticated principal
    ///
    /// Order matters: prove knowledge of the current secret first, then
    /// policy-check the replacement, then reject a no-op rotation. The store
    /// write is the last step, so any failure leaves the old secret intact.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<()> {
        request.validate()?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !verify_password(&request.old_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.rotate_password(&user, &request.new_password).await?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    /// Start a password reset for an email address
    ///
    /// Always reports success, and both outcomes cost the same: each branch
    /// burns one digest verification, and delivery runs off the response
    /// path, so neither the response nor its latency discloses whether the
    /// email is registered. An inactive record is treated as a miss; a
    /// suspended account cannot rotate its way back in.
    #[instrument(skip_all, fields(email = %mask_email(email)))]
    pub async fn initiate_reset(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        let record = self.store.find_by_email(&email).await?;

        dummy_verify("placeholder");

        let user = match record.filter(|u| u.is_active) {
            Some(user) => user,
            None => return Ok(()),
        };

        let token = self.codec.issue(user.id, TokenKind::Reset)?;
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send_password_reset(&user.email, &user.name, &token)
                .await
            {
                warn!(user_id = %user.id, error = %e, "failed to deliver password reset email");
            } else {
                info!(user_id = %user.id, "password reset initiated");
            }
        });
        Ok(())
    }

    /// Complete a password reset with a reset-kind token
    #[instrument(skip_all)]
    pub async fn complete_reset(&self, token: &str, new_password: &str) -> Result<()> {
        let user_id = self
            .codec
            .verify(token, TokenKind::Reset)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::TokenExpired,
                TokenError::Malformed | TokenError::WrongKind => AuthError::InvalidToken,
            })?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        // A token issued before a suspension must not rotate the secret
        if !user.is_active {
            warn!(user_id = %user.id, "reset attempt on suspended account");
            return Err(AuthError::AccountSuspended);
        }

        self.rotate_password(&user, new_password).await?;
        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    async fn rotate_password(&self, user: &User, new_password: &str) -> Result<()> {
        validate_password_policy(new_password)?;

        if verify_password(new_password, &user.password_hash)? {
            return Err(AuthError::SecretUnchanged);
        }

        let new_hash = hash_password(new_password)?;
        self.store.update_password(user.id, &new_hash).await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keep the first character and the domain; enough to correlate log lines
/// without writing addresses into logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => "***".to_string(),
        },
        None => "***".to_string(),
    }
}
