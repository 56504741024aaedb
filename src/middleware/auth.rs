//! Authorization gate
//!
//! Verifies the access token on every request, then re-resolves the
//! principal from the credential store so role changes and suspensions take
//! effect at the next request boundary, not at token expiry. The token
//! itself carries no role claims to go stale.

use crate::app_state::AppState;
use crate::error::AuthError;
use crate::http::session::ACCESS_COOKIE;
use crate::models::{Principal, UserRole};
use crate::security::jwt::{TokenError, TokenKind};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Authorization middleware with an allowed-role set
///
/// An empty role set admits any authenticated principal.
pub struct RequireAuth {
    roles: Vec<UserRole>,
}

impl RequireAuth {
    /// Admit any authenticated, active principal
    pub fn any() -> Self {
        Self { roles: Vec::new() }
    }

    /// Admit only principals whose role is in the given set
    pub fn roles(roles: impl Into<Vec<UserRole>>) -> Self {
        Self {
            roles: roles.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
            roles: Rc::new(self.roles.clone()),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
    roles: Rc<Vec<UserRole>>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let roles = self.roles.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AuthError::Internal(
                        "application state not configured".into(),
                    ))
                })?;

            let token = bearer_token(&req).ok_or(AuthError::Unauthenticated)?;

            let user_id = state
                .tokens
                .verify(&token, TokenKind::Access)
                .map_err(|e| match e {
                    TokenError::Expired => AuthError::TokenExpired,
                    TokenError::Malformed | TokenError::WrongKind => AuthError::InvalidToken,
                })?;

            // Fresh fetch: the record, not the token, is authoritative for
            // role and active status.
            let user = state
                .store
                .find_by_id(user_id)
                .await?
                .ok_or(AuthError::Unauthenticated)?;

            if !user.is_active {
                return Err(AuthError::AccountSuspended.into());
            }

            if !roles.is_empty() && !roles.contains(&user.role) {
                tracing::warn!(
                    user_id = %user.id,
                    role = user.role.as_str(),
                    path = %req.path(),
                    "role not permitted for route"
                );
                return Err(AuthError::Forbidden.into());
            }

            req.extensions_mut().insert(Principal::from(&user));
            service.call(req).await
        })
    }
}

/// Access token from the session cookie, falling back to a Bearer header for
/// non-browser clients.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.request().cookie(ACCESS_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl actix_web::FromRequest for Principal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<Principal>() {
            Some(principal) => ready(Ok(principal.clone())),
            None => ready(Err(AuthError::Unauthenticated.into())),
        }
    }
}
