//! Session transport: cookie pair plus JSON body
//!
//! Tokens travel both ways at once. Browsers rely on the HttpOnly cookie
//! pair; native clients read the same tokens from the response body and send
//! them back as a Bearer header. Cookies are Secure and SameSite=None so the
//! browser sends them on cross-site requests from the web frontend.

use crate::models::UserSummary;
use crate::security::jwt::{TokenCodec, TokenKind, TokenPair};
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use serde::Serialize;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Body returned by login and refresh
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl SessionResponse {
    pub fn new(user: UserSummary, tokens: TokenPair) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

fn session_cookie(name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// Cookie pair carrying a fresh session, lifetimes matching the token TTLs
pub fn session_cookies(codec: &TokenCodec, tokens: &TokenPair) -> [Cookie<'static>; 2] {
    [
        session_cookie(
            ACCESS_COOKIE,
            tokens.access_token.clone(),
            codec.ttl_secs(TokenKind::Access),
        ),
        session_cookie(
            REFRESH_COOKIE,
            tokens.refresh_token.clone(),
            codec.ttl_secs(TokenKind::Refresh),
        ),
    ]
}

/// Expired empty-value cookie pair; used on logout and on failed refresh so
/// the browser drops a session that can no longer be renewed.
pub fn clear_session_cookies() -> [Cookie<'static>; 2] {
    let clear = |name: &'static str| {
        Cookie::build(name, "")
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None)
            .max_age(Duration::ZERO)
            .finish()
    };
    [clear(ACCESS_COOKIE), clear(REFRESH_COOKIE)]
}
