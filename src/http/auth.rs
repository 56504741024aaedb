//! Authentication and session HTTP handlers

use crate::app_state::AppState;
use crate::error::{AuthError, Result};
use crate::http::session::{
    clear_session_cookies, session_cookies, SessionResponse, REFRESH_COOKIE,
};
use crate::models::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, Principal, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, UserSummary,
};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde_json::json;

/// POST /api/auth/register
///
/// Admin and teacher only (enforced by the route's authorization gate).
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = state.auth.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /api/auth/login
///
/// On success the token pair is set as cookies and echoed in the body.
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let session = state.auth.login(request.into_inner()).await?;

    let mut response = HttpResponse::Ok();
    for cookie in session_cookies(&state.tokens, &session.tokens) {
        response.cookie(cookie);
    }
    Ok(response.json(SessionResponse::new(session.user, session.tokens)))
}

/// POST /api/auth/logout
///
/// Stateless: clears the cookie pair. Issued tokens remain valid until their
/// own expiry, which is why the access lifetime is kept short.
pub async fn logout() -> HttpResponse {
    let mut response = HttpResponse::Ok();
    for cookie in clear_session_cookies() {
        response.cookie(cookie);
    }
    response.json(json!({ "message": "Logged out" }))
}

/// POST /api/auth/refresh
///
/// The refresh token is taken from the cookie, falling back to the body for
/// non-browser clients. Any failure clears the session cookies so a browser
/// stops replaying a session that can no longer be renewed.
pub async fn refresh(
    state: web::Data<AppState>,
    http_request: HttpRequest,
    request: Option<web::Json<RefreshRequest>>,
) -> HttpResponse {
    let token = http_request
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| request.and_then(|r| r.into_inner().refresh_token));

    let outcome = match token {
        Some(token) => state.auth.refresh(&token).await,
        None => Err(AuthError::Unauthenticated),
    };

    match outcome {
        Ok(session) => {
            let mut response = HttpResponse::Ok();
            for cookie in session_cookies(&state.tokens, &session.tokens) {
                response.cookie(cookie);
            }
            response.json(SessionResponse::new(session.user, session.tokens))
        }
        Err(e) => {
            let mut response = e.error_response();
            for cookie in clear_session_cookies() {
                if let Err(err) = response.add_cookie(&cookie) {
                    tracing::error!(error = %err, "failed to attach cleared session cookie");
                }
            }
            response
        }
    }
}

/// GET /api/auth/me
pub async fn me(principal: Principal) -> HttpResponse {
    HttpResponse::Ok().json(UserSummary::from(&principal))
}

/// POST /api/auth/password/change
pub async fn change_password(
    state: web::Data<AppState>,
    principal: Principal,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    state
        .auth
        .change_password(principal.id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed" })))
}

/// POST /api/auth/password/forgot
///
/// Always 202: the response never discloses whether the email is registered.
pub async fn forgot_password(
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    use validator::Validate;
    request.validate()?;

    state.auth.initiate_reset(&request.email).await?;
    Ok(HttpResponse::Accepted().json(json!({
        "message": "If that email is registered, a reset link has been sent"
    })))
}

/// POST /api/auth/password/reset
pub async fn reset_password(
    state: web::Data<AppState>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    use validator::Validate;
    request.validate()?;

    state
        .auth
        .complete_reset(&request.token, &request.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password reset" })))
}
