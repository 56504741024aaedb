//! HTTP surface: routes and session transport

pub mod auth;
pub mod session;

use crate::middleware::RequireAuth;
use crate::models::UserRole;
use actix_web::web;

/// Mount all routes under /api/auth
///
/// Authorization is declared per resource so the gate (and its role set) is
/// visible next to the route it protects.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(
                web::resource("/register")
                    .wrap(RequireAuth::roles([UserRole::Admin, UserRole::Teacher]))
                    .route(web::post().to(auth::register)),
            )
            .service(web::resource("/login").route(web::post().to(auth::login)))
            .service(web::resource("/logout").route(web::post().to(auth::logout)))
            .service(web::resource("/refresh").route(web::post().to(auth::refresh)))
            .service(
                web::resource("/me")
                    .wrap(RequireAuth::any())
                    .route(web::get().to(auth::me)),
            )
            .service(
                web::resource("/password/change")
                    .wrap(RequireAuth::any())
                    .route(web::post().to(auth::change_password)),
            )
            .service(
                web::resource("/password/forgot").route(web::post().to(auth::forgot_password)),
            )
            .service(web::resource("/password/reset").route(web::post().to(auth::reset_password))),
    );
}
