//! Registration and login endpoints.

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};

use super::store_error_response;
use crate::AppState;
use crate::auth::password;
use crate::models::UserResponse;

#[derive(Debug, Deserialize)]
struct TokenForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
}

/// Exchange form-encoded credentials for a bearer token.
/// Unknown user and wrong password get the same 401.
async fn issue_token(data: web::Data<AppState>, form: web::Form<TokenForm>) -> impl Responder {
    let user = match data.db.get_user_by_username(&form.username) {
        Ok(user) => user,
        Err(e) => return store_error_response(e),
    };

    let user = match user {
        Some(u) if password::verify_password(&form.password, &u.hashed_password) => u,
        _ => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Incorrect username or password"
            }));
        }
    };

    match data.tokens.issue(&user.username) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }),
        Err(e) => {
            log::error!("Failed to sign token for {}: {}", user.username, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    password: String,
}

async fn create_user(
    data: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> impl Responder {
    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Username and password must not be empty"
        }));
    }

    // Hash before touching the store so the connection lock is never held
    // across the slow part.
    let hashed = match password::hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Password hashing failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match data.db.create_user(username, &hashed) {
        Ok(user) => HttpResponse::Created().json(UserResponse::from(user)),
        Err(e) => store_error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/token").route(web::post().to(issue_token)));
    cfg.service(web::resource("/api/users").route(web::post().to(create_user)));
}
