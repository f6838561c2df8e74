pub mod auth;
pub mod health;
pub mod notes;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::AppState;
use crate::auth::{AuthError, resolve_bearer};
use crate::error::StoreError;
use crate::models::User;

/// Authenticate the request or produce the 401 to return. The body is the
/// same for every failure mode.
pub(crate) fn require_user(
    data: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<User, HttpResponse> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match resolve_bearer(&data.db, &data.tokens, header) {
        Ok(user) => Ok(user),
        Err(AuthError::InvalidCredential) => {
            Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Could not validate credentials"
            })))
        }
    }
}

/// Map repository errors onto HTTP responses.
pub(crate) fn store_error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NoteNotFound => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        StoreError::TagNotFound => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Tag not found"
        })),
        StoreError::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
            "error": msg
        })),
        StoreError::Sqlite(e) => {
            log::error!("Database error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}
