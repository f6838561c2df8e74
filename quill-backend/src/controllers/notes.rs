//! Notes REST API — owner-scoped CRUD plus tag search.
//!
//! Every route requires a bearer token; the resolved user id scopes all
//! repository calls.

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;

use super::{require_user, store_error_response};
use crate::AppState;
use crate::models::NoteResponse;

/// Full note body — create and update both replace every field.
#[derive(Debug, Deserialize)]
struct NotePayload {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    tag: String,
}

async fn create_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NotePayload>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if body.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title must not be empty"
        }));
    }

    match data
        .db
        .create_note(user.id, &body.title, &body.content, &body.tags)
    {
        Ok(note) => HttpResponse::Created().json(NoteResponse::from(note)),
        Err(e) => store_error_response(e),
    }
}

/// List the caller's notes; `?tag=` restricts to an existing tag (404 if
/// the tag is unknown, empty list if it has no matches).
async fn list_notes(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListNotesQuery>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match data.db.list_notes(user.id, query.tag.as_deref()) {
        Ok(notes) => {
            let items: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(e) => store_error_response(e),
    }
}

async fn get_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.get_note(user.id, note_id) {
        Ok(Some(note)) => HttpResponse::Ok().json(NoteResponse::from(note)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => store_error_response(e),
    }
}

async fn update_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<NotePayload>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    if body.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title must not be empty"
        }));
    }

    match data
        .db
        .update_note(user.id, note_id, &body.title, &body.content, &body.tags)
    {
        Ok(note) => HttpResponse::Ok().json(NoteResponse::from(note)),
        Err(e) => store_error_response(e),
    }
}

async fn delete_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.delete_note(user.id, note_id) {
        Ok(note) => HttpResponse::Ok().json(NoteResponse::from(note)),
        Err(e) => store_error_response(e),
    }
}

async fn search_notes(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let user = match require_user(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match data.db.search_notes_by_tag(user.id, &query.tag) {
        Ok(notes) => {
            let items: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
            HttpResponse::Ok().json(items)
        }
        Err(e) => store_error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::get().to(list_notes))
            .route("", web::post().to(create_note))
            .route("/search", web::get().to(search_notes))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::put().to(update_note))
            .route("/{id}", web::delete().to(delete_note)),
    );
}
