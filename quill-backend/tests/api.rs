//! HTTP-level tests driving the full stack: registration, login, note
//! CRUD and tag search through the actual route wiring.

use actix_web::{App, test, web};
use std::sync::Arc;

use quill_backend::auth::TokenIssuer;
use quill_backend::config::Config;
use quill_backend::db::Database;
use quill_backend::{AppState, controllers};

fn test_state(dir: &tempfile::TempDir) -> web::Data<AppState> {
    let db_path = dir.path().join("quill.db");
    let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");

    let config = Config {
        port: 0,
        database_url: db_path.to_string_lossy().to_string(),
        secret_key: "test-secret".to_string(),
        token_ttl_minutes: 30,
    };
    let tokens = TokenIssuer::new(config.secret_key.clone(), config.token_ttl_minutes);

    web::Data::new(AppState {
        db: Arc::new(db),
        config,
        tokens,
    })
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(controllers::health::config_routes)
                .configure(controllers::auth::config)
                .configure(controllers::notes::config),
        )
        .await
    };
}

macro_rules! register {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(serde_json::json!({ "username": $username, "password": $password }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201);
    }};
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/token")
            .set_form(&[("username", $username), ("password", $password)])
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_register_login_create_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    register!(app, "alice", "secret123");
    let token = login!(app, "alice", "secret123");

    // Create a tagged note
    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(serde_json::json!({
            "title": "T",
            "content": "C",
            "tags": ["work", "urgent"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let note: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(note["title"], "T");
    let tags: Vec<&str> = note["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["urgent", "work"]);

    // Filter by tag
    let req = test::TestRequest::get()
        .uri("/api/notes?tag=work")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let notes: serde_json::Value = test::read_body_json(resp).await;
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "T");

    // Unknown tag is a 404, per the documented policy
    let req = test::TestRequest::get()
        .uri("/api/notes?tag=nope")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_wrong_password_and_unknown_user_both_401() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    register!(app, "alice", "secret123");

    for (username, password) in [("alice", "wrong"), ("nobody", "secret123")] {
        let req = test::TestRequest::post()
            .uri("/api/token")
            .set_form([("username", username), ("password", password)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Incorrect username or password");
    }
}

#[actix_web::test]
async fn test_missing_and_bad_tokens_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/notes").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/notes")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_other_users_notes_are_invisible() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    register!(app, "alice", "secret123");
    register!(app, "bob", "hunter22");
    let alice_token = login!(app, "alice", "secret123");
    let bob_token = login!(app, "bob", "hunter22");

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(serde_json::json!({ "title": "private", "content": "x", "tags": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let note: serde_json::Value = test::read_body_json(resp).await;
    let note_id = note["id"].as_i64().unwrap();

    // Bob sees a 404, not a 403: ownership mismatch looks like absence.
    let req = test::TestRequest::get()
        .uri(&format!("/api/notes/{}", note_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_update_and_delete_note() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    register!(app, "alice", "secret123");
    let token = login!(app, "alice", "secret123");

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(serde_json::json!({ "title": "T", "content": "C", "tags": ["a", "b"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let note: serde_json::Value = test::read_body_json(resp).await;
    let note_id = note["id"].as_i64().unwrap();

    // Full replacement, including the tag set
    let req = test::TestRequest::put()
        .uri(&format!("/api/notes/{}", note_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(serde_json::json!({ "title": "T2", "content": "C2", "tags": ["b", "c"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "T2");
    let tags: Vec<&str> = updated["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["b", "c"]);

    // Delete returns the note, then it is gone
    let req = test::TestRequest::delete()
        .uri(&format!("/api/notes/{}", note_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/notes/{}", note_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_search_route() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    register!(app, "alice", "secret123");
    let token = login!(app, "alice", "secret123");

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(serde_json::json!({ "title": "T", "content": "C", "tags": ["work"] }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/notes/search?tag=work")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let notes: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/notes/search?tag=missing")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
