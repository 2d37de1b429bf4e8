//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use course_platform::{api, AppState, InMemoryStore};

/// Router over a fresh in-memory store, as mounted under `/api/v1`
pub fn setup_app() -> (Router, InMemoryStore) {
    let store = InMemoryStore::new();
    let app = api::protected_router().with_state(AppState::new(Arc::new(store.clone())));
    (app, store)
}

/// Acting user sent through the gateway headers
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: &'static str,
}

impl Actor {
    pub fn student() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            role: "student",
        }
    }

    pub fn instructor() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            role: "instructor",
        }
    }

    pub fn admin() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            role: "admin",
        }
    }
}

/// Send a request and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    actor: Actor,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Request-User-Id", actor.user_id.to_string())
        .header("X-Request-User-Role", actor.role);

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

/// Course with one module of `lessons` lessons, authored by `instructor`.
/// Returns (course_id, lesson_ids).
pub async fn seed_course(app: &Router, instructor: Actor, lessons: i32) -> (Uuid, Vec<Uuid>) {
    let (status, course) = send(
        app,
        instructor,
        "POST",
        "/courses",
        Some(serde_json::json!({ "title": "Rust Fundamentals", "level": "beginner" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "course creation failed: {}", course);
    let course_id = id_of(&course);

    let (status, module) = send(
        app,
        instructor,
        "POST",
        "/modules",
        Some(serde_json::json!({ "course_id": course_id, "title": "Basics", "position": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "module creation failed: {}", module);
    let module_id = id_of(&module);

    let mut lesson_ids = Vec::new();
    for position in 1..=lessons {
        let (status, lesson) = send(
            app,
            instructor,
            "POST",
            "/lessons",
            Some(serde_json::json!({
                "module_id": module_id,
                "title": format!("Lesson {}", position),
                "position": position
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "lesson creation failed: {}", lesson);
        lesson_ids.push(id_of(&lesson));
    }

    (course_id, lesson_ids)
}
