//! API Integration Tests
//!
//! Drives the HTTP surface end to end over the in-memory store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::util::ServiceExt;
use uuid::Uuid;

mod common;

use common::{id_of, seed_course, send, setup_app, Actor};

#[tokio::test]
async fn test_missing_identity_header_is_rejected() {
    let (app, _) = setup_app();

    let req = Request::builder()
        .method("GET")
        .uri("/courses/mine")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error_code"], "missing_user_id");
}

#[tokio::test]
async fn test_invalid_identity_header_is_rejected() {
    let (app, _) = setup_app();

    let req = Request::builder()
        .method("GET")
        .uri("/courses/mine")
        .header("X-Request-User-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_course_completion_e2e() {
    let (app, _) = setup_app();
    let instructor = Actor::instructor();
    let student = Actor::student();

    // 1. Instructor builds a two-lesson course
    let (course_id, lessons) = seed_course(&app, instructor, 2).await;

    // 2. Student enrolls
    let (status, body) = send(&app, student, "POST", &format!("/courses/{}/enroll", course_id), None).await;
    assert_eq!(status, StatusCode::OK, "enroll failed: {}", body);
    assert_eq!(body["enrolled"], true);

    // 3. First lesson: half way, no certificate
    let (status, body) = send(&app, student, "POST", &format!("/lessons/{}/complete", lessons[0]), None).await;
    assert_eq!(status, StatusCode::OK, "completion failed: {}", body);
    assert_eq!(body["created"], true);
    assert_eq!(body["module_ratio"], 0.5);
    assert_eq!(body["course_completed_now"], false);
    assert!(body.get("certificate").is_none());

    let (status, body) = send(&app, student, "GET", &format!("/courses/{}/progress", course_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["percent"], 50.0);
    assert_eq!(body["complete"], false);

    // 4. Last lesson: module and course complete, certificate minted
    let (status, body) = send(&app, student, "POST", &format!("/lessons/{}/complete", lessons[1]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["module_completed_now"], true);
    assert_eq!(body["course_completed_now"], true);
    let number = body["certificate"]["certificate_number"].as_str().unwrap().to_string();

    // 5. Repeating the last lesson changes nothing
    let (status, body) = send(&app, student, "POST", &format!("/lessons/{}/complete", lessons[1]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);
    assert_eq!(body["course_completed_now"], false);

    // 6. On-demand generation returns the same certificate
    let (status, body) = send(
        &app,
        student,
        "POST",
        "/certificates/generate",
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newly_issued"], false);
    assert_eq!(body["certificate"]["certificate_number"], number.as_str());

    let (status, body) = send(&app, student, "GET", "/certificates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // 7. Notifications: enrollment, module, course (one each)
    let (status, body) = send(&app, student, "GET", "/notifications", None).await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == "enrollment").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "progression").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "achievement").count(), 1);

    // 8. Mark one read
    let notification_id = id_of(&body[0]);
    let (status, _) = send(
        &app,
        student,
        "POST",
        &format!("/notifications/{}/read", notification_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_completion_requires_enrollment() {
    let (app, store) = setup_app();
    let instructor = Actor::instructor();
    let stranger = Actor::student();

    let (_, lessons) = seed_course(&app, instructor, 1).await;

    let (status, body) = send(&app, stranger, "POST", &format!("/lessons/{}/complete", lessons[0]), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "not_enrolled");
    assert_eq!(store.completion_count().await, 0);
}

#[tokio::test]
async fn test_unknown_lesson_is_not_found() {
    let (app, _) = setup_app();

    let (status, _) = send(
        &app,
        Actor::student(),
        "POST",
        &format!("/lessons/{}/complete", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_before_completion_is_unprocessable() {
    let (app, _) = setup_app();
    let instructor = Actor::instructor();
    let student = Actor::student();

    let (course_id, lessons) = seed_course(&app, instructor, 2).await;
    send(&app, student, "POST", &format!("/courses/{}/enroll", course_id), None).await;
    send(&app, student, "POST", &format!("/lessons/{}/complete", lessons[0]), None).await;

    let (status, body) = send(
        &app,
        student,
        "POST",
        "/certificates/generate",
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "course_not_complete");
}

#[tokio::test]
async fn test_student_cannot_author_courses() {
    let (app, _) = setup_app();

    let (status, _) = send(
        &app,
        Actor::student(),
        "POST",
        "/courses",
        Some(json!({ "title": "Sneaky" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_enroll_twice_conflicts() {
    let (app, _) = setup_app();
    let student = Actor::student();
    let (course_id, _) = seed_course(&app, Actor::instructor(), 1).await;

    let uri = format!("/courses/{}/enroll", course_id);
    let (status, _) = send(&app, student, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, student, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "already_enrolled");
}

#[tokio::test]
async fn test_submission_grading_flow() {
    let (app, _) = setup_app();
    let instructor = Actor::instructor();
    let student = Actor::student();
    let (course_id, lessons) = seed_course(&app, instructor, 1).await;
    send(&app, student, "POST", &format!("/courses/{}/enroll", course_id), None).await;

    let (status, assignment) = send(
        &app,
        instructor,
        "POST",
        "/assignments",
        Some(json!({
            "lesson_id": lessons[0],
            "title": "Homework",
            "due_date": "2030-01-01T00:00:00Z",
            "max_score": 20
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "assignment failed: {}", assignment);
    let assignment_id = id_of(&assignment);

    let (status, submission) = send(
        &app,
        student,
        "POST",
        &format!("/assignments/{}/submit", assignment_id),
        Some(json!({ "file_ref": "uploads/homework.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {}", submission);
    let submission_id = id_of(&submission);

    let (status, pending) = send(&app, instructor, "GET", "/submissions/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let grade_uri = format!("/submissions/{}/grade", submission_id);
    let (status, body) = send(&app, instructor, "POST", &grade_uri, Some(json!({ "grade": 25 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let (status, _) = send(&app, student, "POST", &grade_uri, Some(json!({ "grade": 10 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, graded) = send(
        &app,
        instructor,
        "POST",
        &grade_uri,
        Some(json!({ "grade": 18, "feedback": "Nice work" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graded["grade"], 18);

    let (_, pending) = send(&app, instructor, "GET", "/submissions/pending", None).await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_listing() {
    let (app, _) = setup_app();
    let (course_id, _) = seed_course(&app, Actor::instructor(), 1).await;

    let (status, body) = send(&app, Actor::student(), "GET", "/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![course_id.to_string()]);

    let uri = format!("/courses?category_id={}", Uuid::new_v4());
    let (status, body) = send(&app, Actor::student(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "category_not_found");
}

#[tokio::test]
async fn test_lesson_comment_thread() {
    let (app, _) = setup_app();
    let instructor = Actor::instructor();
    let student = Actor::student();
    let (course_id, lessons) = seed_course(&app, instructor, 1).await;
    let uri = format!("/lessons/{}/comments", lessons[0]);

    let (status, _) = send(&app, student, "POST", &uri, Some(json!({ "content": "Hi" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    send(&app, student, "POST", &format!("/courses/{}/enroll", course_id), None).await;
    let (status, question) = send(
        &app,
        student,
        "POST",
        &uri,
        Some(json!({ "content": "What is a lifetime?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "comment failed: {}", question);

    let (status, reply) = send(
        &app,
        instructor,
        "POST",
        &uri,
        Some(json!({ "content": "A region of validity", "parent_id": question["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parent_id"], question["id"]);

    let (status, thread) = send(&app, Actor::student(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread.as_array().unwrap().len(), 2);
    assert_eq!(thread[0]["id"], reply["id"]);

    let (_, notifications) = send(&app, student, "GET", "/notifications", None).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["kind"] == "comment"));
}
