//! PostgreSQL store tests
//!
//! Need a migrated database at DATABASE_URL:
//! cargo test --test integration_pg_store -- --ignored

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use course_platform::domain::{Certificate, Comment, NewCourse, NewLesson, NewModule, Role};
use course_platform::handlers::{
    CompletionHandler, ContentHandler, EnrollCommand, EnrollmentHandler, MarkLessonCompleteCommand,
};
use course_platform::store::{
    CertificateStore, CommentStore, CompletionStore, ContentStore, InsertOutcome, StoreError,
};
use course_platform::{OperationContext, PgStore, SharedStore};

async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(
        "TRUNCATE TABLE comments, notifications, submissions, certificates, module_milestones, \
         lesson_completions, enrollments, assignments, lessons, course_modules, \
         course_prerequisites, courses, categories CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to clean up DB");

    pool
}

/// One course with one module of `lessons` lessons and an enrolled student
async fn seed(store: &SharedStore, lessons: i32) -> (OperationContext, Uuid, Vec<Uuid>) {
    let instructor = OperationContext::new(Uuid::new_v4()).with_role(Role::Instructor);
    let content = ContentHandler::new(store.clone());

    let course = content
        .create_course(
            NewCourse {
                title: "Databases".to_string(),
                description: String::new(),
                category_id: None,
                level: Default::default(),
                duration_hours: 2,
                duration_minutes: 0,
                enrollment_limit: None,
                prerequisite_ids: Vec::new(),
            },
            &instructor,
        )
        .await
        .unwrap();
    let module = content
        .create_module(
            NewModule {
                course_id: course.id,
                title: "Storage".to_string(),
                description: String::new(),
                position: 1,
            },
            &instructor,
        )
        .await
        .unwrap();

    let mut lesson_ids = Vec::new();
    for position in 1..=lessons {
        let lesson = content
            .create_lesson(
                NewLesson {
                    module_id: module.id,
                    title: format!("Lesson {}", position),
                    content: String::new(),
                    video_url: None,
                    position,
                },
                &instructor,
            )
            .await
            .unwrap();
        lesson_ids.push(lesson.id);
    }

    let student = OperationContext::new(Uuid::new_v4());
    EnrollmentHandler::new(store.clone())
        .execute(EnrollCommand::new(student.user_id, course.id), &student)
        .await
        .unwrap();

    (student, course.id, lesson_ids)
}

#[tokio::test]
#[ignore]
async fn test_completion_upsert_refreshes_existing_row() {
    let pool = setup_test_db().await;
    let pg = PgStore::new(pool);
    let store: SharedStore = Arc::new(pg.clone());
    let (student, _, lessons) = seed(&store, 1).await;

    let first = pg
        .upsert_completion(student.user_id, lessons[0], chrono::Utc::now())
        .await
        .unwrap();
    assert!(first.created);

    let second = pg
        .upsert_completion(student.user_id, lessons[0], chrono::Utc::now())
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(first.completion.id, second.completion.id);
    assert!(second.completion.completed_at >= first.completion.completed_at);
}

#[tokio::test]
#[ignore]
async fn test_module_milestone_written_once() {
    let pool = setup_test_db().await;
    let pg = PgStore::new(pool);
    let store: SharedStore = Arc::new(pg.clone());
    let (student, course_id, _) = seed(&store, 1).await;
    let module_id = pg.list_modules(course_id).await.unwrap()[0].id;

    assert!(pg
        .record_module_milestone(student.user_id, module_id, chrono::Utc::now())
        .await
        .unwrap());
    assert!(!pg
        .record_module_milestone(student.user_id, module_id, chrono::Utc::now())
        .await
        .unwrap());
}

#[tokio::test]
#[ignore]
async fn test_certificate_insert_if_absent() {
    let pool = setup_test_db().await;
    let pg = PgStore::new(pool);
    let store: SharedStore = Arc::new(pg.clone());
    let (student, course_id, _) = seed(&store, 1).await;

    let number = format!("CERT-{}", &Uuid::new_v4().simple().to_string()[..12].to_uppercase());
    let first = pg
        .insert_certificate_if_absent(Certificate::issue(
            student.user_id,
            course_id,
            number.clone(),
            chrono::Utc::now(),
        ))
        .await
        .unwrap();
    assert!(first.was_inserted());

    let second = pg
        .insert_certificate_if_absent(Certificate::issue(
            student.user_id,
            course_id,
            "CERT-OTHER".to_string(),
            chrono::Utc::now(),
        ))
        .await
        .unwrap();
    match second {
        InsertOutcome::Existing(existing) => assert_eq!(existing.certificate_number, number),
        InsertOutcome::Inserted(_) => panic!("second certificate must not be written"),
    }

    // Same number for another student clashes on the number constraint
    let (other, _, _) = seed(&store, 1).await;
    let err = pg
        .insert_certificate_if_absent(Certificate::issue(
            other.user_id,
            course_id,
            number,
            chrono::Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { .. }));
    assert!(err.is_certificate_number_collision());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_last_lesson_mints_one_certificate() {
    let pool = setup_test_db().await;
    let pg = PgStore::new(pool);
    let store: SharedStore = Arc::new(pg.clone());
    let (student, course_id, lessons) = seed(&store, 2).await;

    let handler = CompletionHandler::new(store.clone());
    handler
        .execute(MarkLessonCompleteCommand::new(student.user_id, lessons[0]), &student)
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handler = handler.clone();
        let student = student.clone();
        let lesson_id = lessons[1];
        tasks.push(tokio::spawn(async move {
            handler
                .execute(MarkLessonCompleteCommand::new(student.user_id, lesson_id), &student)
                .await
        }));
    }

    let mut minted = 0;
    for task in tasks {
        if task.await.unwrap().unwrap().course_completed_now {
            minted += 1;
        }
    }

    assert_eq!(minted, 1);
    let certificates = pg.list_certificates(Some(student.user_id)).await.unwrap();
    assert_eq!(certificates.len(), 1);
    assert_eq!(certificates[0].course_id, course_id);
}

#[tokio::test]
#[ignore]
async fn test_comments_and_catalog() {
    let pool = setup_test_db().await;
    let pg = PgStore::new(pool);
    let store: SharedStore = Arc::new(pg.clone());
    let (student, course_id, lessons) = seed(&store, 1).await;

    let courses = pg.list_courses(None).await.unwrap();
    assert!(courses.iter().any(|c| c.id == course_id));
    assert!(pg.list_courses(Some(Uuid::new_v4())).await.unwrap().is_empty());

    let question = pg
        .insert_comment(Comment::new(lessons[0], student.user_id, None, "Why?".to_string()))
        .await
        .unwrap();
    let reply = pg
        .insert_comment(Comment::new(
            lessons[0],
            Uuid::new_v4(),
            Some(question.id),
            "Because".to_string(),
        ))
        .await
        .unwrap();

    let stored = pg.get_comment(reply.id).await.unwrap().unwrap();
    assert_eq!(stored.parent_id, Some(question.id));

    let thread = pg.list_comments(lessons[0]).await.unwrap();
    assert_eq!(thread.len(), 2);
}
