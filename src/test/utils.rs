use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Once;

use rocket::local::asynchronous::Client;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::database::{add_session, connect, create_course, initialize_schema};
use crate::env::AppConfig;
use crate::error::AppError;
use crate::init_rocket;

static INIT: Once = Once::new();

#[derive(Default)]
pub struct TestDbBuilder {
    courses: Vec<String>,
    sessions: Vec<TestSession>,
}

pub struct TestSession {
    pub course_name: String,
    pub study_type: String,
    pub duration: i64,
}

impl TestDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course(mut self, name: &str) -> Self {
        self.courses.push(name.to_string());
        self
    }

    pub fn session(mut self, course_name: &str, study_type: &str, duration: i64) -> Self {
        self.sessions.push(TestSession {
            course_name: course_name.to_string(),
            study_type: study_type.to_string(),
            duration,
        });
        self
    }

    pub async fn build(self) -> Result<TestDb, AppError> {
        INIT.call_once(|| {
            let _ = env_logger::builder()
                .parse_filters("debug")
                .is_test(true)
                .try_init();
        });

        // One connection keeps the whole test on a single in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        initialize_schema(&pool).await?;

        let mut course_id_map: HashMap<String, i64> = HashMap::new();
        let mut session_ids: Vec<i64> = Vec::new();

        for name in &self.courses {
            let course = create_course(&pool, name).await?;
            course_id_map.insert(name.clone(), course.id);
        }

        for session in &self.sessions {
            let course_id = course_id_map.get(&session.course_name).copied().ok_or_else(|| {
                AppError::NotFound(format!("Test course {} was not declared", session.course_name))
            })?;

            let created =
                add_session(&pool, course_id, &session.study_type, session.duration).await?;
            session_ids.push(created.id);
        }

        Ok(TestDb {
            pool,
            course_id_map,
            session_ids,
        })
    }
}

pub struct TestDb {
    pub pool: Pool<Sqlite>,
    pub course_id_map: HashMap<String, i64>,
    pub session_ids: Vec<i64>,
}

impl TestDb {
    pub fn course_id(&self, name: &str) -> i64 {
        self.course_id_map
            .get(name)
            .copied()
            .unwrap_or_else(|| panic!("Course {} not found in test database", name))
    }

    pub async fn session_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count sessions")
    }

    pub async fn study_type_count(&self, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM study_types WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count study types")
    }
}

pub async fn create_standard_test_db() -> TestDb {
    TestDbBuilder::new()
        .course("Calculus")
        .course("Linear Algebra")
        .session("Calculus", "Reading", 30)
        .session("Calculus", "Exercises", 45)
        .session("Linear Algebra", "Lecture", 90)
        .build()
        .await
        .expect("Failed to build standard test database")
}

/// File-backed database for tests that need several connections at once.
pub struct FileDb {
    pub pool: Pool<Sqlite>,
    path: PathBuf,
}

impl FileDb {
    pub async fn open() -> Self {
        let path = std::env::temp_dir().join(format!("study-tracker-{}.db", Uuid::new_v4()));
        let pool = connect(&format!("sqlite://{}", path.display()))
            .await
            .expect("Failed to open file database");
        initialize_schema(&pool)
            .await
            .expect("Failed to initialize schema");

        Self { pool, path }
    }

    pub async fn close(self) {
        self.pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

/// Fresh directory under the system temp dir for icon uploads.
pub fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("study-tracker-uploads-{}", Uuid::new_v4()))
}

pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb, AppConfig) {
    let config = AppConfig {
        upload_dir: temp_upload_dir(),
        ..AppConfig::default()
    };

    let rocket = init_rocket(test_db.pool.clone(), &config)
        .await
        .expect("Failed to build rocket instance");

    let client = Client::tracked(rocket)
        .await
        .expect("Failed to create test client");

    (client, test_db, config)
}
