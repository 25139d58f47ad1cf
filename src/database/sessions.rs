use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::database::{ensure_type_with, get_course};
use crate::error::AppError;
use crate::models::{DbSession, Session};
use crate::validation::check_session_minutes;

fn validate_entry(study_type: &str, duration: i64) -> Result<(), AppError> {
    if study_type.trim().is_empty() {
        return Err(AppError::Validation(
            "Study type must not be empty".to_string(),
        ));
    }
    check_session_minutes(duration)
}

fn session_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Session with id {} not found in database", id))
}

/// Logs a session against an existing course, growing the study-type
/// vocabulary in the same transaction.
#[instrument(skip(pool))]
pub async fn add_session(
    pool: &Pool<Sqlite>,
    course_id: i64,
    study_type: &str,
    duration: i64,
) -> Result<Session, AppError> {
    info!("Adding study session");
    validate_entry(study_type, duration)?;

    let mut tx = pool.begin().await?;

    // Writing first takes the write lock before the course lookup.
    ensure_type_with(&mut *tx, study_type).await?;
    get_course(&mut *tx, course_id).await?;

    let res = sqlx::query("INSERT INTO sessions (course_id, type, duration) VALUES (?, ?, ?)")
        .bind(course_id)
        .bind(study_type)
        .bind(duration)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Session {
        id: res.last_insert_rowid(),
        course_id,
        study_type: study_type.to_string(),
        duration,
    })
}

#[instrument(skip(pool))]
pub async fn edit_session(
    pool: &Pool<Sqlite>,
    id: i64,
    new_type: &str,
    new_duration: i64,
) -> Result<(), AppError> {
    info!("Editing study session");
    validate_entry(new_type, new_duration)?;

    let mut tx = pool.begin().await?;

    let res = sqlx::query("UPDATE sessions SET type = ?, duration = ? WHERE id = ?")
        .bind(new_type)
        .bind(new_duration)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if res.rows_affected() == 0 {
        return Err(session_not_found(id));
    }

    ensure_type_with(&mut *tx, new_type).await?;

    tx.commit().await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn delete_session(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting study session");
    let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(session_not_found(id));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_session(pool: &Pool<Sqlite>, id: i64) -> Result<Session, AppError> {
    info!("Fetching session by ID");
    let row = sqlx::query_as::<_, DbSession>(
        "SELECT id, course_id, type, duration FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(session) => Ok(Session::from(session)),
        None => Err(session_not_found(id)),
    }
}

/// Sessions of one course, oldest first.
#[instrument(skip(executor))]
pub async fn list_sessions_for_course<'e, E>(
    executor: E,
    course_id: i64,
) -> Result<Vec<Session>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    info!("Listing sessions for course");
    let rows = sqlx::query_as::<_, DbSession>(
        "SELECT id, course_id, type, duration FROM sessions
         WHERE course_id = ?
         ORDER BY id ASC",
    )
    .bind(course_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Session::from).collect())
}
