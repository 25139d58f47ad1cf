use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::database::{get_course, list_sessions_for_course, list_types};
use crate::error::AppError;
use crate::models::{CourseDetail, CourseOverview, CourseSummary, DbCourseOverview, DbCourseSummary};

/// Session count and total minutes for a course, derived from the sessions
/// table on every call. A course without sessions, or one that does not
/// exist, sums to zero.
#[instrument(skip(executor))]
pub async fn course_summary<'e, E>(executor: E, course_id: i64) -> Result<CourseSummary, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    info!("Computing course summary");
    let row = sqlx::query_as::<_, DbCourseSummary>(
        "SELECT COUNT(*) AS session_count, COALESCE(SUM(duration), 0) AS total_minutes
         FROM sessions
         WHERE course_id = ?",
    )
    .bind(course_id)
    .fetch_one(executor)
    .await?;

    Ok(CourseSummary::from(row))
}

/// Reads the course page in one transaction so the session list and the
/// totals always describe the same rows.
#[instrument(skip(pool))]
pub async fn course_detail(pool: &Pool<Sqlite>, course_id: i64) -> Result<CourseDetail, AppError> {
    info!("Loading course detail");
    let mut tx = pool.begin().await?;

    let course = get_course(&mut *tx, course_id).await?;
    let sessions = list_sessions_for_course(&mut *tx, course_id).await?;
    let summary = course_summary(&mut *tx, course_id).await?;
    let study_types = list_types(&mut *tx).await?;

    tx.commit().await?;

    Ok(CourseDetail {
        course,
        sessions,
        summary,
        study_types,
    })
}

#[instrument(skip(pool))]
pub async fn list_course_overviews(pool: &Pool<Sqlite>) -> Result<Vec<CourseOverview>, AppError> {
    info!("Listing courses with summaries");
    let rows = sqlx::query_as::<_, DbCourseOverview>(
        "SELECT c.id, c.name, c.icon,
                COUNT(s.id) AS session_count,
                COALESCE(SUM(s.duration), 0) AS total_minutes
         FROM courses c
         LEFT JOIN sessions s ON s.course_id = c.id
         GROUP BY c.id
         ORDER BY c.id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CourseOverview::from).collect())
}
