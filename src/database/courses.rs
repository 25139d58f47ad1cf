use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{Course, DEFAULT_ICON, DbCourse};

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Course name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn course_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Course with id {} not found in database", id))
}

#[instrument(skip(pool))]
pub async fn create_course(pool: &Pool<Sqlite>, name: &str) -> Result<Course, AppError> {
    info!("Creating course");
    require_name(name)?;

    let res = sqlx::query("INSERT INTO courses (name, icon) VALUES (?, ?)")
        .bind(name)
        .bind(DEFAULT_ICON)
        .execute(pool)
        .await?;

    Ok(Course {
        id: res.last_insert_rowid(),
        name: name.to_string(),
        icon: DEFAULT_ICON.to_string(),
    })
}

/// Most recently created first.
#[instrument(skip(pool))]
pub async fn list_courses(pool: &Pool<Sqlite>) -> Result<Vec<Course>, AppError> {
    info!("Listing courses");
    let rows = sqlx::query_as::<_, DbCourse>("SELECT id, name, icon FROM courses ORDER BY id DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Course::from).collect())
}

#[instrument(skip(executor))]
pub async fn get_course<'e, E>(executor: E, id: i64) -> Result<Course, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    info!("Fetching course by ID");
    let row = sqlx::query_as::<_, DbCourse>("SELECT id, name, icon FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    match row {
        Some(course) => Ok(Course::from(course)),
        None => Err(course_not_found(id)),
    }
}

#[instrument(skip(pool))]
pub async fn rename_course(pool: &Pool<Sqlite>, id: i64, new_name: &str) -> Result<(), AppError> {
    info!("Renaming course");
    require_name(new_name)?;

    let res = sqlx::query("UPDATE courses SET name = ? WHERE id = ?")
        .bind(new_name)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(course_not_found(id));
    }

    Ok(())
}

/// Removes the course and every session logged against it in one
/// transaction. Returns the removed course so its icon can be released.
#[instrument(skip(pool))]
pub async fn delete_course(pool: &Pool<Sqlite>, id: i64) -> Result<Course, AppError> {
    info!("Deleting course and its sessions");
    let mut tx = pool.begin().await?;

    let removed_sessions = sqlx::query("DELETE FROM sessions WHERE course_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let removed = sqlx::query_as::<_, DbCourse>(
        "DELETE FROM courses WHERE id = ? RETURNING id, name, icon",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    // Dropping `tx` without commit rolls the session deletes back.
    let Some(course) = removed else {
        return Err(course_not_found(id));
    };

    tx.commit().await?;

    info!(removed_sessions, "Course deleted");
    Ok(Course::from(course))
}

/// Points the course at a new icon file and returns the icon it replaced.
#[instrument(skip(pool))]
pub async fn set_course_icon(
    pool: &Pool<Sqlite>,
    id: i64,
    filename: &str,
) -> Result<String, AppError> {
    info!("Setting course icon");
    if filename.trim().is_empty() {
        return Err(AppError::Validation(
            "Icon filename must not be empty".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    // Writing first takes the write lock before the previous icon is read.
    let claimed = sqlx::query("UPDATE courses SET icon = icon WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if claimed.rows_affected() == 0 {
        return Err(course_not_found(id));
    }

    let previous = get_course(&mut *tx, id).await?.icon;

    sqlx::query("UPDATE courses SET icon = ? WHERE id = ?")
        .bind(filename)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(previous)
}
