use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::StudyType;

/// Returns the vocabulary entry for `name`, creating it on first use.
/// Names compare case-sensitively; repeating a name never errors.
#[instrument(skip(pool))]
pub async fn ensure_type(pool: &Pool<Sqlite>, name: &str) -> Result<StudyType, AppError> {
    let mut conn = pool.acquire().await?;
    ensure_type_with(&mut *conn, name).await
}

/// [`ensure_type`] on a caller-owned connection, so session writes can grow
/// the vocabulary inside their own transaction.
#[instrument(skip(conn))]
pub async fn ensure_type_with(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<StudyType, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Study type must not be empty".to_string(),
        ));
    }

    let inserted =
        sqlx::query("INSERT INTO study_types (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;

    if inserted.rows_affected() > 0 {
        info!("Registered new study type");
    }

    let study_type =
        sqlx::query_as::<_, StudyType>("SELECT id, name FROM study_types WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

    Ok(study_type)
}

#[instrument(skip(executor))]
pub async fn list_types<'e, E>(executor: E) -> Result<Vec<String>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    info!("Listing study types");
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM study_types ORDER BY name")
        .fetch_all(executor)
        .await?;

    Ok(names)
}
