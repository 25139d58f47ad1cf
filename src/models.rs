use serde::{Deserialize, Serialize};

/// Icon every course starts with until an image is uploaded.
pub const DEFAULT_ICON: &str = "default-icon.jpg";

/// Longest session that can be logged, one day. Mirrored by the schema's
/// `CHECK` on `sessions.duration`.
pub const MAX_SESSION_MINUTES: i64 = 24 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub icon: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCourse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl From<DbCourse> for Course {
    fn from(course: DbCourse) -> Self {
        Self {
            id: course.id.unwrap_or_default(),
            name: course.name.unwrap_or_default(),
            icon: course
                .icon
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub course_id: i64,
    #[serde(rename = "type")]
    pub study_type: String,
    pub duration: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSession {
    pub id: Option<i64>,
    pub course_id: Option<i64>,
    #[sqlx(rename = "type")]
    pub study_type: Option<String>,
    pub duration: Option<i64>,
}

impl From<DbSession> for Session {
    fn from(session: DbSession) -> Self {
        Self {
            id: session.id.unwrap_or_default(),
            course_id: session.course_id.unwrap_or_default(),
            study_type: session.study_type.unwrap_or_default(),
            duration: session.duration.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StudyType {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseSummary {
    pub session_count: i64,
    pub total_minutes: i64,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbCourseSummary {
    pub session_count: Option<i64>,
    pub total_minutes: Option<i64>,
}

impl From<DbCourseSummary> for CourseSummary {
    fn from(summary: DbCourseSummary) -> Self {
        Self {
            session_count: summary.session_count.unwrap_or_default(),
            total_minutes: summary.total_minutes.unwrap_or_default(),
        }
    }
}

/// A course together with its live totals, as shown on the course list.
#[derive(Serialize, Debug, Clone)]
pub struct CourseOverview {
    #[serde(flatten)]
    pub course: Course,
    pub summary: CourseSummary,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCourseOverview {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub session_count: Option<i64>,
    pub total_minutes: Option<i64>,
}

impl From<DbCourseOverview> for CourseOverview {
    fn from(row: DbCourseOverview) -> Self {
        Self {
            course: Course::from(DbCourse {
                id: row.id,
                name: row.name,
                icon: row.icon,
            }),
            summary: CourseSummary::from(DbCourseSummary {
                session_count: row.session_count,
                total_minutes: row.total_minutes,
            }),
        }
    }
}

/// Everything the course page shows, read from a single snapshot.
#[derive(Serialize, Debug, Clone)]
pub struct CourseDetail {
    pub course: Course,
    pub sessions: Vec<Session>,
    pub summary: CourseSummary,
    pub study_types: Vec<String>,
}
