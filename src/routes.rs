use rocket::State;
use rocket_dyn_templates::{Template, context};
use sqlx::{Pool, Sqlite};

use crate::database::{course_detail, list_course_overviews};
use crate::error::AppError;
use crate::models::{DEFAULT_ICON, MAX_SESSION_MINUTES};

#[get("/")]
pub async fn index(db: &State<Pool<Sqlite>>) -> Result<Template, AppError> {
    let courses = list_course_overviews(db).await?;

    Ok(Template::render(
        "index",
        context! {
            title: "Study Tracker",
            courses: courses,
            default_icon: DEFAULT_ICON,
        },
    ))
}

#[get("/course/<id>")]
pub async fn course_page(id: i64, db: &State<Pool<Sqlite>>) -> Result<Template, AppError> {
    let detail = course_detail(db, id).await?;

    Ok(Template::render(
        "course",
        context! {
            title: detail.course.name.clone(),
            course: detail.course,
            sessions: detail.sessions,
            summary: detail.summary,
            study_types: detail.study_types,
            default_icon: DEFAULT_ICON,
            max_minutes: MAX_SESSION_MINUTES,
        },
    ))
}
