use rocket::FromForm;
use rocket::State;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::database::{
    add_session, course_summary, create_course, delete_course, delete_session, edit_session,
    get_course, list_types, rename_course, set_course_icon,
};
use crate::error::AppError;
use crate::icons::IconStore;
use crate::models::{Course, CourseSummary, Session};
use crate::validation::{
    ApiError, AppErrorExt, FormFields, FormValidateExt, ToErrorResponse, not_blank,
    parse_duration, session_minutes,
};

#[derive(FromForm, Validate)]
pub struct CourseForm {
    #[validate(custom(function = "not_blank", message = "Course name is required"))]
    name: String,
}

impl FormFields for CourseForm {}

#[derive(FromForm, Validate)]
pub struct SessionForm {
    #[field(name = "type")]
    #[validate(custom(function = "not_blank", message = "Study type is required"))]
    study_type: String,
    #[validate(custom(function = "session_minutes"))]
    duration: String,
}

impl FormFields for SessionForm {
    fn wire_name(field: &str) -> &str {
        match field {
            "study_type" => "type",
            other => other,
        }
    }
}

#[derive(FromForm)]
pub struct IconUploadForm<'r> {
    image: Option<TempFile<'r>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub study_type: String,
    pub duration: i64,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            study_type: session.study_type,
            duration: session.duration,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IconResponse {
    pub success: bool,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudyTypesResponse {
    pub study_types: Vec<String>,
}

#[post("/add_course", data = "<form>")]
pub async fn api_add_course(
    form: Form<CourseForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Course>, ApiError> {
    let validated = form.validated()?;

    let course = create_course(db, &validated.name)
        .await
        .or_error_response()?;

    Ok(Json(course))
}

#[post("/edit_course/<id>", data = "<form>")]
pub async fn api_edit_course(
    id: i64,
    form: Form<CourseForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let validated = form.validated()?;

    rename_course(db, id, &validated.name)
        .await
        .or_error_response()?;

    Ok(SuccessResponse::ok())
}

#[post("/delete_course/<id>")]
pub async fn api_delete_course(
    id: i64,
    db: &State<Pool<Sqlite>>,
    icons: &State<IconStore>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let removed = delete_course(db, id).await.or_error_response()?;

    icons.remove(&removed.icon).await;

    Ok(SuccessResponse::ok())
}

#[post("/add_session/<course_id>", data = "<form>")]
pub async fn api_add_session(
    course_id: i64,
    form: Form<SessionForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let validated = form.validated()?;
    let duration = parse_duration(&validated.duration).or_error_response()?;

    let session = add_session(db, course_id, &validated.study_type, duration)
        .await
        .or_error_response()?;

    Ok(Json(SessionResponse::from(session)))
}

#[post("/edit_session/<id>", data = "<form>")]
pub async fn api_edit_session(
    id: i64,
    form: Form<SessionForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let validated = form.validated()?;
    let duration = parse_duration(&validated.duration).or_error_response()?;

    edit_session(db, id, &validated.study_type, duration)
        .await
        .or_error_response()?;

    Ok(SuccessResponse::ok())
}

#[post("/delete_session/<id>")]
pub async fn api_delete_session(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    delete_session(db, id).await.or_error_response()?;

    Ok(SuccessResponse::ok())
}

#[post("/upload_image/<course_id>", data = "<form>")]
pub async fn api_upload_image(
    course_id: i64,
    mut form: Form<IconUploadForm<'_>>,
    db: &State<Pool<Sqlite>>,
    icons: &State<IconStore>,
) -> Result<Json<IconResponse>, ApiError> {
    get_course(db.inner(), course_id)
        .await
        .or_error_response()?;

    let file = form
        .image
        .as_mut()
        .ok_or_else(|| AppError::Upload("No image file in request".to_string()))
        .or_error_response()?;

    let filename = icons.save(file).await.or_error_response()?;

    // The course may have been deleted while the file was being stored.
    let previous = match set_course_icon(db, course_id, &filename).await {
        Ok(previous) => previous,
        Err(err) => {
            icons.remove(&filename).await;
            return Err(err.to_error_response());
        }
    };

    icons.remove(&previous).await;

    Ok(Json(IconResponse {
        success: true,
        icon: filename,
    }))
}

#[get("/get_study_types")]
pub async fn api_get_study_types(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<StudyTypesResponse>, ApiError> {
    let study_types = list_types(db.inner()).await.or_error_response()?;

    Ok(Json(StudyTypesResponse { study_types }))
}

#[get("/course/<id>/summary")]
pub async fn api_course_summary(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CourseSummary>, ApiError> {
    get_course(db.inner(), id).await.or_error_response()?;

    let summary = course_summary(db.inner(), id)
        .await
        .or_error_response()?;

    Ok(Json(summary))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
