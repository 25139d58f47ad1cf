#[macro_use]
extern crate rocket;

mod api;
mod catchers;
mod database;
mod env;
mod error;
mod icons;
mod models;
mod routes;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use std::sync::Mutex;

use api::{
    api_add_course, api_add_session, api_course_summary, api_delete_course, api_delete_session,
    api_edit_course, api_edit_session, api_get_study_types, api_upload_image, health,
};
use catchers::{default_catcher, unprocessable};
use database::{connect, initialize_schema};
use env::{AppConfig, load_environment};
use error::AppError;
use icons::IconStore;
use once_cell::sync::Lazy;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::AdHoc;
use rocket::fs::{FileServer, Options};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;
use routes::{course_page, index};
use telemetry::{OtelGuard, TelemetryFairing, init_tracing, shutdown_telemetry};
use thiserror::Error;

use sqlx::SqlitePool;
use tracing::info;

/// Holds the tracer provider until Rocket shuts down.
pub static TELEMETRY_GUARD: Lazy<Mutex<Option<OtelGuard>>> = Lazy::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("Environment error: {0}")]
    Environment(String),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    load_environment().map_err(|e| Error::Environment(e.to_string()))?;
    let config = AppConfig::from_env()?;

    let guard = init_tracing(&config)?;
    if let Ok(mut slot) = TELEMETRY_GUARD.lock() {
        *slot = guard;
    }

    let pool = connect(&config.database_url).await?;
    initialize_schema(&pool).await?;

    init_rocket(pool, &config).await?.launch().await?;

    Ok(())
}

pub async fn init_rocket(pool: SqlitePool, config: &AppConfig) -> Result<Rocket<Build>, AppError> {
    info!("Starting study tracker");

    let icons = IconStore::new(&config.upload_dir);
    icons.ensure_root().await?;

    let icon_limit = config.icon_upload_limit_mib.mebibytes();
    let limits = Limits::default()
        .limit("file", icon_limit)
        .limit("data-form", icon_limit + 64.kibibytes());
    let figment = rocket::Config::figment().merge(("limits", limits));

    Ok(rocket::custom(figment)
        .manage(pool)
        .manage(icons)
        .mount("/", routes![index, course_page])
        .mount(
            "/",
            routes![
                api_add_course,
                api_edit_course,
                api_delete_course,
                api_add_session,
                api_edit_session,
                api_delete_session,
                api_upload_image,
                api_get_study_types,
                api_course_summary,
                health,
            ],
        )
        .mount("/static", FileServer::new("static", Options::Index | Options::Missing))
        .mount(
            "/uploads",
            FileServer::new(&config.upload_dir, Options::Missing),
        )
        .register("/", catchers![unprocessable, default_catcher])
        .attach(Template::fairing())
        .attach(TelemetryFairing)
        .attach(AdHoc::on_shutdown("Telemetry shutdown", |_| {
            Box::pin(async { shutdown_telemetry() })
        })))
}
