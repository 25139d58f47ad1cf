use std::path::{Path, PathBuf};

use rocket::fs::TempFile;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::DEFAULT_ICON;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Directory of uploaded course icons. Courses refer to icons by file name
/// only; this type owns the mapping to disk.
#[derive(Debug, Clone)]
pub struct IconStore {
    root: PathBuf,
}

impl IconStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Stores the upload under a fresh `<uuid>.<ext>` name and returns that
    /// name.
    #[instrument(skip(self, file))]
    pub async fn save(&self, file: &mut TempFile<'_>) -> Result<String, AppError> {
        if file.len() == 0 {
            return Err(AppError::Upload("No file selected".to_string()));
        }

        let extension = upload_extension(file)
            .ok_or_else(|| AppError::Upload("File has no extension".to_string()))?;
        if !is_allowed_extension(&extension) {
            return Err(AppError::Upload(format!(
                "File type .{} is not allowed; expected one of {}",
                extension,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        self.ensure_root().await?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        file.move_copy_to(self.path_of(&filename)).await?;

        info!(icon = %filename, "Stored course icon");
        Ok(filename)
    }

    /// Deletes an icon that is no longer referenced. The shared default icon
    /// is never touched; failures are only logged.
    #[instrument(skip(self))]
    pub async fn remove(&self, filename: &str) {
        if filename == DEFAULT_ICON || !is_plain_file_name(filename) {
            return;
        }

        match tokio::fs::remove_file(self.path_of(filename)).await {
            Ok(()) => info!("Removed course icon"),
            Err(err) => warn!(error = %err, "Failed to remove course icon"),
        }
    }
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
}

fn is_plain_file_name(filename: &str) -> bool {
    Path::new(filename).file_name().and_then(|name| name.to_str()) == Some(filename)
}

/// Extension of the client's file name, falling back to the declared
/// content type.
fn upload_extension(file: &TempFile<'_>) -> Option<String> {
    let from_name = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .and_then(|raw| Path::new(raw).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    from_name.or_else(|| {
        file.content_type()
            .and_then(|content_type| content_type.extension())
            .map(|ext| ext.as_str().to_ascii_lowercase())
    })
}
