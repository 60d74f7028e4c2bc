//! Project image uploads.
//!
//! The multipart field is named `image`; other fields are ignored.

use axum::extract::{
    multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State,
};
use folio_core::{StoredUpload, UploadError};
use log::info;

use crate::{
    auth::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::{blocking, SharedState},
};

const IMAGE_FIELD: &str = "image";

pub async fn upload_handler(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<StoredUpload>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let uploads = state.uploads.clone();
        let stored = blocking(move || {
            Ok(uploads.store(&original_name, content_type.as_deref(), &bytes)?)
        })
        .await?;
        info!(
            "event=upload_request module=api status=ok user_id={} filename={}",
            admin.id, stored.filename
        );
        return Ok(ApiResponse::ok(stored).with_message("Image uploaded successfully"));
    }

    Err(UploadError::NoFile.into())
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    filename: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(filename) = filename?;
    let uploads = state.uploads.clone();
    blocking(move || Ok(uploads.delete(&filename)?)).await?;

    Ok(ApiResponse::ok(()).with_message("Image deleted successfully"))
}
