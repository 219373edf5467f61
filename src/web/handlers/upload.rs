//! Image upload handler.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("File too large");
    }
    tracing::error!("Failed to read multipart data: {}", e);
    ApiError::bad_request("Invalid multipart data")
}

/// POST /api/uploads - Store an image for embedding in notes.
///
/// Request body: multipart/form-data with a "file" field.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let storage = state
        .uploads
        .as_ref()
        .ok_or_else(|| ApiError::internal("Upload storage not configured"))?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = match field.content_type() {
            Some(ct) => ct.to_string(),
            None => field
                .file_name()
                .and_then(|name| mime_guess::from_path(name).first())
                .map_or_else(|| "application/octet-stream".to_string(), |m| m.to_string()),
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((content_type, bytes.to_vec()));
    }

    let (content_type, content) =
        upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let path = storage.save_image(&content, &content_type)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UploadResponse { path })),
    ))
}
