//! File handlers for the HTTP API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{FileService, FileUpdate, NewFile};
use crate::web::dto::{
    into_tags, ApiResponse, FileResponse, SaveFileRequest, UpdateFileRequest, UpdateIconRequest,
    UpdateTagsRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/files - Save a new file.
///
/// The file's node is appended to the root of its collection.
pub async fn save_file(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SaveFileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut new_file = NewFile::new(req.name).with_tags(into_tags(req.tags));
    new_file.collection_id = req.collection_id;
    new_file.content = req.content;
    new_file.icon = req.icon.filter(|icon| !icon.trim().is_empty());

    let mut workspace = state.workspace.lock().await;
    let record = FileService::new(state.db.pool())
        .save(&mut workspace, new_file)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(record))),
    ))
}

/// GET /api/files/:id - Get a file.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = FileService::new(state.db.pool()).get(&id).await?;
    Ok(Json(ApiResponse::new(record.into())))
}

/// PUT /api/files/:id - Rename a file or replace its content.
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut update = FileUpdate::new();
    if let Some(name) = req.name {
        update = update.name(name);
    }
    if let Some(content) = req.content {
        update = update.content(Some(content));
    }
    if update.is_empty() {
        return Err(ApiError::bad_request("Nothing to update"));
    }

    let mut workspace = state.workspace.lock().await;
    let record = FileService::new(state.db.pool())
        .update(&mut workspace, &id, &update)
        .await?;

    Ok(Json(ApiResponse::new(record.into())))
}

/// PUT /api/files/:id/icon - Set a file's icon.
pub async fn update_file_icon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateIconRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let record = FileService::new(state.db.pool())
        .update_icon(&mut workspace, &id, &req.icon)
        .await?;

    Ok(Json(ApiResponse::new(record.into())))
}

/// PUT /api/files/:id/tags - Replace a file's tags.
pub async fn update_file_tags(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTagsRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let tags = into_tags(req.tags);

    let mut workspace = state.workspace.lock().await;
    let record = FileService::new(state.db.pool())
        .update_tags(&mut workspace, &id, &tags)
        .await?;

    Ok(Json(ApiResponse::new(record.into())))
}
