//! Collection and tree handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::file::{FileRepository, FileService, NewFile};
use crate::sync::{Effect, Location, Mutation};
use crate::tree::{self, Collection, Node, NodeKind};
use crate::web::dto::{
    ApiResponse, CollectionResponse, CollectionSummary, CreateCollectionRequest,
    DeleteNodeRequest, DeleteNodeResponse, InsertNodeRequest, InsertNodeResponse, NodeRef,
    ResolveQuery, ResolveResponse, ValidatedJson,
};
use crate::web::error::ApiError;

fn collection_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Collection {id} not found"))
}

/// Turn a UI node reference into a location in `collection`.
///
/// The path is made relative to the forest root. The node is the one at the
/// path if its ID matches, otherwise the node with that ID anywhere in the
/// tree. `None` if the ID is unknown.
fn locate(collection: &Collection, node_ref: &NodeRef) -> Option<Location> {
    let path = tree::relative_path(&node_ref.path, Some(&collection.name));
    let forest = &collection.directories;
    let node = tree::resolve_path(forest, &path)
        .filter(|n| n.id == node_ref.id)
        .or_else(|| tree::find_by_id(forest, &node_ref.id))?;
    Some(Location::new(node.clone(), path))
}

fn collect_file_ids(node: &Node, out: &mut Vec<String>) {
    if node.is_file() {
        out.push(node.id.clone());
    }
    for child in node.children() {
        collect_file_ids(child, out);
    }
}

/// GET /api/collections - List collections.
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<CollectionSummary>>> {
    let workspace = state.workspace.lock().await;
    let summaries = workspace
        .collections()
        .iter()
        .map(CollectionSummary::from)
        .collect();
    Json(ApiResponse::new(summaries))
}

/// POST /api/collections - Create a collection.
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CollectionResponse>>), ApiError> {
    let name = req.name.trim();
    tree::validate_name(name)?;

    let mut workspace = state.workspace.lock().await;
    let collection = workspace.create_collection(name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CollectionResponse::from(&collection))),
    ))
}

/// GET /api/collections/:id - Get a collection with its forest.
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CollectionResponse>>, ApiError> {
    let workspace = state.workspace.lock().await;
    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;
    Ok(Json(ApiResponse::new(collection.into())))
}

/// GET /api/collections/:id/resolve?path= - Resolve a path to a node.
pub async fn resolve_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ApiResponse<ResolveResponse>>, ApiError> {
    let workspace = state.workspace.lock().await;
    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;

    let node = collection
        .resolve(&query.path)
        .ok_or_else(|| ApiError::not_found(format!("Nothing at path '{}'", query.path)))?;

    Ok(Json(ApiResponse::new(ResolveResponse {
        path: tree::relative_path(&query.path, Some(&collection.name)),
        node: node.clone(),
    })))
}

/// POST /api/collections/:id/nodes - Insert a file or folder.
///
/// Files get a file record as well, so they can be edited through the
/// file endpoints.
pub async fn insert_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<InsertNodeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InsertNodeResponse>>), ApiError> {
    tree::validate_name(&req.name)?;

    let mut workspace = state.workspace.lock().await;
    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;

    let target = req.target.as_ref().and_then(|r| locate(collection, r));
    let siblings = tree::sibling_names(
        &collection.directories,
        target.as_ref().map(Location::as_target),
    );
    if siblings.contains(&req.name.as_str()) {
        return Err(ApiError::conflict(format!(
            "'{}' already exists at this location",
            req.name
        )));
    }

    let (node_id, placement) = match req.kind {
        NodeKind::File => {
            let mut file = NewFile::new(req.name).with_collection(&id);
            file.content = req.content;
            file.icon = req.icon;
            let (record, placement) = FileService::new(state.db.pool())
                .insert(&mut workspace, file, target)
                .await?;
            (record.id, placement)
        }
        NodeKind::Folder => {
            let node = Node::folder(req.name);
            let node_id = node.id.clone();
            let settled = workspace
                .apply(&id, Mutation::Insert { node, target })
                .await?;
            let Effect::Inserted { placement, .. } = settled.effect else {
                return Err(ApiError::internal("Unexpected mutation result"));
            };
            (node_id, placement)
        }
    };

    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;
    let node = tree::find_by_id(&collection.directories, &node_id)
        .cloned()
        .ok_or_else(|| ApiError::internal("Inserted node missing"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(InsertNodeResponse::new(node, placement, collection))),
    ))
}

/// DELETE /api/collections/:id/nodes - Delete a node and its subtree.
///
/// A stale or unresolvable target is not an error; the response reports
/// that nothing was removed. File records that could not be deleted after
/// the tree was updated are listed in `orphanedRecords`.
pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<DeleteNodeRequest>,
) -> Result<Json<ApiResponse<DeleteNodeResponse>>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;

    let path = tree::relative_path(&req.target.path, Some(&collection.name));
    let node = tree::find_by_id(&collection.directories, &req.target.id)
        .cloned()
        .unwrap_or_else(|| Node::file(path.clone()).with_id(&req.target.id));

    let mutation = Mutation::Delete {
        target: Location::new(node, path),
    };
    let settled = workspace.apply(&id, mutation).await?;
    let removed = match settled.effect {
        Effect::Deleted { removed } => removed,
        _ => None,
    };

    let mut orphaned_records = Vec::new();
    if let Some(ref subtree) = removed {
        let mut file_ids = Vec::new();
        collect_file_ids(subtree, &mut file_ids);
        let repo = FileRepository::new(state.db.pool());
        for file_id in file_ids {
            if let Err(e) = repo.delete(&file_id).await {
                tracing::warn!(file_id = %file_id, error = %e, "Failed to delete file record");
                orphaned_records.push(file_id);
            }
        }
    }

    let collection = workspace
        .collection(&id)
        .ok_or_else(|| collection_not_found(&id))?;
    Ok(Json(ApiResponse::new(DeleteNodeResponse {
        removed: removed.is_some(),
        removed_count: removed.as_ref().map_or(0, Node::subtree_size),
        orphaned_records,
        collection: collection.into(),
    })))
}
