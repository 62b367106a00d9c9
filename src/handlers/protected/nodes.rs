use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::access::policy;
use crate::database::{NodeQuery, NodeRecord, PgNodeStore};
use crate::error::ApiError;
use crate::location::{HierarchyTree, LocationCode, TreeView};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::services::{NodeAllocator, SuffixKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNode {
    pub parent_code: String,
    pub name: String,
    /// Ask for a numbered suffix even where a lettered one is the default.
    #[serde(default)]
    pub serial: bool,
}

/// GET /api/nodes - nodes at or below the caller's scope
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<NodeQuery>,
) -> ApiResult<Vec<NodeRecord>> {
    let limit = state.page_size(query.limit);
    let store = PgNodeStore::new(state.pool.clone());
    let nodes = store.list_scoped(&caller.scope, &query, limit).await?;
    Ok(ApiResponse::success(nodes))
}

/// GET /api/nodes/tree - the caller-visible subtree, nested
pub async fn tree(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Vec<TreeView>> {
    let store = PgNodeStore::new(state.pool.clone());
    let rows = store.list_subtree(&caller.scope).await?;

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        parsed.push((row.location_code()?, Some(row.name)));
    }
    let tree = HierarchyTree::from_rows(parsed);
    Ok(ApiResponse::success(tree.visible_views(&caller.scope)))
}

/// POST /api/nodes - allocate a child code under `parent_code` and persist it
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CreateNode>,
) -> ApiResult<NodeRecord> {
    if body.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "must not be empty"));
    }

    let parent = LocationCode::parse(&body.parent_code)?;
    // out-of-scope parents look the same as missing ones
    if !caller.scope.contains_code(&parent) {
        return Err(ApiError::not_found(format!("Not found: node {}", parent)));
    }
    let level = parent
        .level()
        .child()
        .ok_or_else(|| ApiError::field_error("parent_code", "serial codes have no children"))?;
    policy::ensure_can_create(caller.score, level)?;

    let store = PgNodeStore::new(state.pool.clone());
    let allocator = NodeAllocator::new(&store, state.generator);
    let record = allocator
        .allocate(&parent, &body.name, SuffixKind::for_child_of(&parent, body.serial))
        .await?;

    tracing::info!("User {} created {} ({})", caller.user_id, record.code, level);
    Ok(ApiResponse::created(record))
}
