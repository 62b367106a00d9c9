use axum::extract::{Extension, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::access::policy;
use crate::bulletin::{Bulletin, NewBulletin};
use crate::database::BulletinRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/bulletins - create a bulletin and persist its deactivation time
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<NewBulletin>,
) -> ApiResult<Bulletin> {
    policy::ensure_can_publish(caller.score)?;
    if !caller.scope.contains_code(&body.location_code) {
        return Err(ApiError::not_found(format!("Not found: node {}", body.location_code)));
    }
    if body.title.trim().is_empty() {
        return Err(ApiError::field_error("title", "must not be empty"));
    }

    let repository = BulletinRepository::new(state.pool.clone());
    let bulletin = repository.create(&body, state.schedule).await?;
    tracing::info!(
        "Bulletin {} posted to {}, deactivates at {}",
        bulletin.id,
        bulletin.location_code,
        bulletin.deactivate_at
    );
    Ok(ApiResponse::created(bulletin))
}

/// GET /api/bulletins/active - active bulletins inside the caller's scope
pub async fn active(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Bulletin>> {
    let repository = BulletinRepository::new(state.pool.clone());
    let now = Utc::now();
    if state.config.bulletin.sweep_on_read {
        repository.sweep(now).await?;
    }

    let limit = state.page_size(query.limit);
    let bulletins = repository
        .list_active(&caller.scope, now, limit, query.offset.unwrap_or(0))
        .await?;
    Ok(ApiResponse::success(bulletins))
}
