use axum::extract::Extension;
use serde::Serialize;

use crate::access::RoleScore;
use crate::middleware::{ApiResponse, ApiResult, Caller};

#[derive(Debug, Serialize)]
pub struct ScopeView {
    pub user_id: String,
    pub role: String,
    pub score: RoleScore,
    pub location: String,
    pub scope: String,
    pub depth: usize,
    pub level: String,
}

/// GET /api/scope - the caller's resolved access prefix
pub async fn get(Extension(caller): Extension<Caller>) -> ApiResult<ScopeView> {
    let scope = &caller.scope;
    Ok(ApiResponse::success(ScopeView {
        depth: scope.depth(),
        level: scope.code().level().to_string(),
        scope: scope.as_str().to_string(),
        location: caller.location.to_string(),
        score: caller.score,
        role: caller.role,
        user_id: caller.user_id,
    }))
}
