use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::access::{RoleScore, ScopePrefix};
use crate::auth::{verify_jwt, Claims};
use crate::error::ApiError;
use crate::location::LocationCode;
use crate::state::AppState;

/// Authenticated caller with their scope already resolved.
#[derive(Clone, Debug, Serialize)]
pub struct Caller {
    pub user_id: String,
    pub role: String,
    pub score: RoleScore,
    pub location: LocationCode,
    pub scope: ScopePrefix,
}

impl Caller {
    /// Resolve role and scope for verified claims. Unknown roles are denied.
    pub fn from_claims(claims: Claims, state: &AppState) -> Result<Self, ApiError> {
        let score = state.registry.score_for(&claims.role).map_err(|e| {
            tracing::warn!("User {} presented unrecognised role '{}'", claims.sub, claims.role);
            ApiError::from(e)
        })?;
        let location = LocationCode::parse(&claims.location_id)?;
        let scope = state.table.resolve(score, &location)?;

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
            score,
            location,
            scope,
        })
    }
}

/// JWT authentication middleware that validates tokens and resolves the caller's scope
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = verify_jwt(&token, &state.config.security.jwt_secret)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let caller = Caller::from_claims(claims, &state)?;
    tracing::debug!("Caller {} ({}) scoped to {}", caller.user_id, caller.role, caller.scope.as_str());
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }
}
