use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes(state.clone()))
        .with_state(state.clone());

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/scope", get(protected::scope::get))
        .route("/api/nodes", get(protected::nodes::list).post(protected::nodes::create))
        .route("/api/nodes/tree", get(protected::nodes::tree))
        .route("/api/bulletins", post(protected::bulletins::create))
        .route("/api/bulletins/active", get(protected::bulletins::active))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{RoleRegistry, ScopeTable};
    use crate::auth::Claims;
    use crate::config::AppConfig;
    use axum::{body::Body, http::Request, http::StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn state() -> AppState {
        let mut config = AppConfig::from_env();
        config.security.jwt_secret = SECRET.to_string();
        let config: &'static AppConfig = Box::leak(Box::new(config));
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://flock@127.0.0.1:1/flock")
            .unwrap();
        AppState::new(pool, RoleRegistry::builtin(), ScopeTable::default(), config).unwrap()
    }

    fn bearer(role: &str) -> String {
        let claims = Claims {
            sub: "u-1".into(),
            role: role.into(),
            location_id: "DCL-234-KW-ILR-ILE-0002".into(),
            exp: chrono::Utc::now().timestamp() + 600,
            iat: 0,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        format!("Bearer {}", token)
    }

    async fn get_scope(auth: Option<String>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri("/api/scope");
        if let Some(auth) = auth {
            request = request.header("authorization", auth);
        }
        let response = app(state())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn scope_route_resolves_caller() {
        let (status, body) = get_scope(Some(bearer("State Admin"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["scope"], "DCL-234-KW");
        assert_eq!(body["data"]["level"], "region");
    }

    #[tokio::test]
    async fn scope_route_denies_unknown_role_and_missing_token() {
        let (status, _) = get_scope(Some(bearer("Janitor"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = get_scope(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], true);
    }
}
