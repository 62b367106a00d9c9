mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = common::ensure_server().await?;
    let resp = reqwest::get(server.url("/")).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Flock API");
    assert!(body["data"]["endpoints"]["scope"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_database_state() -> Result<()> {
    let server = common::ensure_server().await?;
    let resp = reqwest::get(server.url("/health")).await?;
    let status = resp.status();
    let body: Value = resp.json().await?;

    match status {
        StatusCode::OK => assert_eq!(body["data"]["database"], "ok"),
        StatusCode::SERVICE_UNAVAILABLE => {
            assert_eq!(body["success"], false);
            assert_eq!(body["data"]["status"], "degraded");
        }
        other => panic!("unexpected health status {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/scope", "/api/nodes", "/api/nodes/tree", "/api/bulletins/active"] {
        let resp = client.get(server.url(path)).send().await?;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body: Value = resp.json().await?;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let resp = client
        .get(server.url("/api/scope"))
        .header("Authorization", "Basic ZmxvY2s6ZmxvY2s=")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
