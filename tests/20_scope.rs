mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

const MEMBER_CODE: &str = "DCL-234-KW-ILR-ILE-0002";

async fn get_scope(token: &str) -> Result<(StatusCode, Value)> {
    let server = common::ensure_server().await?;
    let resp = reqwest::Client::new()
        .get(server.url("/api/scope"))
        .bearer_auth(token)
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

#[tokio::test]
async fn scope_prefix_narrows_with_score() -> Result<()> {
    let cases = [
        ("Super Admin", "DCL"),
        ("General Superintendent", "DCL"),
        ("National Admin", "DCL-234"),
        ("State Admin", "DCL-234-KW"),
        ("Regional Admin", "DCL-234-KW-ILR"),
        ("Group Admin", "DCL-234-KW-ILR-ILE"),
        ("User", "DCL-234-KW-ILR-ILE"),
    ];

    for (role, expected) in cases {
        let (status, body) = get_scope(&common::mint_token(role, MEMBER_CODE)).await?;
        assert_eq!(status, StatusCode::OK, "{}", role);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["scope"], expected, "{}", role);
        assert_eq!(body["data"]["location"], MEMBER_CODE);
    }
    Ok(())
}

#[tokio::test]
async fn scope_reports_score_and_depth() -> Result<()> {
    let (status, body) = get_scope(&common::mint_token("group admin", "dcl-234-kw-ilr-ile-0002")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 3);
    assert_eq!(body["data"]["depth"], 5);
    assert_eq!(body["data"]["level"], "location");
    assert_eq!(body["data"]["scope"], "DCL-234-KW-ILR-ILE");
    Ok(())
}

#[tokio::test]
async fn unknown_role_is_denied() -> Result<()> {
    let (status, body) = get_scope(&common::mint_token("Janitor", MEMBER_CODE)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn short_location_code_is_rejected() -> Result<()> {
    let (status, body) = get_scope(&common::mint_token("User", "DCL-234")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn bad_signature_and_expired_tokens_are_unauthorized() -> Result<()> {
    let forged = common::mint_token_with("Super Admin", MEMBER_CODE, "not-the-secret", 3600);
    let (status, _) = get_scope(&forged).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = common::mint_token_with("User", MEMBER_CODE, common::JWT_SECRET, -3600);
    let (status, _) = get_scope(&expired).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn node_creation_outside_scope_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let resp = reqwest::Client::new()
        .post(server.url("/api/nodes"))
        .bearer_auth(common::mint_token("Regional Admin", MEMBER_CODE))
        .json(&serde_json::json!({ "parent_code": "DCL-234-LA", "name": "Ikeja" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn low_score_cannot_create_serials() -> Result<()> {
    let server = common::ensure_server().await?;
    let resp = reqwest::Client::new()
        .post(server.url("/api/nodes"))
        .bearer_auth(common::mint_token("Usher", MEMBER_CODE))
        .json(&serde_json::json!({ "parent_code": "DCL-234-KW-ILR-ILE", "name": "Sango" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}
