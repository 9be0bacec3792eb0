mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn admin_token_cannot_reach_superadmin_routes() -> Result<()> {
    let token = common::admin_token();

    for uri in ["/api/superadmin/me", "/api/superadmin/submissions", "/api/superadmin/admins"] {
        let res = common::get(uri, Some(&token)).await?;
        common::assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");
    }
    Ok(())
}

#[tokio::test]
async fn admin_token_cannot_approve_submissions() -> Result<()> {
    let token = common::admin_token();
    let res = common::send_json(Method::PUT, "/api/superadmin/submissions/1/approve", Some(&token), "{}").await?;
    common::assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn superadmin_token_cannot_reach_admin_routes() -> Result<()> {
    let token = common::superadmin_token();

    let res = common::get("/api/admin/me", Some(&token)).await?;
    common::assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");
    assert_eq!(res.body["error"], "Admin access required");

    let res = common::send_json(
        Method::POST,
        "/api/admin/submissions",
        Some(&token),
        r#"{"section":"program","proposed_data":{"title":"x"}}"#,
    )
    .await?;
    common::assert_error(&res, StatusCode::FORBIDDEN, "FORBIDDEN");
    Ok(())
}
