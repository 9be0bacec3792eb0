mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let res = common::get("/", None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["name"], "FAITH CommUNITY API");
    assert!(res.body["data"]["endpoints"]["admin"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let res = common::get("/health", None).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["data"]["status"], "degraded");
    assert_eq!(res.body["data"]["database"], "unavailable");
    Ok(())
}
