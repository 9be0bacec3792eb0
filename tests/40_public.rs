mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn subscribe_rejects_invalid_email() -> Result<()> {
    let res = common::post_json("/subscribe", r#"{"email":"not-an-email"}"#).await?;

    common::assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn confirm_rejects_malformed_token() -> Result<()> {
    let res = common::get("/subscribe/confirm?token=abc", None).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn confirm_without_token_is_bad_request() -> Result<()> {
    let res = common::get("/subscribe/confirm", None).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn unsubscribe_with_malformed_token_is_not_found() -> Result<()> {
    let res = common::get("/subscribe/unsubscribe?token=zzz", None).await?;
    common::assert_error(&res, StatusCode::NOT_FOUND, "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn volunteer_application_requires_name() -> Result<()> {
    let res = common::post_json(
        "/programs/5/volunteers",
        r#"{"full_name":"   ","email":"helper@example.com"}"#,
    )
    .await?;

    common::assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["full_name"].is_string());
    Ok(())
}

#[tokio::test]
async fn volunteer_application_requires_valid_email() -> Result<()> {
    let res = common::post_json(
        "/programs/5/volunteers",
        r#"{"full_name":"Ana Cruz","email":"ana@"}"#,
    )
    .await?;

    common::assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["email"].is_string());
    Ok(())
}
