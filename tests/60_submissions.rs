mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::json;
use sqlx::MySqlPool;

async fn program_title(pool: &MySqlPool, id: i64) -> Result<String> {
    Ok(sqlx::query_scalar("SELECT title FROM programs WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?)
}

/// Submit a program change as the seeded admin and return the submission id
async fn propose(app: &Router, token: &str, body: serde_json::Value) -> Result<i64> {
    let res = common::call(app, Method::POST, "/api/admin/submissions", Some(token), Some(&body.to_string())).await?;
    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.body);
    assert_eq!(res.body["data"]["status"], "pending");
    Ok(res.body["data"]["id"].as_i64().expect("submission id"))
}

#[sqlx::test(migrations = "./migrations")]
async fn approving_applies_the_change_once(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let program_id = common::seed_program(&pool, seeded.organization_id, "Feeding Day").await?;

    let id = propose(
        &app,
        &seeded.admin_token,
        json!({ "section": "program", "record_id": program_id, "proposed_data": { "title": "Feeding Week" } }),
    )
    .await?;
    let uri = format!("/api/superadmin/submissions/{}/approve", id);

    let res = common::call(&app, Method::PUT, &uri, Some(&seeded.superadmin_token), None).await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["data"]["status"], "approved");
    assert_eq!(res.body["data"]["reviewed_by"], seeded.superadmin_id);
    assert_eq!(program_title(&pool, program_id).await?, "Feeding Week");

    let res = common::call(&app, Method::PUT, &uri, Some(&seeded.superadmin_token), None).await?;
    common::assert_error(&res, StatusCode::CONFLICT, "CONFLICT");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn approving_a_new_program_creates_it(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;

    let id = propose(
        &app,
        &seeded.admin_token,
        json!({ "section": "program", "proposed_data": { "title": "Coastal Cleanup", "status": "upcoming" } }),
    )
    .await?;

    let res = common::call(
        &app,
        Method::PUT,
        &format!("/api/superadmin/submissions/{}/approve", id),
        Some(&seeded.superadmin_token),
        None,
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);

    let record_id = res.body["data"]["record_id"].as_i64().expect("record id set on approval");
    assert_eq!(program_title(&pool, record_id).await?, "Coastal Cleanup");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn approving_after_the_record_changed_is_a_conflict(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let program_id = common::seed_program(&pool, seeded.organization_id, "Feeding Day").await?;

    let id = propose(
        &app,
        &seeded.admin_token,
        json!({ "section": "program", "record_id": program_id, "proposed_data": { "title": "Feeding Week" } }),
    )
    .await?;

    sqlx::query("UPDATE programs SET title = 'Feeding Month' WHERE id = ?")
        .bind(program_id)
        .execute(&pool)
        .await?;

    let res = common::call(
        &app,
        Method::PUT,
        &format!("/api/superadmin/submissions/{}/approve", id),
        Some(&seeded.superadmin_token),
        None,
    )
    .await?;
    common::assert_error(&res, StatusCode::CONFLICT, "CONFLICT");
    assert_eq!(program_title(&pool, program_id).await?, "Feeding Month");

    let res = common::call(
        &app,
        Method::GET,
        &format!("/api/superadmin/submissions/{}", id),
        Some(&seeded.superadmin_token),
        None,
    )
    .await?;
    assert_eq!(res.body["data"]["status"], "pending");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn clearing_program_status_is_rejected_before_review(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let program_id = common::seed_program(&pool, seeded.organization_id, "Feeding Day").await?;

    let body = json!({ "section": "program", "record_id": program_id, "proposed_data": { "status": "" } });
    let res = common::call(
        &app,
        Method::POST,
        "/api/admin/submissions",
        Some(&seeded.admin_token),
        Some(&body.to_string()),
    )
    .await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["status"].is_string());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn rejecting_needs_remarks_and_closes_the_submission(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let program_id = common::seed_program(&pool, seeded.organization_id, "Feeding Day").await?;

    let id = propose(
        &app,
        &seeded.admin_token,
        json!({ "section": "program", "record_id": program_id, "proposed_data": { "title": "Feeding Week" } }),
    )
    .await?;
    let uri = format!("/api/superadmin/submissions/{}/reject", id);

    let res = common::call(&app, Method::PUT, &uri, Some(&seeded.superadmin_token), Some(r#"{"remarks":"  "}"#)).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["remarks"].is_string());

    let res = common::call(
        &app,
        Method::PUT,
        &uri,
        Some(&seeded.superadmin_token),
        Some(r#"{"remarks":"Title is too long for the banner"}"#),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["data"]["status"], "rejected");
    assert_eq!(res.body["data"]["remarks"], "Title is too long for the banner");
    assert_eq!(program_title(&pool, program_id).await?, "Feeding Day");

    // A closed submission can no longer be withdrawn
    let res = common::call(
        &app,
        Method::PUT,
        &format!("/api/admin/submissions/{}/cancel", id),
        Some(&seeded.admin_token),
        None,
    )
    .await?;
    common::assert_error(&res, StatusCode::CONFLICT, "CONFLICT");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn only_the_owning_organization_can_cancel(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let outsider = common::seed_other_admin(&pool).await?;
    let program_id = common::seed_program(&pool, seeded.organization_id, "Feeding Day").await?;

    let id = propose(
        &app,
        &seeded.admin_token,
        json!({ "section": "program", "record_id": program_id, "proposed_data": { "category": "Outreach" } }),
    )
    .await?;
    let uri = format!("/api/admin/submissions/{}/cancel", id);

    let res = common::call(&app, Method::PUT, &uri, Some(&outsider), None).await?;
    common::assert_error(&res, StatusCode::NOT_FOUND, "NOT_FOUND");

    let res = common::call(&app, Method::PUT, &uri, Some(&seeded.admin_token), None).await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["data"]["status"], "cancelled");

    let res = common::call(&app, Method::PUT, &uri, Some(&seeded.admin_token), None).await?;
    common::assert_error(&res, StatusCode::CONFLICT, "CONFLICT");

    let res = common::call(
        &app,
        Method::PUT,
        &format!("/api/superadmin/submissions/{}/approve", id),
        Some(&seeded.superadmin_token),
        None,
    )
    .await?;
    common::assert_error(&res, StatusCode::CONFLICT, "CONFLICT");
    Ok(())
}
