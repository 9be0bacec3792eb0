mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use faith_community_api::auth::{token, Role};
use faith_community_api::config::config;
use faith_community_api::database::models::{email_change, password_reset};
use sqlx::MySqlPool;
use tokio::task::JoinSet;

const VERIFY_URI: &str = "/api/admin/email-change/verify";

async fn pending_change(pool: &MySqlPool, admin_id: i64, otp: &str) -> Result<i64> {
    Ok(email_change::insert(
        pool,
        Role::Admin,
        admin_id,
        "new-admin@fcs.test",
        &token::hash_token(otp),
        Utc::now() + Duration::minutes(10),
    )
    .await?)
}

async fn attempts(pool: &MySqlPool, id: i64) -> Result<i32> {
    Ok(sqlx::query_scalar("SELECT attempts FROM email_change_requests WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?)
}

#[sqlx::test(migrations = "./migrations")]
async fn email_change_locks_after_max_attempts(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let request_id = pending_change(&pool, seeded.admin_id, "482913").await?;
    let max_attempts = config().tokens.otp_max_attempts;

    for _ in 0..max_attempts {
        let res = common::call(&app, Method::POST, VERIFY_URI, Some(&seeded.admin_token), Some(r#"{"otp":"000000"}"#)).await?;
        common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    }

    // Even the right code is refused once the request is locked
    let res = common::call(&app, Method::POST, VERIFY_URI, Some(&seeded.admin_token), Some(r#"{"otp":"482913"}"#)).await?;
    common::assert_error(&res, StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_REQUESTS");
    assert_eq!(attempts(&pool, request_id).await?, max_attempts);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn parallel_wrong_codes_never_exceed_the_cap(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let request_id = pending_change(&pool, seeded.admin_id, "482913").await?;
    let max_attempts = config().tokens.otp_max_attempts;
    let callers = max_attempts * 3;

    let mut set = JoinSet::new();
    for _ in 0..callers {
        let app = app.clone();
        let token = seeded.admin_token.clone();
        set.spawn(async move {
            common::call(&app, Method::POST, VERIFY_URI, Some(&token), Some(r#"{"otp":"000000"}"#)).await
        });
    }

    let mut rejected = 0;
    let mut locked = 0;
    while let Some(joined) = set.join_next().await {
        match joined??.status {
            StatusCode::BAD_REQUEST => rejected += 1,
            StatusCode::TOO_MANY_REQUESTS => locked += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(rejected, max_attempts);
    assert_eq!(locked, callers - max_attempts);
    assert_eq!(attempts(&pool, request_id).await?, max_attempts);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn correct_code_changes_the_email(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    pending_change(&pool, seeded.admin_id, "482913").await?;

    let res = common::call(&app, Method::POST, VERIFY_URI, Some(&seeded.admin_token), Some(r#"{"otp":"482913"}"#)).await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["data"]["user"]["email"], "new-admin@fcs.test");

    let email: String = sqlx::query_scalar("SELECT email FROM admins WHERE id = ?")
        .bind(seeded.admin_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(email, "new-admin@fcs.test");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn reset_link_for_a_deleted_account_fails(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let seeded = common::seed(&pool).await?;
    let raw_token = token::generate_token();
    let token_hash = token::hash_token(&raw_token);
    password_reset::insert(&pool, Role::Admin, seeded.admin_id, &token_hash, Utc::now() + Duration::minutes(30)).await?;

    sqlx::query("DELETE FROM admins WHERE id = ?")
        .bind(seeded.admin_id)
        .execute(&pool)
        .await?;

    let body = format!(r#"{{"token":"{}","new_password":"fresh-pass42"}}"#, raw_token);
    let res = common::call(&app, Method::POST, "/auth/password/reset", None, Some(&body)).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");

    let reset = password_reset::find_by_hash(&pool, &token_hash).await?.expect("reset row kept");
    assert!(reset.used_at.is_none());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_and_wrong_password_logins_look_the_same(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    common::seed(&pool).await?;

    let res = common::call(
        &app,
        Method::POST,
        "/auth/admin/login",
        None,
        Some(r#"{"email":"nobody@fcs.test","password":"community2024"}"#),
    )
    .await?;
    common::assert_error(&res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    let unknown = res.body["error"].clone();

    let res = common::call(
        &app,
        Method::POST,
        "/auth/admin/login",
        None,
        Some(r#"{"email":"admin@fcs.test","password":"wrong-pass1"}"#),
    )
    .await?;
    common::assert_error(&res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    assert_eq!(res.body["error"], unknown);

    let res = common::call(
        &app,
        Method::POST,
        "/auth/superadmin/login",
        None,
        Some(r#"{"username_or_email":"ghost","password":"community2024"}"#),
    )
    .await?;
    common::assert_error(&res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED");

    let res = common::call(
        &app,
        Method::POST,
        "/auth/admin/login",
        None,
        Some(&format!(r#"{{"email":"admin@fcs.test","password":"{}"}}"#, common::SEEDED_PASSWORD)),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    Ok(())
}
