mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use faith_community_api::auth::token;
use faith_community_api::database::models::subscriber;
use sqlx::MySqlPool;

#[sqlx::test(migrations = "./migrations")]
async fn confirmed_address_cannot_subscribe_again(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let body = r#"{"email":"Ana.Cruz@Example.com"}"#;

    let res = common::call(&app, Method::POST, "/subscribe", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.body);
    assert_eq!(res.body["data"]["outcome"], "created");

    // Still pending: a second request only re-sends the link
    let res = common::call(&app, Method::POST, "/subscribe", None, Some(body)).await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["data"]["outcome"], "resent");

    let stored = subscriber::find_by_email(&pool, "ana.cruz@example.com")
        .await?
        .expect("subscriber stored under the normalized address");
    subscriber::mark_verified(&pool, stored.id).await?;

    let res = common::call(&app, Method::POST, "/subscribe", None, Some(body)).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    assert_eq!(res.body["error"], "This email is already subscribed");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_confirmation_link_is_rejected(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let raw_token = token::generate_token();
    let id = subscriber::insert(
        &pool,
        "late@example.com",
        &token::hash_token(&raw_token),
        Utc::now() - Duration::hours(1),
        &token::hash_token(&token::generate_token()),
    )
    .await?;

    let res = common::call(&app, Method::GET, &format!("/subscribe/confirm?token={}", raw_token), None, None).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");

    let stored = subscriber::find_by_email(&pool, "late@example.com").await?.expect("subscriber kept");
    assert_eq!(stored.id, id);
    assert!(!stored.is_verified);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn confirmation_link_works_once(pool: MySqlPool) -> Result<()> {
    let app = common::app_with_pool(pool.clone());
    let raw_token = token::generate_token();
    subscriber::insert(
        &pool,
        "ontime@example.com",
        &token::hash_token(&raw_token),
        Utc::now() + Duration::hours(1),
        &token::hash_token(&token::generate_token()),
    )
    .await?;
    let uri = format!("/subscribe/confirm?token={}", raw_token);

    let res = common::call(&app, Method::GET, &uri, None, None).await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert!(subscriber::find_by_email(&pool, "ontime@example.com").await?.expect("subscriber").is_verified);

    let res = common::call(&app, Method::GET, &uri, None, None).await?;
    common::assert_error(&res, StatusCode::BAD_REQUEST, "BAD_REQUEST");
    Ok(())
}
