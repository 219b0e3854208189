//! Integration tests for account state and bearer tokens.
//!
//! These tests require a `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use routeclouds_api::services::{AuthError, AuthService};
use routeclouds_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_token_resolves_to_active_user() {
    let ctx = TestContext::new().await;
    let (user, token) = ctx.account().await;

    let resolved = AuthService::new(&ctx.pool, &ctx.tokens)
        .resolve_bearer(&token)
        .await
        .unwrap();
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_deactivated_user_is_locked_out() {
    let ctx = TestContext::new().await;
    let (user, token) = ctx.account().await;
    let auth = AuthService::new(&ctx.pool, &ctx.tokens);

    sqlx::query("UPDATE shop.users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    assert!(matches!(
        auth.resolve_bearer(&token).await,
        Err(AuthError::InactiveUser)
    ));
    assert!(matches!(
        auth.login(user.username.as_str(), "correct horse").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login(user.email.as_str(), "correct horse").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_token_for_deleted_user_is_rejected() {
    let ctx = TestContext::new().await;
    let (user, token) = ctx.account().await;

    sqlx::query("DELETE FROM shop.users WHERE id = $1")
        .bind(user.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    assert!(matches!(
        AuthService::new(&ctx.pool, &ctx.tokens)
            .resolve_bearer(&token)
            .await,
        Err(AuthError::InactiveUser)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_wrong_password() {
    let ctx = TestContext::new().await;
    let (user, _) = ctx.account().await;

    assert!(matches!(
        AuthService::new(&ctx.pool, &ctx.tokens)
            .login(user.username.as_str(), "wrong horse")
            .await,
        Err(AuthError::InvalidCredentials)
    ));
}
