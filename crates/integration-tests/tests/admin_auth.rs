//! Admin login, sessions and password rotation.

use axum::http::StatusCode;
use chrono::TimeDelta;
use okami_integration_tests::{ADMIN_PASSWORD, TestApp};
use serde_json::json;
use testresult::TestResult;

// =============================================================================
// Login and sessions
// =============================================================================

#[tokio::test]
async fn test_wrong_password_opens_no_session() -> TestResult {
    let app = TestApp::new(Vec::new());

    let (status, body) = app
        .call("verify_password", json!({ "password": "hunter22" }), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false }));
    assert!(app.sessions.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_null_or_missing_password_fails_login() -> TestResult {
    let app = TestApp::new(Vec::new());

    for data in [json!({ "password": null }), json!({})] {
        let (status, body) = app.call("verify_password", data, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false }));
    }
    assert!(app.sessions.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_change_password_with_null_old_password() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;

    let (status, body) = app
        .call(
            "change_password",
            json!({ "oldPassword": null, "newPassword": "brand-new-pass" }),
            Some(&token),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "incorrect old password" }));
    Ok(())
}

#[tokio::test]
async fn test_login_then_verify_token() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;

    let (status, body) = app.call("verify_token", json!({}), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true }));
    Ok(())
}

#[tokio::test]
async fn test_logout_revokes_token() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;

    let (status, body) = app.call("logout", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = app.call("verify_token", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    Ok(())
}

#[tokio::test]
async fn test_session_expires_after_a_day() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;

    app.clock.advance(TimeDelta::hours(23));
    let (status, _) = app.call("get_orders", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(TimeDelta::hours(2));
    let (status, _) = app.call("get_orders", json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.sessions.is_empty().await, "expired session was kept");
    Ok(())
}

#[tokio::test]
async fn test_made_up_token_is_rejected() -> TestResult {
    let app = TestApp::new(Vec::new());

    let (status, _) = app
        .call("get_products", json!({}), Some("bm90LWEtcmVhbC10b2tlbg=="))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_legacy_plaintext_credential_still_logs_in() -> TestResult {
    let app = TestApp::builder().credential(Some("secret")).build();

    let (_, body) = app
        .call("verify_password", json!({ "password": "secret" }), None)
        .await;

    assert_eq!(body["success"], true);
    assert!(body["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_is_internal_error() -> TestResult {
    let app = TestApp::builder().credential(None).build();

    let (status, body) = app
        .call("verify_password", json!({ "password": ADMIN_PASSWORD }), None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
    Ok(())
}

// =============================================================================
// Password rotation
// =============================================================================

#[tokio::test]
async fn test_change_password_with_wrong_old_password() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;
    let before = app.credentials.stored();

    let (status, body) = app
        .call(
            "change_password",
            json!({ "oldPassword": "not-it-at-all", "newPassword": "brand-new-pass" }),
            Some(&token),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "incorrect old password" }));
    assert_eq!(app.credentials.stored(), before);
    Ok(())
}

#[tokio::test]
async fn test_change_password_too_short() -> TestResult {
    let app = TestApp::new(Vec::new());
    let token = app.login().await;
    let before = app.credentials.stored();

    let (status, body) = app
        .call(
            "change_password",
            json!({ "oldPassword": ADMIN_PASSWORD, "newPassword": "short" }),
            Some(&token),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "new password must be at least 8 characters");
    assert_eq!(app.credentials.stored(), before);
    Ok(())
}

#[tokio::test]
async fn test_change_password_upgrades_legacy_credential() -> TestResult {
    let app = TestApp::builder().credential(Some("secret")).build();
    let (_, body) = app
        .call("verify_password", json!({ "password": "secret" }), None)
        .await;
    let token = body["token"].as_str().unwrap_or_default().to_owned();

    let (status, body) = app
        .call(
            "change_password",
            json!({ "oldPassword": "secret", "newPassword": "wolves-at-dawn" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let stored = app.credentials.stored().unwrap_or_default();
    assert_eq!(stored.matches(':').count(), 1);

    let (_, old) = app
        .call("verify_password", json!({ "password": "secret" }), None)
        .await;
    assert_eq!(old["success"], false);
    let (_, new) = app
        .call("verify_password", json!({ "password": "wolves-at-dawn" }), None)
        .await;
    assert_eq!(new["success"], true);
    Ok(())
}

#[tokio::test]
async fn test_change_password_requires_session() -> TestResult {
    let app = TestApp::new(Vec::new());
    let before = app.credentials.stored();

    let (status, _) = app
        .call(
            "change_password",
            json!({ "oldPassword": ADMIN_PASSWORD, "newPassword": "brand-new-pass" }),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.credentials.stored(), before);
    Ok(())
}
