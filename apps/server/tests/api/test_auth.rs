//! Account and session flows.

use actix_web::cookie::Cookie;
use actix_web::test;
use jobtrack_lib::auth::SESSION_COOKIE;
use jobtrack_lib::services::accounts;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_signup_sets_session_and_me_resolves_it() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;

    let (token, user_id) = signup(&app, "Ada@Example.com").await;

    // Cookie transport
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"]["id"], user_id.as_str());
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["hasPassword"], true);

    // Bearer transport
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_signup_rejects_duplicate_email() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;

    signup(&app, "dup@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Other",
            "email": "DUP@example.com",
            "password": TEST_PASSWORD,
        }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    signup(&app, "login@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "login@example.com", "password": "not-the-password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Invalid email or password")
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "login@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_invalid_token_is_unauthorized() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let (status, _) = send(&app, req).await;

    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_forgot_password_answers_the_same_for_unknown_email() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    signup(&app, "known@example.com").await;

    let mut messages = Vec::new();
    for email in ["known@example.com", "unknown@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/auth/forgot-password")
            .set_json(json!({ "email": email }))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 200);
        messages.push(body["message"].clone());
    }

    assert_eq!(messages[0], messages[1]);
}

#[actix_rt::test]
async fn test_reset_password_flow() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    signup(&app, "reset@example.com").await;

    let (_, token) =
        accounts::request_password_reset(&ctx.pool, &ctx.config.session, "reset@example.com")
            .await
            .unwrap()
            .expect("account exists");

    let req = test::TestRequest::post()
        .uri("/api/auth/verify-reset-token")
        .set_json(json!({ "token": token }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::post()
        .uri("/api/auth/reset-password")
        .set_json(json!({ "token": token, "newPassword": "a-brand-new-password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);

    // Single use
    let req = test::TestRequest::post()
        .uri("/api/auth/verify-reset-token")
        .set_json(json!({ "token": token }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 400);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "reset@example.com", "password": "a-brand-new-password" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_change_password_requires_current_password() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "change@example.com").await;

    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .insert_header(bearer(&token))
        .set_json(json!({ "currentPassword": "wrong-password", "newPassword": "another-password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "current password is incorrect");

    let req = test::TestRequest::put()
        .uri("/api/auth/password")
        .insert_header(bearer(&token))
        .set_json(json!({ "currentPassword": TEST_PASSWORD, "newPassword": "another-password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);
}

#[actix_rt::test]
async fn test_change_email_rejects_taken_address() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    signup(&app, "taken@example.com").await;
    let (token, _) = signup(&app, "mover@example.com").await;

    let req = test::TestRequest::put()
        .uri("/api/auth/email")
        .insert_header(bearer(&token))
        .set_json(json!({ "newEmail": "taken@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 400);

    let req = test::TestRequest::put()
        .uri("/api/auth/email")
        .insert_header(bearer(&token))
        .set_json(json!({ "newEmail": "moved@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["email"], "moved@example.com");
}

#[actix_rt::test]
async fn test_delete_account_removes_owned_data() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "leaver@example.com").await;

    upload_document(&app, &token, "cv", "My CV", true).await;
    let (status, _) = create_job(&app, &token, job_payload("Engineer", "Acme")).await;
    assert_eq!(status, 201);
    assert_eq!(ctx.store.len(), 1);

    let req = test::TestRequest::delete()
        .uri("/api/auth/account")
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
    assert!(ctx.store.is_empty());

    // The token still verifies but the account is gone
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "leaver@example.com", "password": TEST_PASSWORD }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);
}
