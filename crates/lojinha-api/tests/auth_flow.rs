mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ADMIN_NUMBER, TestApp};

#[tokio::test]
async fn code_login_creates_user_and_session() {
    let app = TestApp::new().await;
    let (token, user) = app.login("(11) 98765-4321").await;

    assert_eq!(user["whatsapp_number"], "5511987654321");
    assert_eq!(user["name"], "Player 4321");
    assert_eq!(user["level"], 1);
    assert_eq!(user["coins"], 0);
    assert_eq!(user["is_admin"], false);

    // The bot receives the number without the country code.
    let sent = app.inbox.auth_codes.lock().unwrap()[0].clone();
    assert_eq!(sent["whatsappNumber"], "11987654321");
    assert_eq!(sent["code"].as_str().unwrap().len(), 6);

    let (status, me) = app.call("GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user["id"]);
    assert_eq!(me["xp_for_next_level"], 100);
}

#[tokio::test]
async fn second_login_reuses_account() {
    let app = TestApp::new().await;
    let (_, first) = app.login("5511987654321").await;
    let (_, second) = app.login("11987654321").await;
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn codes_are_single_use_and_must_match() {
    let app = TestApp::new().await;
    let number = "5511987654321";
    app.call("POST", "/auth/request-code", None, Some(json!({ "whatsapp_number": number })))
        .await;
    let code = app.last_code_for(number).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let (status, body) = app
        .call("POST", "/auth/login", None, Some(json!({ "whatsapp_number": number, "code": wrong })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let login = json!({ "whatsapp_number": number, "code": code });
    let (status, _) = app.call("POST", "/auth/login", None, Some(login.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("POST", "/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = TestApp::new().await;
    let (token, _) = app.login("5511987654321").await;

    let (status, _) = app.call("POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call("GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_garbage_token_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app.call("GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call("GET", "/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn undelivered_code_reports_not_sent() {
    let app = TestApp::without_bot();
    let (status, body) = app
        .call(
            "POST",
            "/auth/request-code",
            None,
            Some(json!({ "whatsapp_number": "5511987654321" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], false);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn invalid_number_is_bad_request() {
    let app = TestApp::new().await;
    let (status, _) = app
        .call("POST", "/auth/request-code", None, Some(json!({ "whatsapp_number": "123" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn configured_number_becomes_admin() {
    let app = TestApp::new().await;
    let (admin_token, admin) = app.login(ADMIN_NUMBER).await;
    assert_eq!(admin["is_admin"], true);

    let (user_token, _) = app.login("5511987654321").await;
    let (status, _) = app.call("GET", "/admin/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = app.call("GET", "/admin/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn banned_user_is_locked_out() {
    let app = TestApp::new().await;
    let (admin_token, _) = app.login(ADMIN_NUMBER).await;
    let (user_token, user) = app.login("5511987654321").await;
    let user_id = user["id"].as_str().unwrap();

    let (status, body) = app
        .call("POST", &format!("/admin/users/{user_id}/ban"), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_banned"], true);

    let (status, _) = app.call("GET", "/me", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A fresh login is refused too.
    app.call(
        "POST",
        "/auth/request-code",
        None,
        Some(json!({ "whatsapp_number": "5511987654321" })),
    )
    .await;
    let code = app.last_code_for("5511987654321").unwrap();
    let (status, _) = app
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "whatsapp_number": "5511987654321", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_update_validates_name() {
    let app = TestApp::new().await;
    let (token, _) = app.login("5511987654321").await;

    let (status, body) = app
        .call(
            "PATCH",
            "/me",
            Some(&token),
            Some(json!({ "name": "  Ana Clara  ", "avatar_url": "https://img.example/ana.png" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana Clara");
    assert_eq!(body["avatar_url"], "https://img.example/ana.png");

    let (status, _) = app
        .call("PATCH", "/me", Some(&token), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(31);
    let (status, _) = app
        .call("PATCH", "/me", Some(&token), Some(json!({ "name": long })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_login_body_gets_json_error() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call("POST", "/auth/login", None, Some(json!({ "whatsapp_number": "5511987654321" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("code"), "{body}");
}
