//! End-to-end tests over the router with the in-memory repository

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use platform::password::ClearTextPassword;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::config::{AuthenticationClass, LoginConfig};
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::value_object::login_field::LoginField;
use crate::infra::memory::MemoryLoginRepository;
use crate::presentation::router::login_router_generic;

const PASSWORD: &str = "correct horse battery";

async fn setup(config: LoginConfig) -> (Router, MemoryLoginRepository, User) {
    let repo = MemoryLoginRepository::new();
    let user = User::new(
        "alice",
        Some("alice@example.com"),
        ClearTextPassword::new(PASSWORD).hash(None).unwrap(),
    );
    repo.create_user(&user).await.unwrap();
    let config = LoginConfig {
        cookie_secure: false,
        ..config
    };
    (login_router_generic(repo.clone(), config), repo, user)
}

fn test_config() -> LoginConfig {
    LoginConfig {
        session_secret: [42u8; 32],
        ..Default::default()
    }
}

fn token_config() -> LoginConfig {
    LoginConfig {
        default_authentication_classes: vec![AuthenticationClass::Token],
        ..test_config()
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    post_with(uri, body, &[])
}

fn post_with(uri: &str, body: Value, headers: &[(header::HeaderName, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value, Response<()>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (parts.status, json, Response::from_parts(parts, ()))
}

/// `name=value` part of the first Set-Cookie header
fn session_cookie(response: &Response<()>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    set_cookie.split(';').next().map(str::to_owned)
}

fn login_body(login: &str) -> Value {
    json!({ "login": login, "password": PASSWORD })
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_with_username_starts_session() {
    let (app, repo, user) = setup(test_config()).await;

    let (status, body, response) = send(&app, post("/login", login_body("alice"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Login successful" }));
    let cookie = session_cookie(&response).unwrap();
    assert!(cookie.starts_with("sessionid="));
    assert_eq!(repo.session_count().await, 1);

    let stored = repo.find_user(&user.user_id).await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn test_login_fields_are_tried_in_order() {
    // Default config only knows the username field
    let (app, _, _) = setup(test_config()).await;
    let (status, body, _) = send(&app, post("/login", login_body("alice@example.com"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Login or password invalid." }));

    let config = LoginConfig {
        user_login_fields: Some(vec![LoginField::Username, LoginField::Email]),
        ..test_config()
    };
    let (app, _, _) = setup(config).await;
    for login in ["alice", "alice@example.com", "ALICE@example.com"] {
        let (status, _, _) = send(&app, post("/login", login_body(login))).await;
        assert_eq!(status, StatusCode::OK, "{login}");
    }
}

#[tokio::test]
async fn test_invalid_credentials() {
    let (app, _, _) = setup(test_config()).await;

    let cases = [
        json!({ "login": "alice", "password": "wrong" }),
        json!({ "login": "nobody", "password": PASSWORD }),
    ];
    for body in cases {
        let (status, body, response) = send(&app, post("/login", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Login or password invalid." }));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_inactive_user_cannot_login() {
    let repo = MemoryLoginRepository::new();
    let mut user = User::new("bob", None, ClearTextPassword::new(PASSWORD).hash(None).unwrap());
    user.deactivate();
    repo.create_user(&user).await.unwrap();
    let app = login_router_generic(repo, test_config());

    let (status, _, _) = send(&app, post("/login", login_body("bob"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_validation_errors() {
    let (app, _, _) = setup(test_config()).await;

    let (status, body, _) = send(&app, post("/login", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "login": ["This field is required."],
            "password": ["This field is required."],
        })
    );

    let (status, body, _) = send(
        &app,
        post("/login", json!({ "login": " ", "password": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "login": ["This field may not be blank."],
            "password": ["This field may not be null."],
        })
    );

    let (status, body, _) = send(&app, post("/login", json!(["alice"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "non_field_errors": ["Invalid data. Expected a dictionary, but got list."] })
    );
}

#[tokio::test]
async fn test_malformed_body() {
    let (app, _, _) = setup(test_config()).await;

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"login\":"))
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("JSON parse error")
    );

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("login=alice"))
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_login_only_accepts_post() {
    let (app, _, _) = setup(test_config()).await;
    let req = Request::builder()
        .method("GET")
        .uri("/login")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_out_of_range_session_lifetime_fails_cleanly() {
    for secs in [9_000_000_000_000_000, u64::MAX] {
        let config = LoginConfig {
            session_ttl: std::time::Duration::from_secs(secs),
            ..test_config()
        };
        let (app, repo, _) = setup(config).await;

        let (status, _, response) = send(&app, post("/login", login_body("alice"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{secs}");
        assert!(session_cookie(&response).is_none());
        assert_eq!(repo.session_count().await, 0);
    }
}

#[tokio::test]
async fn test_login_rotates_existing_session() {
    let (app, repo, _) = setup(test_config()).await;

    let (_, _, first) = send(&app, post("/login", login_body("alice"))).await;
    let first_cookie = session_cookie(&first).unwrap();

    let (status, _, second) = send(
        &app,
        post_with("/login", login_body("alice"), &[(header::COOKIE, first_cookie.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_cookie = session_cookie(&second).unwrap();

    assert_ne!(first_cookie, second_cookie);
    assert_eq!(repo.session_count().await, 1);

    // The rotated-out cookie no longer authenticates
    let (status, _, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::COOKIE, first_cookie.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_token_issuance_is_idempotent() {
    let (app, _, _) = setup(token_config()).await;

    let (status, first, response) = send(&app, post("/login", login_body("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "Login successful");
    assert_eq!(first["token"].as_str().unwrap().len(), 40);
    // Sessions follow the registered classes, and Session is not one of them
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let (_, second, _) = send(&app, post("/login", login_body("alice"))).await;
    assert_eq!(first["token"], second["token"]);
}

#[tokio::test]
async fn test_revoke_token_then_login_issues_new_one() {
    let (app, repo, user) = setup(token_config()).await;

    let (_, body, _) = send(&app, post("/login", login_body("alice"))).await;
    let key = body["token"].as_str().unwrap().to_string();
    let auth = format!("Token {key}");

    let (status, body, _) = send(
        &app,
        post_with(
            "/logout",
            json!({ "revoke_token": true }),
            &[(header::AUTHORIZATION, auth.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Logout successful" }));
    assert!(!repo.delete_token_for_user(&user.user_id).await.unwrap());

    // Revoked key no longer authenticates
    let (status, body, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, auth.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Invalid token." }));

    let (_, body, _) = send(&app, post("/login", login_body("alice"))).await;
    assert_ne!(body["token"].as_str().unwrap(), key);
}

#[tokio::test]
async fn test_logout_without_revoke_keeps_token() {
    let (app, _, _) = setup(token_config()).await;

    let (_, body, _) = send(&app, post("/login", login_body("alice"))).await;
    let auth = format!("Token {}", body["token"].as_str().unwrap());

    for _ in 0..2 {
        let (status, _, _) = send(
            &app,
            post_with("/logout", json!({}), &[(header::AUTHORIZATION, auth.as_str())]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_revoke_non_existent_token() {
    let config = LoginConfig {
        default_authentication_classes: vec![AuthenticationClass::Basic],
        login_retrieve_token: Some(true),
        ..test_config()
    };
    let (app, _, _) = setup(config).await;

    // alice never logged in, so no token exists
    let basic = format!(
        "Basic {}",
        platform::crypto::to_base64(format!("alice:{PASSWORD}").as_bytes())
    );
    let (status, body, _) = send(
        &app,
        post_with(
            "/logout",
            json!({ "revoke_token": true }),
            &[(header::AUTHORIZATION, basic.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Cannot remove non-existent token" }));
}

#[tokio::test]
async fn test_failed_revoke_still_clears_session_cookie() {
    let config = LoginConfig {
        default_authentication_classes: vec![AuthenticationClass::Session, AuthenticationClass::Token],
        ..test_config()
    };
    let (app, repo, user) = setup(config).await;

    let (_, body, response) = send(&app, post("/login", login_body("alice"))).await;
    assert!(body["token"].is_string());
    let cookie = session_cookie(&response).unwrap();
    assert!(repo.delete_token_for_user(&user.user_id).await.unwrap());

    let (status, body, response) = send(
        &app,
        post_with(
            "/logout",
            json!({ "revoke_token": true }),
            &[(header::COOKIE, cookie.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Cannot remove non-existent token" }));
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("sessionid=\"\""));
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(repo.session_count().await, 0);
}

#[tokio::test]
async fn test_revoke_flag_ignored_when_tokens_disabled() {
    let (app, _, _) = setup(test_config()).await;

    let (_, _, response) = send(&app, post("/login", login_body("alice"))).await;
    let cookie = session_cookie(&response).unwrap();

    let (status, _, _) = send(
        &app,
        post_with(
            "/logout",
            json!({ "revoke_token": true }),
            &[(header::COOKIE, cookie.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Logout and request authentication
// ============================================================================

#[tokio::test]
async fn test_session_logout_ends_session() {
    let (app, repo, _) = setup(test_config()).await;

    let (_, _, response) = send(&app, post("/login", login_body("alice"))).await;
    let cookie = session_cookie(&response).unwrap();

    let (status, body, response) = send(
        &app,
        post_with("/logout", json!({}), &[(header::COOKIE, cookie.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Logout successful" }));
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("sessionid=\"\""));
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(repo.session_count().await, 0);

    let (status, _, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::COOKIE, cookie.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_accepts_empty_body() {
    let (app, _, _) = setup(test_config()).await;
    let (_, _, response) = send(&app, post("/login", login_body("alice"))).await;
    let cookie = session_cookie(&response).unwrap();

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_validation_error() {
    let (app, _, _) = setup(test_config()).await;
    let (_, _, response) = send(&app, post("/login", login_body("alice"))).await;
    let cookie = session_cookie(&response).unwrap();

    let (status, body, _) = send(
        &app,
        post_with(
            "/logout",
            json!({ "revoke_token": "perhaps" }),
            &[(header::COOKIE, cookie.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "revoke_token": ["Must be a valid boolean."] }));
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    // Session first: no challenge, so 403
    let (app, _, _) = setup(test_config()).await;
    let (status, body, response) = send(&app, post("/logout", json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "detail": "Authentication credentials were not provided." })
    );
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

    // Token first: 401 with a challenge
    let (app, _, _) = setup(token_config()).await;
    let (status, _, response) = send(&app, post("/logout", json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Token");
}

#[tokio::test]
async fn test_malformed_token_headers() {
    let (app, _, _) = setup(token_config()).await;

    let cases = [
        ("Token", "Invalid token header. No credentials provided."),
        (
            "Token abc def",
            "Invalid token header. Token string should not contain spaces.",
        ),
        ("Token not-a-real-key", "Invalid token."),
    ];
    for (header_value, detail) in cases {
        let (status, body, _) = send(
            &app,
            post_with("/logout", json!({}), &[(header::AUTHORIZATION, header_value)]),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{header_value}");
        assert_eq!(body, json!({ "detail": detail }));
    }
}

#[tokio::test]
async fn test_token_key_is_case_sensitive() {
    let (app, repo, user) = setup(token_config()).await;
    let (token, _) = repo.get_or_create_token(&user.user_id).await.unwrap();

    let shouted = format!("Token {}", token.key.as_str().to_ascii_uppercase());
    let (status, body, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, shouted.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Invalid token." }));

    let exact = format!("Token {}", token.key.as_str());
    let (status, _, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, exact.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_of_inactive_user_is_rejected() {
    let (app, repo, user) = setup(token_config()).await;
    let (token, _) = repo.get_or_create_token(&user.user_id).await.unwrap();

    let mut inactive = User::new(
        "carol",
        None,
        ClearTextPassword::new(PASSWORD).hash(None).unwrap(),
    );
    inactive.deactivate();
    repo.create_user(&inactive).await.unwrap();
    let (inactive_token, _) = repo.get_or_create_token(&inactive.user_id).await.unwrap();

    let ok = format!("Token {}", token.key.as_str());
    let (status, _, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, ok.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rejected = format!("Token {}", inactive_token.key.as_str());
    let (status, body, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, rejected.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "User inactive or deleted." }));
}

#[tokio::test]
async fn test_basic_authentication() {
    let (app, _, _) = setup(test_config()).await;

    let good = format!(
        "Basic {}",
        platform::crypto::to_base64(format!("alice:{PASSWORD}").as_bytes())
    );
    let (status, _, _) = send(
        &app,
        post_with("/logout", json!({}), &[(header::AUTHORIZATION, good.as_str())]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let bad = format!(
        "Basic {}",
        platform::crypto::to_base64(b"alice:wrong")
    );
    let cases = [
        (bad.as_str(), "Invalid username/password."),
        (
            "Basic %%%",
            "Invalid basic header. Credentials not correctly base64 encoded.",
        ),
    ];
    for (header_value, detail) in cases {
        let (status, body, _) = send(
            &app,
            post_with("/logout", json!({}), &[(header::AUTHORIZATION, header_value)]),
        )
        .await;
        // Session is the first class, so no challenge
        assert_eq!(status, StatusCode::FORBIDDEN, "{header_value}");
        assert_eq!(body, json!({ "detail": detail }));
    }
}

#[tokio::test]
async fn test_unknown_scheme_is_not_authenticated() {
    let (app, _, _) = setup(token_config()).await;
    let (status, body, _) = send(
        &app,
        post_with(
            "/logout",
            json!({}),
            &[(header::AUTHORIZATION, "Bearer something")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "detail": "Authentication credentials were not provided." })
    );
}

// ============================================================================
// Configuration overrides
// ============================================================================

#[tokio::test]
async fn test_overrides_win_over_registered_classes() {
    let config = LoginConfig {
        login_authenticate_session: Some(false),
        login_retrieve_token: Some(true),
        ..test_config()
    };
    let (app, repo, _) = setup(config).await;

    let (status, body, response) = send(&app, post("/login", login_body("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(repo.session_count().await, 0);

    let config = LoginConfig {
        login_retrieve_token: Some(false),
        login_authenticate_session: Some(true),
        ..token_config()
    };
    let (app, repo, _) = setup(config).await;

    let (status, body, response) = send(&app, post("/login", login_body("alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("token").is_none());
    assert!(session_cookie(&response).is_some());
    assert_eq!(repo.session_count().await, 1);
}
