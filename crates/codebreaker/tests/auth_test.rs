//! Remote authenticator against a mock account service.

use mockito::{Matcher, Server};
use serde_json::json;

use codebreaker::{AuthError, AuthenticatedUser, Authenticator, RemoteAuthenticator};

#[tokio::test]
async fn test_login_returns_user() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({ "username": "ada", "password": "secret" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "user_id": "42", "username": "ada" }).to_string())
        .create_async()
        .await;

    let user = RemoteAuthenticator::new(&server.url())
        .login("ada", "secret")
        .await
        .expect("login");

    assert_eq!(user, AuthenticatedUser::new("42".to_string(), "ada".to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_rejected_is_invalid_credentials() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .create_async()
        .await;

    let err = RemoteAuthenticator::new(&server.url())
        .login("ada", "wrong")
        .await
        .expect_err("should fail");

    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_register_conflict_is_username_taken() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/register")
        .with_status(409)
        .create_async()
        .await;

    let err = RemoteAuthenticator::new(&server.url())
        .register("ada", "secret")
        .await
        .expect_err("should fail");

    assert!(matches!(err, AuthError::UsernameTaken { ref username } if username == "ada"));
}

#[tokio::test]
async fn test_register_success() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/register")
        .with_status(201)
        .with_body(json!({ "user_id": "9", "username": "grace" }).to_string())
        .create_async()
        .await;

    let user = RemoteAuthenticator::new(&server.url())
        .register("grace", "pw")
        .await
        .expect("register");

    assert_eq!(user.user_id(), "9");
    assert_eq!(user.username(), "grace");
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let err = RemoteAuthenticator::new("http://127.0.0.1:9")
        .login("ada", "secret")
        .await
        .expect_err("should fail");

    assert!(matches!(err, AuthError::Transport(_)));
}
