//! Account login and registration.

use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// An account the player signed in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct AuthenticatedUser {
    user_id: String,
    username: String,
}

/// Authentication failure.
#[derive(Debug, Display, Error, From)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[display("Invalid username or password")]
    #[from(ignore)]
    InvalidCredentials,
    /// Registration with a name that already exists.
    #[display("Username '{}' is already taken", username)]
    #[from(ignore)]
    UsernameTaken {
        /// The rejected username.
        username: String,
    },
    /// The request never produced a usable response.
    #[display("Authentication request failed: {}", _0)]
    Transport(reqwest::Error),
    /// The service answered with a status this client does not handle.
    #[display("Authentication service returned status {}", status)]
    #[from(ignore)]
    Unexpected {
        /// HTTP status code.
        status: u16,
    },
}

/// Signs players in to accounts.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Signs in with existing credentials.
    async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Creates an account and signs in to it.
    async fn register(&self, username: &str, password: &str)
    -> Result<AuthenticatedUser, AuthError>;
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Authenticator backed by an HTTP account service.
///
/// Posts `{"username", "password"}` to `{base}/auth/login` or
/// `{base}/auth/register` and expects `{"user_id", "username"}` back.
#[derive(Debug, Clone)]
pub struct RemoteAuthenticator {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteAuthenticator {
    /// Creates an authenticator against `base_url`.
    #[instrument]
    pub fn new(base_url: &str) -> Self {
        info!("Creating RemoteAuthenticator");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .client
            .post(format!("{}/auth/{}", self.base_url, path))
            .json(&Credentials { username, password })
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Authenticator for RemoteAuthenticator {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let response = self.post("login", username, password).await?;
        match response.status() {
            status if status.is_success() => {
                let user = response.json::<AuthenticatedUser>().await?;
                info!(user_id = %user.user_id, "Logged in");
                Ok(user)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                warn!("Login rejected");
                Err(AuthError::InvalidCredentials)
            }
            status => Err(AuthError::Unexpected {
                status: status.as_u16(),
            }),
        }
    }

    #[instrument(skip(self, password))]
    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let response = self.post("register", username, password).await?;
        match response.status() {
            status if status.is_success() => {
                let user = response.json::<AuthenticatedUser>().await?;
                info!(user_id = %user.user_id, "Registered");
                Ok(user)
            }
            StatusCode::CONFLICT => {
                warn!("Username taken");
                Err(AuthError::UsernameTaken {
                    username: username.to_string(),
                })
            }
            status => Err(AuthError::Unexpected {
                status: status.as_u16(),
            }),
        }
    }
}
