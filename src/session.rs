use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, PasswordChange, Profile, ProfileUpdate,
    RegisterRequest, VerifyEmailRequest,
};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Connection context shared by every resource client: base URL, HTTP pool and bearer token.
#[derive(Clone)]
pub struct Session {
    base_url: Arc<str>,
    http: Client,
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self::with_token(base_url.into(), http, None)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_token(
            config.base_url.clone(),
            config.http_client()?,
            config.token.clone(),
        ))
    }

    fn with_token(base_url: String, http: Client, token: Option<String>) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            http,
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Adds `Authorization: Bearer` when a token is held.
    pub async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and turns any non-2xx answer into `ClientError::Server`.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(%status, action, "request rejected");
        Err(ClientError::server(status, body.trim_end()))
    }

    /// Exchanges credentials for a token and keeps it for later requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation("email and password are required"));
        }

        let request = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { email, password });
        let payload: LoginResponse = self.send(request, "login").await?.json().await?;
        let token = payload
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::validation("login response did not include a token"))?;
        self.set_token(token).await;
        info!(email, "logged in");
        Ok(payload.message)
    }

    /// Tells the backend to end the session; the local token is dropped either way.
    pub async fn logout(&self) -> Result<()> {
        let request = self.authorize(self.http.post(self.url("/logout"))).await;
        self.clear().await;
        self.send(request, "logout").await?;
        info!("logged out");
        Ok(())
    }

    /// Creates an unverified account. The backend mails a code for `verify_email`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation("name, email and password are required"));
        }

        let request = self.http.post(self.url("/register")).json(&RegisterRequest {
            name,
            email,
            password,
        });
        let payload: MessageResponse = self.send(request, "register").await?.json().await?;
        info!(email, "registered");
        Ok(payload.message)
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> Result<String> {
        if email.trim().is_empty() || code.trim().is_empty() {
            return Err(ClientError::validation("email and verification code are required"));
        }

        let request = self
            .http
            .post(self.url("/verify-email"))
            .json(&VerifyEmailRequest { email, code: code.trim() });
        let payload: MessageResponse = self.send(request, "verify email").await?.json().await?;
        Ok(payload.message)
    }

    pub async fn profile(&self) -> Result<Profile> {
        let request = self.authorize(self.http.get(self.url("/profile"))).await;
        Ok(self.send(request, "profile").await?.json().await?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<String> {
        if update.name.trim().is_empty() || update.email.trim().is_empty() {
            return Err(ClientError::validation("name and email are required"));
        }

        let request = self.http.patch(self.url("/profile/update")).json(update);
        let request = self.authorize(request).await;
        let payload: MessageResponse = self.send(request, "update profile").await?.json().await?;
        Ok(payload.message)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<String> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(ClientError::validation("old and new password are required"));
        }

        let request = self.http.post(self.url("/profile/password")).json(&PasswordChange {
            old_password,
            new_password,
        });
        let request = self.authorize(request).await;
        let payload: MessageResponse = self.send(request, "change password").await?.json().await?;
        Ok(payload.message)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_is_shared_between_clones() {
        let session = Session::new("http://localhost:8080/", Client::new());
        let other = session.clone();
        assert!(!other.is_authenticated().await);

        session.set_token("abc").await;
        assert_eq!(other.token().await.as_deref(), Some("abc"));

        other.clear().await;
        assert!(session.token().await.is_none());
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let session = Session::new("http://localhost:8080/", Client::new());
        assert_eq!(session.url("/api/habits"), "http://localhost:8080/api/habits");
        assert_eq!(session.url("login"), "http://localhost:8080/login");
    }

    #[tokio::test]
    async fn config_token_seeds_the_session() {
        let config = ClientConfig {
            token: Some("seed".into()),
            ..ClientConfig::default()
        };
        let session = Session::from_config(&config).unwrap();
        assert_eq!(session.token().await.as_deref(), Some("seed"));
    }

    #[tokio::test]
    async fn login_requires_credentials_before_any_request() {
        let session = Session::new("http://127.0.0.1:9", Client::new());
        let err = session.login("", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn account_calls_reject_blank_input_locally() {
        let session = Session::new("http://127.0.0.1:9", Client::new());
        let blank = ProfileUpdate {
            name: " ".into(),
            email: "a@b.c".into(),
        };
        for err in [
            session.register("Ann", "", "pw").await.unwrap_err(),
            session.verify_email("a@b.c", "  ").await.unwrap_err(),
            session.update_profile(&blank).await.unwrap_err(),
            session.change_password("old", "").await.unwrap_err(),
        ] {
            assert!(matches!(err, ClientError::Validation(_)), "{err}");
        }
    }
}
