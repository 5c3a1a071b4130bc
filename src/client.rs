use crate::errors::{ClientError, Result};
use crate::models::{Identifier, ResourceItem};
use crate::resource::{IdScheme, ResourceKind};
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

/// List query as sent to the backend. `page` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: String,
    pub sort: String,
    pub page: u32,
}

/// CRUD surface of one backend resource.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Field that identifies items for update and delete.
    fn id_field(&self) -> &str;

    async fn list(&self, query: &ListQuery) -> Result<Vec<ResourceItem>>;

    async fn create(&self, item: &ResourceItem) -> Result<ResourceItem>;

    async fn update(&self, id: &Identifier, patch: &ResourceItem) -> Result<()>;

    async fn delete(&self, id: &Identifier) -> Result<()>;

    /// Removes every item of the resource. Most resources have no such endpoint.
    async fn delete_all(&self) -> Result<()> {
        Err(ClientError::validation("this resource cannot be cleared in one request"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Path segment under `/api`.
    pub path: String,
    /// Field read from listed items to identify them.
    pub id_field: String,
    /// Query key that addresses an item on DELETE.
    pub request_id_field: String,
    pub update_id_field: String,
    pub requires_auth: bool,
    pub supports_delete_all: bool,
}

impl ResourceConfig {
    pub fn for_kind(kind: ResourceKind, scheme: IdScheme) -> Self {
        Self {
            path: kind.path().to_string(),
            id_field: kind.id_field(scheme).to_string(),
            request_id_field: kind.request_id_field(scheme).to_string(),
            update_id_field: kind.update_id_field(scheme).to_string(),
            requires_auth: kind.requires_auth(),
            supports_delete_all: kind.supports_delete_all(),
        }
    }
}

/// HTTP client for `/api/{path}`.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    session: Session,
    config: ResourceConfig,
    endpoint: String,
}

impl ResourceClient {
    pub fn new(session: Session, config: ResourceConfig) -> Self {
        let endpoint = session.url(&format!("/api/{}", config.path));
        Self {
            session,
            config,
            endpoint,
        }
    }

    pub fn for_kind(session: Session, kind: ResourceKind, scheme: IdScheme) -> Self {
        Self::new(session, ResourceConfig::for_kind(kind, scheme))
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = if self.config.requires_auth {
            self.session.authorize(request).await
        } else {
            request
        };

        let response = request.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(resource = %self.config.path, %status, "request rejected");
        Err(ClientError::server(status, body.trim_end()))
    }
}

#[async_trait]
impl ResourceApi for ResourceClient {
    fn id_field(&self) -> &str {
        &self.config.id_field
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<ResourceItem>> {
        debug!(resource = %self.config.path, ?query, "list");
        let page = query.page.to_string();
        let request = self.session.http().get(&self.endpoint).query(&[
            ("filter", query.filter.as_str()),
            ("sort", query.sort.as_str()),
            ("page", page.as_str()),
        ]);

        let response = self.send(request).await?;
        let items: Option<Vec<ResourceItem>> = response.json().await?;
        Ok(items.unwrap_or_default())
    }

    async fn create(&self, item: &ResourceItem) -> Result<ResourceItem> {
        debug!(resource = %self.config.path, "create");
        let request = self.session.http().post(&self.endpoint).json(item);
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: &Identifier, patch: &ResourceItem) -> Result<()> {
        debug!(resource = %self.config.path, %id, "update");
        let mut body = patch.clone();
        body.insert(self.config.update_id_field.clone(), id.to_value());
        let request = self.session.http().put(&self.endpoint).json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: &Identifier) -> Result<()> {
        debug!(resource = %self.config.path, %id, "delete");
        let value = match id.to_value() {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let request = self
            .session
            .http()
            .delete(&self.endpoint)
            .query(&[(self.config.request_id_field.as_str(), value.as_str())]);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        if !self.config.supports_delete_all {
            return Err(ClientError::validation(format!(
                "{} cannot be cleared in one request",
                self.config.path
            )));
        }
        debug!(resource = %self.config.path, "delete all");
        let url = format!("{}/deleteAll", self.endpoint);
        self.send(self.session.http().delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn endpoint_follows_resource_path() {
        let session = Session::new("http://localhost:8080", Client::new());
        let client = ResourceClient::for_kind(session, ResourceKind::Achievement, IdScheme::NaturalKey);
        assert_eq!(client.endpoint(), "http://localhost:8080/api/achievements");
        assert_eq!(client.id_field(), "title");
        assert_eq!(client.config().update_id_field, "oldTitle");
        assert!(!client.config().requires_auth);
    }

    #[test]
    fn users_are_auth_gated() {
        let config = ResourceConfig::for_kind(ResourceKind::User, IdScheme::ServerId);
        assert!(config.requires_auth);
        assert_eq!(config.id_field, "user_id");
        assert_eq!(config.request_id_field, "id");
        assert_eq!(config.update_id_field, "id");
    }

    #[tokio::test]
    async fn delete_all_is_refused_before_sending_for_other_resources() {
        let session = Session::new("http://127.0.0.1:9", Client::new());
        let client = ResourceClient::for_kind(session, ResourceKind::Habit, IdScheme::ServerId);
        let err = client.delete_all().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)), "{err}");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Port 9 (discard) is closed on test hosts.
        let session = Session::new("http://127.0.0.1:9", Client::new());
        let client = ResourceClient::for_kind(session, ResourceKind::Habit, IdScheme::ServerId);
        let query = ListQuery {
            filter: String::new(),
            sort: String::new(),
            page: 1,
        };
        let err = client.list(&query).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)), "{err}");
    }
}
