use crate::api::traits::PropertyStore;
use crate::api::types::{BookingsEnvelope, ClientSettings, PropertyEnvelope};
use crate::error::{MutationError, RetrievalError};
use crate::models::{Booking, Page, PageToken, Property, PropertyId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Property store backed by the Rails JSON API
pub struct HttpPropertyStore {
    client: Client,
    settings: ClientSettings,
}

impl HttpPropertyStore {
    /// Create a store with default settings (localhost)
    pub fn new() -> Result<Self> {
        Self::with_settings(ClientSettings::default())
    }

    /// Create a store with custom connection settings
    pub fn with_settings(settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.settings.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, RetrievalError> {
        debug!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(RetrievalError::Transport { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
            return Err(RetrievalError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => return Err(RetrievalError::Transport { url, source }),
        };
        debug!("Downloaded {} bytes from {}", body.len(), url);

        serde_json::from_str(&body).map_err(|source| RetrievalError::Shape { url, source })
    }
}

#[async_trait]
impl PropertyStore for HttpPropertyStore {
    async fn fetch_page(&self, page: PageToken) -> Result<Page, RetrievalError> {
        self.get_json(self.url(&properties_path(page))).await
    }

    async fn fetch_bookings(&self, id: PropertyId) -> Result<Vec<Booking>, RetrievalError> {
        let envelope: BookingsEnvelope = self.get_json(self.url(&bookings_path(id))).await?;
        Ok(envelope.bookings)
    }

    async fn fetch_property(&self, id: PropertyId) -> Result<Property, RetrievalError> {
        let envelope: PropertyEnvelope = self.get_json(self.url(&property_path(id))).await?;
        Ok(envelope.property)
    }

    async fn delete_property(&self, id: PropertyId) -> Result<(), MutationError> {
        let url = self.url(&property_path(id));
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|source| MutationError::Transport { id, source })?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(MutationError::Status {
                id,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "Rails API"
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn properties_path(page: PageToken) -> String {
    format!("/api/user/properties?page={}", page)
}

fn bookings_path(id: PropertyId) -> String {
    format!("/api/properties/{}/bookings", id)
}

fn property_path(id: PropertyId) -> String {
    format!("/api/properties/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_api_routes() {
        assert_eq!(properties_path(PageToken::FIRST), "/api/user/properties?page=1");
        assert_eq!(bookings_path(PropertyId(42)), "/api/properties/42/bookings");
        assert_eq!(property_path(PropertyId(42)), "/api/properties/42");
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        assert_eq!(
            join_url("http://host:3000/", "/api/properties/1"),
            "http://host:3000/api/properties/1"
        );
    }

    #[test]
    fn store_builds_with_default_settings() {
        let store = HttpPropertyStore::new().unwrap();
        assert_eq!(store.source_name(), "Rails API");
        assert_eq!(store.url("/x"), "http://localhost:3000/x");
    }
}
