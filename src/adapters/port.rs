use crate::adapters::{build_http_client, error_for_status, join_segments, parse_base_url};
use crate::config::PortConfig;
use crate::domain::model::{AccessToken, Blueprint, Entity};
use crate::domain::ports::Catalog;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const SERVICE: &str = "Port";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Client for the Port REST API.
pub struct PortClient {
    client: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    token: Option<AccessToken>,
}

impl PortClient {
    pub fn new(config: &PortConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: parse_base_url("PORT_BASE_URL", &config.base_url)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: None,
        })
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_ref()
            .map(|token| token.value.as_str())
            .ok_or(SyncError::NotAuthenticated { service: SERVICE })
    }
}

#[async_trait]
impl Catalog for PortClient {
    async fn authenticate(&mut self) -> Result<()> {
        let url = join_segments(&self.base_url, &["auth", "access_token"])?;
        tracing::debug!("Requesting Port access token from {}", url);

        let response = self
            .client
            .post(url)
            .json(&AccessTokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::AuthError {
                service: SERVICE,
                status,
                body,
            });
        }

        let token: AccessTokenResponse = response.json().await?;
        let token = AccessToken::new(token.access_token, token.expires_in);
        tracing::debug!("Port token obtained, expires at {:?}", token.expires_at);
        self.token = Some(token);
        Ok(())
    }

    async fn blueprint_exists(&self, identifier: &str) -> Result<bool> {
        let url = join_segments(&self.base_url, &["blueprints", identifier])?;
        let response = self.client.get(url).bearer_auth(self.bearer()?).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => {
                error_for_status(response, "get blueprint").await?;
                Ok(true)
            }
        }
    }

    async fn create_blueprint(&self, blueprint: &Blueprint) -> Result<()> {
        tracing::debug!(
            "Creating blueprint with data: {}",
            serde_json::to_string(blueprint)?
        );

        let url = join_segments(&self.base_url, &["blueprints"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.bearer()?)
            .json(blueprint)
            .send()
            .await?;

        error_for_status(response, "create blueprint").await?;
        Ok(())
    }

    async fn upsert_entity(&self, blueprint: &str, entity: &Entity) -> Result<()> {
        tracing::debug!("Upserting entity with data: {}", serde_json::to_string(entity)?);

        let url = join_segments(&self.base_url, &["blueprints", blueprint, "entities"])?;
        let response = self
            .client
            .post(url)
            .query(&[("upsert", "true"), ("merge", "true")])
            .bearer_auth(self.bearer()?)
            .json(entity)
            .send()
            .await?;

        error_for_status(response, "upsert entity").await?;
        Ok(())
    }
}
