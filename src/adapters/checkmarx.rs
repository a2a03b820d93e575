use crate::adapters::{build_http_client, error_for_status, join_segments, parse_base_url};
use crate::config::CheckmarxConfig;
use crate::domain::model::{AccessToken, Project, ProjectPage};
use crate::domain::ports::ProjectSource;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "Checkmarx";
const IAM_CLIENT_ID: &str = "ast-app";
const PROJECTS_ACCEPT: &str = "application/json; version=1.0";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Client for the Checkmarx One REST API.
///
/// The API key is a long-lived refresh token exchanged at the tenant's IAM
/// realm for a short-lived access token.
pub struct CheckmarxClient {
    client: Client,
    base_url: Url,
    iam_url: Url,
    tenant: String,
    api_key: String,
    page_size: usize,
    token: Option<AccessToken>,
}

impl CheckmarxClient {
    pub fn new(config: &CheckmarxConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: parse_base_url("CHECKMARX_BASE_URL", &config.base_url)?,
            iam_url: parse_base_url("CHECKMARX_IAM_URL", &config.iam_url)?,
            tenant: config.tenant.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size.max(1),
            token: None,
        })
    }

    fn token_url(&self) -> Result<Url> {
        join_segments(
            &self.iam_url,
            &[
                "auth",
                "realms",
                self.tenant.as_str(),
                "protocol",
                "openid-connect",
                "token",
            ],
        )
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_ref()
            .map(|token| token.value.as_str())
            .ok_or(SyncError::NotAuthenticated { service: SERVICE })
    }

    async fn fetch_page(&self, offset: usize) -> Result<ProjectPage> {
        let url = join_segments(&self.base_url, &["api", "projects"])?;
        let response = self
            .client
            .get(url)
            .query(&[("offset", offset), ("limit", self.page_size)])
            .header(ACCEPT, PROJECTS_ACCEPT)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        tracing::debug!("Checkmarx projects response status: {}", response.status());

        let response = error_for_status(response, "fetch projects").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProjectSource for CheckmarxClient {
    async fn authenticate(&mut self) -> Result<()> {
        let url = self.token_url()?;
        tracing::debug!("Requesting Checkmarx access token from {}", url);

        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", IAM_CLIENT_ID),
                ("refresh_token", self.api_key.as_str()),
            ])
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

        let token: TokenResponse = response.json().await?;
        let token = AccessToken::new(token.access_token, token.expires_in);
        tracing::debug!("Checkmarx token obtained, expires at {:?}", token.expires_at);
        self.token = Some(token);
        Ok(())
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut offset = 0;
        let mut page_fetches = 0;

        loop {
            let page = self.fetch_page(offset).await?;
            page_fetches += 1;

            let expected_total = page.expected_total();
            let received = page.projects.len();
            projects.extend(page.projects);
            offset += received;

            if received == 0 {
                break;
            }
            // 有總數時以總數為準，伺服器可能把 limit 壓得比 page_size 小
            match expected_total {
                Some(total) if projects.len() as u64 >= total => break,
                Some(_) => {}
                None if received < self.page_size => break,
                None => {}
            }
        }

        tracing::debug!(
            "Fetched {} projects in {} pages from Checkmarx",
            projects.len(),
            page_fetches
        );
        Ok(projects)
    }
}
