// ABOUTME: Netlify REST implementation of the hosting gateway.
// ABOUTME: Bearer-token reqwest client with deploy readiness polling.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{DecodeSnafu, GatewayError, RequestSnafu, StatusSnafu};
use super::traits::HostingGateway;
use super::types::{Deploy, FileRecord, Site};
use crate::config::{ApiToken, Settings};
use crate::manifest::DeployManifest;
use crate::source::SourceStream;
use crate::types::{DeployId, SiteId, SitePath};

pub const DEFAULT_API_URL: &str = "https://api.netlify.com/api/v1";

/// Netlify API client.
pub struct NetlifyGateway {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    ready_timeout: Duration,
}

#[derive(Serialize)]
struct CreateDeployBody<'a> {
    branch: &'a str,
    files: BTreeMap<String, String>,
}

impl NetlifyGateway {
    /// Creates a client authenticated with `token`, tuned by `settings`.
    pub fn new(token: &ApiToken, settings: &Settings) -> Result<Self, GatewayError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| GatewayError::Config("API token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("netlify-upload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            poll_interval: settings.poll_interval,
            ready_timeout: settings.deploy_timeout,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, GatewayError> {
        let response = request.send().await.context(RequestSnafu { endpoint })?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(format!("{endpoint} not found")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusSnafu {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .build()
            .into());
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, GatewayError> {
        let response = self.send(request, endpoint).await?;
        let body = response.bytes().await.context(RequestSnafu { endpoint })?;
        let value = serde_json::from_slice(&body).context(DecodeSnafu { endpoint })?;
        Ok(value)
    }

    async fn get_deploy(&self, id: &DeployId) -> Result<Deploy, GatewayError> {
        let endpoint = format!("/deploys/{id}");
        self.json(self.http.get(self.url(&endpoint)), &endpoint).await
    }
}

#[async_trait]
impl HostingGateway for NetlifyGateway {
    async fn find_site_by_name(&self, name: &str) -> Result<Site, GatewayError> {
        let endpoint = "/sites";
        let request = self.http.get(self.url(endpoint)).query(&[("name", name)]);
        let sites: Vec<Site> = self.json(request, endpoint).await?;

        // The name filter is a substring match on the API side.
        sites
            .into_iter()
            .find(|site| site.name == name)
            .ok_or_else(|| GatewayError::NotFound(format!("could not find site with exact name {name}")))
    }

    async fn list_files(&self, site: &SiteId) -> Result<Vec<FileRecord>, GatewayError> {
        let endpoint = format!("/sites/{site}/files");
        self.json(self.http.get(self.url(&endpoint)), &endpoint).await
    }

    async fn latest_deploy(&self, site: &SiteId, branch: &str) -> Result<Deploy, GatewayError> {
        let endpoint = format!("/sites/{site}/deploys");
        let request = self
            .http
            .get(self.url(&endpoint))
            .query(&[("branch", branch), ("per_page", "1")]);
        let deploys: Vec<Deploy> = self.json(request, &endpoint).await?;

        deploys.into_iter().next().ok_or_else(|| {
            GatewayError::NotFound(format!(
                "could not get deploy for site_id:{site} branch:{branch}"
            ))
        })
    }

    async fn wait_until_ready(
        &self,
        deploy: &Deploy,
        cancel: &CancellationToken,
    ) -> Result<Deploy, GatewayError> {
        let deadline = Instant::now() + self.ready_timeout;
        let timed_out = || GatewayError::Timeout {
            deploy: deploy.id.to_string(),
            after: self.ready_timeout,
        };

        loop {
            let current = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out()),
                current = self.get_deploy(&deploy.id) => current?,
            };

            if current.state.is_ready() {
                return Ok(current);
            }

            if current.state.is_failed() {
                let reason = current
                    .error_message
                    .as_deref()
                    .unwrap_or("deploy entered the error state");
                return Err(GatewayError::Rejected(format!(
                    "deploy {} failed: {reason}",
                    current.id
                )));
            }

            tracing::debug!(deploy = %current.id, state = %current.state, "deploy not ready yet");

            let next_poll = (Instant::now() + self.poll_interval).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                _ = tokio::time::sleep_until(next_poll) => {}
            }
        }
    }

    async fn create_deploy(&self, manifest: &DeployManifest) -> Result<Deploy, GatewayError> {
        let endpoint = format!("/sites/{}/deploys", manifest.site_id());
        let body = CreateDeployBody {
            branch: manifest.branch(),
            files: manifest.to_rooted_files(),
        };
        let request = self.http.post(self.url(&endpoint)).json(&body);
        self.json(request, &endpoint).await
    }

    async fn upload_file(
        &self,
        deploy: &DeployId,
        path: &SitePath,
        content: &mut dyn SourceStream,
    ) -> Result<FileRecord, GatewayError> {
        // The whole file is held in memory for the request, so at most
        // `upload_concurrency` file bodies are resident at once.
        let size = content.seek(SeekFrom::End(0)).await?;
        content.rewind().await?;
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        content.read_to_end(&mut buf).await?;
        tracing::debug!(path = %path, bytes = buf.len(), "uploading file");

        let endpoint = format!("/deploys/{deploy}/files/{}", encode_path(path));
        let request = self
            .http
            .put(self.url(&endpoint))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(Bytes::from(buf));
        self.json(request, &endpoint).await
    }

    async fn cancel_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError> {
        let endpoint = format!("/deploys/{deploy}/cancel");
        self.send(self.http.post(self.url(&endpoint)), &endpoint)
            .await
            .map(|_| ())
    }

    async fn delete_deploy(&self, deploy: &DeployId) -> Result<(), GatewayError> {
        let endpoint = format!("/deploys/{deploy}");
        self.send(self.http.delete(self.url(&endpoint)), &endpoint)
            .await
            .map(|_| ())
    }
}

/// URL-encode each segment of a site path, keeping the separators.
fn encode_path(path: &SitePath) -> String {
    path.segments()
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
