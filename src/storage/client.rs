use super::credential::{TokenProvider, STORAGE_SCOPE};
use super::retry::RetryPolicy;
use super::BlobService;
use crate::models::BlobResponse;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use std::sync::Arc;
use uuid::Uuid;

const API_VERSION: &str = "2021-08-06";
const VERSION_ID_PARAM: &str = "versionId";

/// HTTP client, credential and retry policy shared by every scoped handle.
#[derive(Clone)]
struct Pipeline {
    http: Client,
    credential: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl Pipeline {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<BlobResponse> {
        self.retry
            .run(|| self.attempt(method.clone(), url, headers.clone(), body.clone()))
            .await
    }

    async fn attempt(
        &self,
        method: Method,
        url: &Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<BlobResponse> {
        let token = self.credential.token(STORAGE_SCOPE).await?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .timeout(self.retry.try_timeout)
            .bearer_auth(token)
            .header("x-ms-version", API_VERSION)
            .header(
                "x-ms-date",
                Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            )
            .header("x-ms-client-request-id", Uuid::new_v4().to_string())
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send {} {}: {}", method, url, e);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Storage error (status {}): {}", status, body);
            return Err(Error::Storage {
                status: status.as_u16(),
                body,
            });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::BodyRead(e.to_string()))?;

        Ok(BlobResponse::new(status, headers, body.to_vec()))
    }
}

fn with_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Account-scoped handle.
#[derive(Clone)]
pub struct BlobServiceClient {
    pipeline: Pipeline,
    url: Url,
}

impl BlobServiceClient {
    pub fn new(account_name: &str, credential: Arc<dyn TokenProvider>) -> Result<Self> {
        Self::with_endpoint(
            &format!("https://{}.blob.core.windows.net", account_name),
            credential,
        )
    }

    /// Point at a custom endpoint, such as a storage emulator.
    pub fn with_endpoint(endpoint: &str, credential: Arc<dyn TokenProvider>) -> Result<Self> {
        let url =
            Url::parse(endpoint).map_err(|e| Error::Url(format!("{}: {}", endpoint, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Url(format!("{}: not a base URL", endpoint)));
        }

        Ok(Self {
            pipeline: Pipeline {
                http: Client::builder().build()?,
                credential,
                retry: RetryPolicy::default(),
            },
            url,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.pipeline.retry = retry;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn container_client(&self, container_name: &str) -> ContainerClient {
        ContainerClient {
            pipeline: self.pipeline.clone(),
            url: with_segments(&self.url, [container_name]),
        }
    }
}

/// Container-scoped handle.
#[derive(Clone)]
pub struct ContainerClient {
    pipeline: Pipeline,
    url: Url,
}

impl ContainerClient {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Slashes in `blob_name` are kept as virtual directory separators.
    pub fn blob_client(&self, blob_name: &str) -> BlobClient {
        BlobClient {
            pipeline: self.pipeline.clone(),
            url: with_segments(&self.url, blob_name.split('/')),
        }
    }
}

/// Blob-scoped handle.
#[derive(Clone)]
pub struct BlobClient {
    pipeline: Pipeline,
    url: Url,
}

impl BlobClient {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Blob URL with `versionId` set, replacing any previous version.
    pub fn versioned_url(&self, version_id: &str) -> Url {
        let mut url = self.url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != VERSION_ID_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(VERSION_ID_PARAM, version_id);
        url
    }

    /// A new blob client built from the version-qualified URL.
    pub fn with_version_id(&self, version_id: &str) -> BlobClient {
        BlobClient {
            pipeline: self.pipeline.clone(),
            url: self.versioned_url(version_id),
        }
    }
}

#[async_trait]
impl BlobService for BlobClient {
    fn url(&self) -> String {
        self.url.to_string()
    }

    fn at_version(&self, version_id: &str) -> Box<dyn BlobService> {
        Box::new(self.with_version_id(version_id))
    }

    async fn upload(&self, data: &[u8], content_type: &str) -> Result<BlobResponse> {
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| Error::Config(format!("Invalid content type: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        headers.insert("x-ms-blob-content-type", content_type.clone());
        headers.insert(CONTENT_TYPE, content_type);

        self.pipeline
            .send(Method::PUT, &self.url, headers, Some(data.to_vec()))
            .await
    }

    async fn download(&self) -> Result<BlobResponse> {
        self.pipeline
            .send(Method::GET, &self.url, HeaderMap::new(), None)
            .await
    }

    async fn delete(&self) -> Result<BlobResponse> {
        self.pipeline
            .send(Method::DELETE, &self.url, HeaderMap::new(), None)
            .await
    }
}
