use super::BlobService;
use crate::models::BlobResponse;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Status(u16),
    BodyRead,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

/// In-memory single-blob store that records every call made against it.
#[derive(Clone)]
pub struct MockBlobClient {
    url: String,
    version_id: Option<String>,
    current: Arc<Mutex<Option<StoredBlob>>>,
    versions: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failure: Arc<Mutex<Option<Failure>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBlobClient {
    pub fn new() -> Self {
        Self {
            url: "https://mockaccount.blob.core.windows.net/container/blob".to_string(),
            version_id: None,
            current: Arc::new(Mutex::new(None)),
            versions: Arc::new(Mutex::new(HashMap::new())),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_blob(self, data: Vec<u8>, content_type: &str) -> Self {
        *self.current.lock().unwrap() = Some(StoredBlob {
            data,
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn with_version(self, version_id: &str, data: Vec<u8>) -> Self {
        self.versions
            .lock()
            .unwrap()
            .insert(version_id.to_string(), data);
        self
    }

    /// Every subsequent call fails with a non-2xx `status`.
    pub fn with_status_failure(self, status: u16) -> Self {
        *self.failure.lock().unwrap() = Some(Failure::Status(status));
        self
    }

    /// Calls succeed remotely but the response body cannot be read.
    pub fn with_body_read_failure(self) -> Self {
        *self.failure.lock().unwrap() = Some(Failure::BodyRead);
        self
    }

    pub fn get_blob(&self) -> Option<Vec<u8>> {
        self.current.lock().unwrap().as_ref().map(|b| b.data.clone())
    }

    pub fn get_content_type(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|b| b.content_type.clone())
    }

    /// Calls as `<METHOD> <url>`, in order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &str) -> Result<()> {
        let url = BlobService::url(self);
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, url));

        match *self.failure.lock().unwrap() {
            Some(Failure::Status(status)) => Err(Error::Storage {
                status,
                body: format!("mock failure for {}", url),
            }),
            Some(Failure::BodyRead) => Err(Error::BodyRead("mock body read failure".to_string())),
            None => Ok(()),
        }
    }

    fn not_found(&self) -> Error {
        Error::Storage {
            status: 404,
            body: "BlobNotFound".to_string(),
        }
    }

    fn response(status: StatusCode, content_type: Option<&str>, body: Vec<u8>) -> BlobResponse {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-request-id", HeaderValue::from_static("mock-request"));
        if let Some(content_type) = content_type.and_then(|c| HeaderValue::from_str(c).ok()) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        BlobResponse::new(status, headers, body)
    }
}

impl Default for MockBlobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobService for MockBlobClient {
    fn url(&self) -> String {
        match &self.version_id {
            Some(version_id) => format!("{}?versionId={}", self.url, version_id),
            None => self.url.clone(),
        }
    }

    fn at_version(&self, version_id: &str) -> Box<dyn BlobService> {
        let mut pinned = self.clone();
        pinned.version_id = Some(version_id.to_string());
        Box::new(pinned)
    }

    async fn upload(&self, data: &[u8], content_type: &str) -> Result<BlobResponse> {
        self.record("PUT")?;

        *self.current.lock().unwrap() = Some(StoredBlob {
            data: data.to_vec(),
            content_type: content_type.to_string(),
        });
        Ok(Self::response(StatusCode::CREATED, None, Vec::new()))
    }

    async fn download(&self) -> Result<BlobResponse> {
        self.record("GET")?;

        if let Some(version_id) = &self.version_id {
            return match self.versions.lock().unwrap().get(version_id) {
                Some(data) => Ok(Self::response(StatusCode::OK, None, data.clone())),
                None => Err(self.not_found()),
            };
        }

        match self.current.lock().unwrap().as_ref() {
            Some(blob) => Ok(Self::response(
                StatusCode::OK,
                Some(blob.content_type.as_str()),
                blob.data.clone(),
            )),
            None => Err(self.not_found()),
        }
    }

    async fn delete(&self) -> Result<BlobResponse> {
        self.record("DELETE")?;

        match self.current.lock().unwrap().take() {
            Some(_) => Ok(Self::response(StatusCode::ACCEPTED, None, Vec::new())),
            None => Err(self.not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_upload_then_download() {
        let client = MockBlobClient::new();

        client
            .upload(b"{\"test\": true}", "application/json")
            .await
            .unwrap();
        assert_eq!(client.get_content_type().as_deref(), Some("application/json"));

        let response = client.download().await.unwrap();
        assert_eq!(response.body_text(), "{\"test\": true}");
        assert_eq!(response.headers[CONTENT_TYPE], "application/json");
        assert_eq!(client.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_version_pinning_shares_state() {
        let client = MockBlobClient::new()
            .with_blob(b"current".to_vec(), "text/plain")
            .with_version("v1", b"older".to_vec());

        let pinned = client.at_version("v1");
        assert!(pinned.url().ends_with("?versionId=v1"));

        let response = pinned.download().await.unwrap();
        assert_eq!(response.body, b"older".to_vec());
        assert_eq!(client.get_calls(), vec![format!("GET {}", pinned.url())]);

        assert!(client.at_version("v2").download().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_delete_missing_blob() {
        let client = MockBlobClient::new();
        let err = client.delete().await.unwrap_err();
        assert!(matches!(err, Error::Storage { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_mock_forced_failures() {
        let client = MockBlobClient::new()
            .with_blob(b"data".to_vec(), "text/plain")
            .with_body_read_failure();
        assert!(matches!(
            client.download().await.unwrap_err(),
            Error::BodyRead(_)
        ));

        let client = MockBlobClient::new().with_status_failure(403);
        assert!(matches!(
            client.upload(b"x", "text/plain").await.unwrap_err(),
            Error::Storage { status: 403, .. }
        ));
        assert!(client.get_blob().is_none());
    }
}
