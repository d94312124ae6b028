//! The three command routines and the client wiring they share.
//!
//! Each routine issues exactly one storage call against the configured blob
//! and logs the response at debug level. Errors are returned unlogged; the
//! binaries add context and turn them into exit codes.

use crate::config::Config;
use crate::models::{BlobData, BlobResponse};
use crate::storage::{
    BlobClient, BlobService, BlobServiceClient, TokenProvider, JSON_CONTENT_TYPE,
};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the blob-scoped client for the configured account, container and blob.
pub fn connect(config: &Config, credential: Arc<dyn TokenProvider>) -> Result<BlobClient> {
    let service = BlobServiceClient::new(&config.account_name, credential)?;
    debug!("Using storage account endpoint {}", service.url());

    Ok(service
        .container_client(&config.container_name)
        .blob_client(&config.blob_name))
}

/// Upload a fresh timestamped JSON document.
pub async fn upload(blob: &dyn BlobService) -> Result<BlobResponse> {
    let data = BlobData::now();
    let payload = serde_json::to_vec(&data)?;
    info!("Uploading {} bytes to {}", payload.len(), blob.url());

    let response = blob.upload(&payload, JSON_CONTENT_TYPE).await?;
    log_response(&response);
    Ok(response)
}

/// Download the blob, or one of its versions when `version_id` is given.
pub async fn download(blob: &dyn BlobService, version_id: Option<&str>) -> Result<BlobResponse> {
    let response = match version_id {
        Some(version_id) => {
            info!("use version id: {}", version_id);
            blob.at_version(version_id).download().await?
        }
        None => blob.download().await?,
    };
    log_response(&response);
    Ok(response)
}

pub async fn delete(blob: &dyn BlobService) -> Result<BlobResponse> {
    info!("Deleting {}", blob.url());

    let response = blob.delete().await?;
    log_response(&response);
    Ok(response)
}

pub fn log_response(response: &BlobResponse) {
    debug!("***headers***");
    for line in response.header_lines() {
        debug!("{}", line);
    }
    debug!("***body***");
    debug!("{}", response.body_text());
}

/// 0 for success, 1 for any failure.
pub fn exit_code<T, E>(result: &std::result::Result<T, E>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_ACCOUNT_NAME, ENV_BLOB_NAME, ENV_CONTAINER_NAME};
    use crate::storage::{MockBlobClient, StaticToken};
    use crate::Error;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_connect_scopes_client_to_configured_blob() {
        let config = Config::from_lookup(|key| match key {
            ENV_ACCOUNT_NAME => Some("devaccount".to_string()),
            ENV_CONTAINER_NAME => Some("experiments".to_string()),
            ENV_BLOB_NAME => Some("data.json".to_string()),
            _ => None,
        })
        .unwrap();

        let blob = connect(&config, Arc::new(StaticToken::new("t"))).unwrap();
        assert_eq!(
            blob.url().as_str(),
            "https://devaccount.blob.core.windows.net/experiments/data.json"
        );
    }

    #[tokio::test]
    async fn test_upload_writes_current_timestamp_as_json() {
        let blob = MockBlobClient::new();
        let before = Utc::now();

        assert_ok!(upload(&blob).await);

        assert_eq!(blob.get_content_type().as_deref(), Some(JSON_CONTENT_TYPE));
        let stored: BlobData = serde_json::from_slice(&blob.get_blob().unwrap()).unwrap();
        assert!(stored.timestamp >= before);
        assert!(stored.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_download_without_version_targets_plain_url() {
        let blob = MockBlobClient::new().with_blob(b"{}".to_vec(), JSON_CONTENT_TYPE);

        let response = download(&blob, None).await.unwrap();
        assert_eq!(response.body_text(), "{}");
        assert_eq!(blob.get_calls(), vec![format!("GET {}", blob.url())]);
    }

    #[tokio::test]
    async fn test_download_with_version_targets_versioned_url() {
        let blob = MockBlobClient::new().with_version("v7", b"seven".to_vec());

        let response = download(&blob, Some("v7")).await.unwrap();
        assert_eq!(response.body_text(), "seven");

        let calls = blob.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], format!("GET {}?versionId=v7", blob.url()));
    }

    #[tokio::test]
    async fn test_delete_missing_blob_fails_with_exit_code_one() {
        let blob = MockBlobClient::new();

        let result = delete(&blob).await;
        assert!(matches!(result, Err(Error::Storage { status: 404, .. })));
        assert_eq!(exit_code(&result), 1);
    }

    #[tokio::test]
    async fn test_body_read_failure_is_not_success() {
        let blob = MockBlobClient::new()
            .with_blob(b"{}".to_vec(), JSON_CONTENT_TYPE)
            .with_body_read_failure();

        let result = download(&blob, None).await;
        assert_err!(&result);
        assert_eq!(exit_code(&result), 1);
    }

    #[tokio::test]
    async fn test_successful_delete_exits_zero() {
        let blob = MockBlobClient::new().with_blob(b"{}".to_vec(), JSON_CONTENT_TYPE);

        let result = delete(&blob).await;
        assert_eq!(exit_code(&result), 0);
        assert!(blob.get_blob().is_none());
    }
}
