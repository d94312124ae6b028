//! Azure Blob Storage access
//!
//! A thin REST client over `reqwest` with service, container and blob scoped
//! handles, plus an in-memory mock for tests.
//!
//! The `azure_storage_blobs` SDK is not used because its typed responses do
//! not expose the full response header map, which every command logs.

pub mod client;
pub mod credential;
pub mod mock;
pub mod retry;

pub use client::{BlobClient, BlobServiceClient, ContainerClient};
pub use credential::{DefaultCredential, StaticToken, TokenProvider, STORAGE_SCOPE};
pub use mock::MockBlobClient;
pub use retry::RetryPolicy;

use crate::models::BlobResponse;
use crate::Result;
use async_trait::async_trait;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Operations against a single blob.
#[async_trait]
pub trait BlobService: Send + Sync {
    /// URL of the targeted blob, including any version qualifier.
    fn url(&self) -> String;

    /// The same blob, pinned to `version_id`.
    fn at_version(&self, version_id: &str) -> Box<dyn BlobService>;

    async fn upload(&self, data: &[u8], content_type: &str) -> Result<BlobResponse>;
    async fn download(&self) -> Result<BlobResponse>;
    async fn delete(&self) -> Result<BlobResponse>;
}
