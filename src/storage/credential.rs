use crate::{Error, Result};
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use std::sync::Arc;

/// OAuth scope covering every Blob Storage account.
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

/// Source of bearer tokens for storage requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, scope: &str) -> Result<String>;
}

/// The platform default credential chain (environment, managed identity,
/// Azure CLI, ...), tried in order until one yields a token.
pub struct DefaultCredential {
    inner: Arc<dyn TokenCredential>,
}

impl DefaultCredential {
    pub fn new() -> Result<Self> {
        let inner = azure_identity::create_credential()
            .map_err(|e| Error::Credential(format!("Failed to build credential chain: {}", e)))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl TokenProvider for DefaultCredential {
    async fn token(&self, scope: &str) -> Result<String> {
        let token = self
            .inner
            .get_token(&[scope])
            .await
            .map_err(|e| Error::Credential(format!("Failed to acquire token: {}", e)))?;
        Ok(token.token.secret().to_string())
    }
}

/// Fixed token, for emulators and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self, _scope: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
