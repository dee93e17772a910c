use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::{ImageStore, StorageError};
use crate::google::auth::{TokenProvider, CLOUD_PLATFORM_SCOPE};

const UPLOAD_API_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";
const PUBLIC_BASE: &str = "https://storage.googleapis.com";
const ASSET_PREFIX: &str = "marketing-assets";

/// Uploads images to a Cloud Storage bucket as publicly readable objects
pub struct GcsImageStore {
    client: Client,
    bucket: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GcsImageStore {
    pub fn new(client: Client, bucket: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            tokens,
        }
    }

    fn object_name(name: &str) -> String {
        format!("{}/{}", ASSET_PREFIX, name)
    }

    fn public_url(&self, object: &str) -> String {
        format!("{}/{}/{}", PUBLIC_BASE, self.bucket, object)
    }
}

#[async_trait]
impl ImageStore for GcsImageStore {
    async fn save(&self, bytes: &[u8], name: &str) -> Result<String, StorageError> {
        let token = self
            .tokens
            .access_token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| StorageError::Auth(e.to_string()))?;

        let object = Self::object_name(name);
        let url = format!("{}/b/{}/o", UPLOAD_API_BASE, self.bucket);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("uploadType", "media"),
                ("name", object.as_str()),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload { status, message });
        }

        let public = self.public_url(&object);
        tracing::info!("[STORAGE] Uploaded {} to {}", name, public);
        Ok(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::auth::AuthError;

    struct NoTokens;

    #[async_trait]
    impl TokenProvider for NoTokens {
        async fn access_token(&self, _: &[&str]) -> Result<String, AuthError> {
            Err(AuthError::EmptyToken)
        }
    }

    #[test]
    fn test_public_url_layout() {
        let store = GcsImageStore::new(Client::new(), "proj-generated-images", Arc::new(NoTokens));
        let object = GcsImageStore::object_name("infographic.png");
        assert_eq!(object, "marketing-assets/infographic.png");
        assert_eq!(
            store.public_url(&object),
            "https://storage.googleapis.com/proj-generated-images/marketing-assets/infographic.png"
        );
    }

    #[tokio::test]
    async fn test_token_failure_is_auth_error() {
        let store = GcsImageStore::new(Client::new(), "bucket", Arc::new(NoTokens));
        let err = store.save(b"png", "a.png").await.unwrap_err();
        assert!(matches!(err, StorageError::Auth(_)));
    }
}
