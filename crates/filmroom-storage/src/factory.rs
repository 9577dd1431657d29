use crate::{DisabledStorage, LocalStorage, S3Storage, Storage, StorageError, StorageResult};
use filmroom_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a storage backend based on configuration.
///
/// When no backend is configured, an S3 bucket in the environment implies
/// S3; otherwise the service falls back to the disabled no-op backend so
/// uploads still flow through the full pipeline without remote persistence.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.storage_backend.unwrap_or_else(|| {
        if config.s3_bucket.is_some() {
            StorageBackend::S3
        } else {
            StorageBackend::Disabled
        }
    });

    match backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint.clone();

            let storage = S3Storage::new(bucket, region, endpoint)?;
            Ok(Arc::new(storage))
        }

        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        StorageBackend::Disabled => {
            tracing::warn!(
                "No object storage configured, running in degraded mode without remote persistence"
            );
            Ok(Arc::new(DisabledStorage::new()))
        }
    }
}
