use crate::traits::{Storage, StorageResult};
use async_trait::async_trait;
use filmroom_core::StorageBackend;

/// No-op storage backend for the degraded, unconfigured mode.
///
/// When no remote store is configured the pipeline still runs end to end:
/// put and delete are logged no-ops, so nothing is persisted remotely. The
/// invariant that every stored object is removed by the end of the request
/// holds trivially.
#[derive(Clone, Default)]
pub struct DisabledStorage;

impl DisabledStorage {
    pub fn new() -> Self {
        DisabledStorage
    }
}

#[async_trait]
impl Storage for DisabledStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        tracing::warn!(
            key = %key,
            size_bytes = data.len(),
            "Object storage disabled, skipping upload"
        );
        Ok(format!("disabled://{}", key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        tracing::debug!(key = %key, "Object storage disabled, skipping delete");
        Ok(())
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn bucket(&self) -> &str {
        "(disabled)"
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Disabled
    }
}
