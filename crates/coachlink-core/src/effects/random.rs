//! Randomness interface.

use async_trait::async_trait;
use std::sync::Arc;

/// Source of secret random bytes.
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// Fill a fresh buffer of `len` random bytes.
    async fn random_bytes(&self, len: usize) -> Vec<u8>;
}

#[async_trait]
impl<T: RandomEffects + ?Sized> RandomEffects for Arc<T> {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        (**self).random_bytes(len).await
    }
}
