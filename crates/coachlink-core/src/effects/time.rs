//! Physical time interface.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `coachlink-effects`
//! - **Usage**: invitation expiry checks, settle and poll delays

use async_trait::async_trait;
use std::sync::Arc;

/// Wall-clock time and sleeps.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current Unix timestamp in milliseconds.
    async fn now_ms(&self) -> u64;

    /// Suspend the calling task for `ms` milliseconds.
    async fn sleep_ms(&self, ms: u64);
}

/// Blanket implementation for Arc<T> where T: PhysicalTimeEffects
#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    async fn now_ms(&self) -> u64 {
        (**self).now_ms().await
    }

    async fn sleep_ms(&self, ms: u64) {
        (**self).sleep_ms(ms).await;
    }
}
