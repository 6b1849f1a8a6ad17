//! Random effect handler
//!
//! Uses `rand::thread_rng()`, which is a CSPRNG seeded from the OS.

use async_trait::async_trait;
use coachlink_core::effects::RandomEffects;
use rand::RngCore;

/// Real random handler using actual cryptographically secure randomness
#[derive(Debug, Clone, Copy, Default)]
pub struct RealRandomHandler;

impl RealRandomHandler {
    /// Create a new real random handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for RealRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_bytes_length_and_variation() {
        let handler = RealRandomHandler::new();
        let a = handler.random_bytes(32).await;
        let b = handler.random_bytes(32).await;
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
