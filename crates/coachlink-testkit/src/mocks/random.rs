use async_trait::async_trait;
use coachlink_core::effects::RandomEffects;
use parking_lot::Mutex;
use std::sync::Arc;

/// Deterministic [`RandomEffects`]: bytes count up from the seed and carry
/// over between calls.
#[derive(Debug, Clone)]
pub struct MockRandomHandler {
    next: Arc<Mutex<u8>>,
}

impl MockRandomHandler {
    /// Start counting at `seed`
    pub fn with_seed(seed: u8) -> Self {
        Self {
            next: Arc::new(Mutex::new(seed)),
        }
    }
}

impl Default for MockRandomHandler {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

#[async_trait]
impl RandomEffects for MockRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut next = self.next.lock();
        (0..len)
            .map(|_| {
                let byte = *next;
                *next = next.wrapping_add(1);
                byte
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bytes_are_deterministic() {
        let random = MockRandomHandler::with_seed(0xfe);
        assert_eq!(random.random_bytes(3).await, vec![0xfe, 0xff, 0x00]);
        assert_eq!(random.random_bytes(1).await, vec![0x01]);
    }
}
