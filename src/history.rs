use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Recent-post history kept by the persistence layer. Callers check a body
/// before posting it and record it once posted.
#[async_trait]
pub trait ContentHistory: Send + Sync {
    async fn is_duplicate(&self, body_hash: &str, window_days: i64) -> bool;
    async fn record(&self, body_hash: &str, at: DateTime<Utc>);
}

/// Default look-back for duplicate bodies
pub const DUPLICATE_WINDOW_DAYS: i64 = 30;

/// SHA-256 of the body with URLs removed, case folded and whitespace collapsed,
/// so the per-post `utm_id` does not make every body unique.
pub fn content_hash(body: &str) -> String {
    let normalized = body
        .split_whitespace()
        .filter(|t| !t.starts_with("http://") && !t.starts_with("https://"))
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Process-local history for the dry-run loop and tests.
#[derive(Default)]
pub struct InMemoryHistory {
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
    now: Option<DateTime<Utc>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "now" for window checks.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            now: Some(now),
        }
    }

    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }
}

#[async_trait]
impl ContentHistory for InMemoryHistory {
    async fn is_duplicate(&self, body_hash: &str, window_days: i64) -> bool {
        let now = self.now.unwrap_or_else(Utc::now);
        let seen = self.seen.lock().await;
        seen.get(body_hash)
            .map_or(false, |at| now - *at <= Duration::days(window_days))
    }

    async fn record(&self, body_hash: &str, at: DateTime<Utc>) {
        let mut seen = self.seen.lock().await;
        let entry = seen.entry(body_hash.to_string()).or_insert(at);
        if at > *entry {
            *entry = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ignores_urls_case_and_spacing() {
        let a = content_hash("Scale GPUs now https://voltagegpu.com/?utm_id=aaaa1111 #CloudGPU");
        let b = content_hash("scale  gpus NOW\nhttps://voltagegpu.com/?utm_id=bbbb2222 #cloudgpu");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash("Scale GPUs later #CloudGPU"));
    }

    #[tokio::test]
    async fn test_duplicate_window() {
        let now = Utc::now();
        let history = InMemoryHistory::at(now);
        let hash = content_hash("Rent GPUs today");

        assert!(!history.is_duplicate(&hash, DUPLICATE_WINDOW_DAYS).await);
        history.record(&hash, now - Duration::days(10)).await;
        assert!(history.is_duplicate(&hash, DUPLICATE_WINDOW_DAYS).await);
        assert!(!history.is_duplicate(&hash, 7).await);
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_record_keeps_latest() {
        let now = Utc::now();
        let history = InMemoryHistory::at(now);
        history.record("h", now - Duration::days(40)).await;
        assert!(!history.is_duplicate("h", 30).await);
        history.record("h", now - Duration::days(1)).await;
        assert!(history.is_duplicate("h", 30).await);
        history.record("h", now - Duration::days(60)).await;
        assert!(history.is_duplicate("h", 30).await);
    }
}
