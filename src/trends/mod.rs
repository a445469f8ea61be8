pub mod aggregator;
pub mod search;
pub mod temporal;

use crate::config::{FeedFormat, SourcesConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use aggregator::FeedFetcher;
pub use search::SearchFetcher;
pub use temporal::{GeneratedFetcher, TemporalFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Search,
    Aggregator,
    Temporal,
    Generated,
}

/// A raw trend as reported by one source, `text` without the leading `#`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTag {
    pub text: String,
    pub source: TrendSource,
    pub observed_at: DateTime<Utc>,
    pub raw_score: Option<f64>,
}

impl CandidateTag {
    pub fn new(text: impl Into<String>, source: TrendSource, observed_at: DateTime<Utc>) -> Self {
        let text = text.into();
        Self {
            text: text.trim_start_matches('#').to_string(),
            source,
            observed_at,
            raw_score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.raw_score = Some(score);
        self
    }
}

#[async_trait]
pub trait TrendFetcher: Send + Sync {
    fn name(&self) -> &str;
    fn source(&self) -> TrendSource;
    async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>>;
}

pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("trendcaster/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Runs every fetcher concurrently and merges what comes back. Results are
/// cached per fetcher so repeated cycles inside the TTL do not refetch.
pub struct TrendAggregator {
    fetchers: Vec<Arc<dyn TrendFetcher>>,
    timeout: Duration,
    cache: Cache<String, Vec<CandidateTag>>,
}

impl TrendAggregator {
    pub fn new(fetchers: Vec<Arc<dyn TrendFetcher>>, timeout: Duration, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(cache_ttl)
            .build();

        Self {
            fetchers,
            timeout,
            cache,
        }
    }

    /// Build the fetcher chain from configuration. With `offline` only the
    /// local temporal and generated sources are used.
    pub fn from_config(config: &SourcesConfig, offline: bool) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let mut fetchers: Vec<Arc<dyn TrendFetcher>> = Vec::new();

        if !offline {
            match http_client(timeout) {
                Ok(client) => {
                    if let Some(search) = &config.search {
                        match std::env::var(&search.bearer_token_env) {
                            Ok(token) if !token.trim().is_empty() => {
                                fetchers.push(Arc::new(SearchFetcher::new(
                                    client.clone(),
                                    search,
                                    token,
                                )));
                            }
                            _ => info!(
                                "Search source disabled: ${} is not set",
                                search.bearer_token_env
                            ),
                        }
                    }
                    for feed in &config.aggregators {
                        fetchers.push(Arc::new(FeedFetcher::new(
                            client.clone(),
                            &feed.name,
                            &feed.url,
                            feed.format,
                        )));
                    }
                }
                Err(e) => warn!("HTTP client unavailable, network sources disabled: {e}"),
            }
        }

        if config.temporal {
            fetchers.push(Arc::new(TemporalFetcher::new()));
        }
        if config.generated {
            fetchers.push(Arc::new(GeneratedFetcher::new()));
        }

        Self::new(
            fetchers,
            timeout,
            Duration::from_secs(config.cache_ttl_minutes * 60),
        )
    }

    pub fn fetcher_names(&self) -> Vec<String> {
        self.fetchers.iter().map(|f| f.name().to_string()).collect()
    }

    async fn fetch_one(&self, fetcher: &Arc<dyn TrendFetcher>, max_count: usize) -> Vec<CandidateTag> {
        let name = fetcher.name().to_string();
        if let Some(cached) = self.cache.get(&name).await {
            debug!("{name}: {} cached candidates", cached.len());
            return cached;
        }

        match tokio::time::timeout(self.timeout, fetcher.fetch(max_count)).await {
            Ok(Ok(candidates)) => {
                debug!("{name}: fetched {} candidates", candidates.len());
                self.cache.insert(name, candidates.clone()).await;
                candidates
            }
            Ok(Err(e)) => {
                warn!("{name}: fetch failed: {e:#}");
                Vec::new()
            }
            Err(_) => {
                warn!("{name}: fetch timed out after {:?}", self.timeout);
                Vec::new()
            }
        }
    }

    /// Never fails: sources that error or time out contribute nothing.
    /// Sources are interleaved so each gets a share of `max_count`.
    pub async fn fetch_candidates(
        &self,
        max_age: Option<chrono::Duration>,
        max_count: usize,
    ) -> Vec<CandidateTag> {
        let results = join_all(self.fetchers.iter().map(|f| self.fetch_one(f, max_count))).await;

        let now = Utc::now();
        let fresh: Vec<Vec<CandidateTag>> = results
            .into_iter()
            .map(|batch| {
                batch
                    .into_iter()
                    .filter(|c| max_age.map_or(true, |age| now - c.observed_at <= age))
                    .collect()
            })
            .collect();

        let merged = interleave(fresh, max_count);
        info!(
            "Collected {} trend candidates from {} sources",
            merged.len(),
            self.fetchers.len()
        );
        merged
    }
}

fn interleave(batches: Vec<Vec<CandidateTag>>, max_count: usize) -> Vec<CandidateTag> {
    let mut iters: Vec<_> = batches.into_iter().map(|b| b.into_iter()).collect();
    let mut merged = Vec::new();

    while merged.len() < max_count {
        let mut progressed = false;
        for iter in iters.iter_mut() {
            if merged.len() >= max_count {
                break;
            }
            if let Some(candidate) = iter.next() {
                merged.push(candidate);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    merged
}

impl FeedFormat {
    pub fn label(&self) -> &'static str {
        match self {
            FeedFormat::Html => "html",
            FeedFormat::Rss => "rss",
        }
    }
}
