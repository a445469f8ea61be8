use super::{CandidateTag, TrendFetcher, TrendSource};
use crate::config::SearchSourceConfig;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchPost>,
}

#[derive(Debug, Deserialize)]
pub struct SearchPost {
    pub created_at: Option<DateTime<Utc>>,
    pub entities: Option<PostEntities>,
}

#[derive(Debug, Deserialize)]
pub struct PostEntities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
}

#[derive(Debug, Deserialize)]
pub struct HashtagEntity {
    pub tag: String,
}

/// Hashtag frequency over recent posts from the search API.
pub struct SearchFetcher {
    client: Client,
    endpoint: String,
    bearer_token: String,
    query: String,
    max_results: u32,
}

impl SearchFetcher {
    pub fn new(client: Client, config: &SearchSourceConfig, bearer_token: String) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            bearer_token,
            query: config.query.clone(),
            // API accepts 10..=100 per page
            max_results: config.max_results.clamp(10, 100),
        }
    }
}

struct Tally {
    text: String,
    count: usize,
    first_seen: usize,
    latest: Option<DateTime<Utc>>,
}

/// Rank hashtags by how many posts carry them; ties keep first-seen order.
pub fn hashtags_from_response(
    response: &SearchResponse,
    now: DateTime<Utc>,
    max_count: usize,
) -> Vec<CandidateTag> {
    let mut tallies: HashMap<String, Tally> = HashMap::new();

    for post in &response.data {
        let Some(entities) = &post.entities else {
            continue;
        };
        for hashtag in &entities.hashtags {
            let key = hashtag.tag.to_lowercase();
            let next_index = tallies.len();
            let tally = tallies.entry(key).or_insert_with(|| Tally {
                text: hashtag.tag.clone(),
                count: 0,
                first_seen: next_index,
                latest: None,
            });
            tally.count += 1;
            tally.latest = tally.latest.max(post.created_at);
        }
    }

    let mut ranked: Vec<Tally> = tallies.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));

    let top = ranked.first().map_or(1, |t| t.count) as f64;
    ranked
        .into_iter()
        .take(max_count)
        .map(|t| {
            CandidateTag::new(t.text, TrendSource::Search, t.latest.unwrap_or(now))
                .with_score(t.count as f64 / top)
        })
        .collect()
}

#[async_trait]
impl TrendFetcher for SearchFetcher {
    fn name(&self) -> &str {
        "search"
    }

    fn source(&self) -> TrendSource {
        TrendSource::Search
    }

    async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>> {
        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", self.query.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "entities,created_at"),
            ])
            .send()
            .await
            .context("search request failed")?
            .error_for_status()
            .context("search API returned an error status")?;

        let body: SearchResponse = response
            .json()
            .await
            .context("search response was not valid JSON")?;

        Ok(hashtags_from_response(&body, Utc::now(), max_count))
    }
}
