use super::{CandidateTag, TrendFetcher, TrendSource};
use crate::config::FeedFormat;
use crate::normalization::is_hex_color_like;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::collections::HashSet;

static HTML_HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z][A-Za-z0-9_]{1,29})\b").expect("valid hashtag regex"));

static RSS_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<title>\s*(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?\s*</title>")
        .expect("valid rss title regex")
});

/// Scrapes a public trends page (hashtags in HTML) or a trends RSS feed.
pub struct FeedFetcher {
    client: Client,
    name: String,
    url: String,
    format: FeedFormat,
}

impl FeedFetcher {
    pub fn new(client: Client, name: &str, url: &str, format: FeedFormat) -> Self {
        Self {
            client,
            name: name.to_string(),
            url: url.to_string(),
            format,
        }
    }
}

/// Hashtags in page order, case-insensitively de-duplicated. Inline CSS
/// colours are skipped.
pub fn extract_html_hashtags(body: &str, max_count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    HTML_HASHTAG
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .filter(|tag| !is_hex_color_like(tag))
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .take(max_count)
        .collect()
}

/// Item titles from an RSS feed turned into CamelCase hashtags. The first
/// title belongs to the channel and is skipped.
pub fn extract_rss_titles(body: &str, max_count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    RSS_TITLE
        .captures_iter(body)
        .skip(1)
        .filter_map(|c| c.get(1).map(|m| camel_case(m.as_str())))
        .filter(|tag| !tag.is_empty() && seen.insert(tag.to_lowercase()))
        .take(max_count)
        .collect()
}

/// "taylor swift tour" -> "TaylorSwiftTour"
pub fn camel_case(phrase: &str) -> String {
    phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn rank_score(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    1.0 - index as f64 / total as f64
}

#[async_trait]
impl TrendFetcher for FeedFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> TrendSource {
        TrendSource::Aggregator
    }

    async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("{} request failed", self.name))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", self.name))?
            .text()
            .await
            .with_context(|| format!("{} body unreadable", self.name))?;

        let tags = match self.format {
            FeedFormat::Html => extract_html_hashtags(&body, max_count),
            FeedFormat::Rss => extract_rss_titles(&body, max_count),
        };
        log::debug!(
            "{} ({}): {} tags scraped",
            self.name,
            self.format.label(),
            tags.len()
        );

        let now = Utc::now();
        let total = tags.len();
        Ok(tags
            .into_iter()
            .enumerate()
            .map(|(i, tag)| {
                CandidateTag::new(tag, TrendSource::Aggregator, now).with_score(rank_score(i, total))
            })
            .collect())
    }
}
