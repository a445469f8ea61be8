use crate::composer::{AngleCursor, Composition, DraftPost, OfferFact, TemplateComposer};
use crate::config::Config;
use crate::filter::TrendFilter;
use crate::guarantor::DomainTagGuarantor;
use crate::history::{content_hash, ContentHistory};
use crate::trends::{CandidateTag, TrendAggregator};
use crate::validator::PostValidator;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Duration;

/// One account's composition pipeline. Each account owns its own cursor and
/// trend cache; `&mut self` keeps one composition in flight at a time.
pub struct AccountPipeline {
    account: String,
    aggregator: TrendAggregator,
    filter: TrendFilter,
    guarantor: DomainTagGuarantor,
    composer: TemplateComposer,
    validator: PostValidator,
    cursor: AngleCursor,
    retry_budget: usize,
    cycle_timeout: Duration,
    max_candidates: usize,
    max_age: Option<chrono::Duration>,
}

impl AccountPipeline {
    pub fn new(config: &Config, account: &str, aggregator: TrendAggregator) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            account: account.to_string(),
            aggregator,
            filter: TrendFilter::from_config(config)?,
            guarantor: DomainTagGuarantor::from_config(config),
            composer: TemplateComposer::new(&config.promo, &config.validation, account)?,
            validator: PostValidator::from_config(config),
            cursor: AngleCursor::default(),
            retry_budget: config.compose.retry_budget,
            cycle_timeout: Duration::from_secs(config.compose.cycle_timeout_seconds),
            max_candidates: config.sources.max_candidates,
            max_age: config
                .filter
                .require_fresh
                .then(|| chrono::Duration::minutes(config.filter.trend_max_age_minutes as i64)),
        })
    }

    pub fn from_config(config: &Config, account: &str, offline: bool) -> Result<Self> {
        let aggregator = TrendAggregator::from_config(&config.sources, offline);
        Self::new(config, account, aggregator)
    }

    pub fn with_cursor(mut self, cursor: AngleCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn cursor(&self) -> AngleCursor {
        self.cursor
    }

    pub fn validator(&self) -> &PostValidator {
        &self.validator
    }

    pub fn aggregator(&self) -> &TrendAggregator {
        &self.aggregator
    }

    /// Fetch, filter, guarantee, compose and validate one post. Yields `None`
    /// when the cycle times out or nothing passes validation; the cursor only
    /// moves when a draft is returned.
    pub async fn compose_next_post(&mut self, offer: &OfferFact) -> Option<DraftPost> {
        let composition = self.draft_next_post(offer).await?;
        Some(self.commit(composition))
    }

    /// Like [`compose_next_post`](Self::compose_next_post), but a body already
    /// in `history` within `window_days` is dropped without moving the cursor.
    /// Accepted bodies are recorded.
    pub async fn compose_unique_post(
        &mut self,
        offer: &OfferFact,
        history: &dyn ContentHistory,
        window_days: i64,
    ) -> Option<DraftPost> {
        let composition = self.draft_next_post(offer).await?;
        let hash = content_hash(&composition.draft.body);
        if history.is_duplicate(&hash, window_days).await {
            warn!("{}: duplicate body, skipping this cycle", self.account);
            return None;
        }
        history.record(&hash, Utc::now()).await;
        Some(self.commit(composition))
    }

    /// One cycle under the cycle timeout, without committing the cursor.
    pub async fn draft_next_post(&self, offer: &OfferFact) -> Option<Composition> {
        let cycle = async {
            let candidates = self
                .aggregator
                .fetch_candidates(self.max_age, self.max_candidates)
                .await;
            self.draft(&candidates, offer, Utc::now())
        };

        match tokio::time::timeout(self.cycle_timeout, cycle).await {
            Ok(composition) => composition,
            Err(_) => {
                warn!(
                    "{}: composition cycle exceeded {:?}, skipping this cycle",
                    self.account, self.cycle_timeout
                );
                None
            }
        }
    }

    /// Synchronous core of [`compose_next_post`](Self::compose_next_post) over
    /// an already collected candidate set.
    pub fn compose_from_candidates(
        &mut self,
        candidates: &[CandidateTag],
        offer: &OfferFact,
        now: DateTime<Utc>,
    ) -> Option<DraftPost> {
        let composition = self.draft(candidates, offer, now)?;
        Some(self.commit(composition))
    }

    /// Accept a composition: its cursor becomes this account's cursor.
    pub fn commit(&mut self, composition: Composition) -> DraftPost {
        self.cursor = composition.next_cursor;
        composition.draft
    }

    fn draft(&self, candidates: &[CandidateTag], offer: &OfferFact, now: DateTime<Utc>) -> Option<Composition> {
        let ranked = self.filter.filter_and_score(candidates, now);
        let accepted = ranked.iter().filter(|t| t.accepted).count();
        debug!(
            "{}: {} of {} candidates survived filtering ({} relevant)",
            self.account,
            ranked.len(),
            candidates.len(),
            accepted
        );

        let tags = self.guarantor.guarantee(&ranked, Some(self.cursor.current()));

        for attempt in 0..self.retry_budget {
            let composition = self.composer.compose(&tags, self.cursor, offer, attempt);
            let result = self.validator.validate(&composition.draft);
            if result.passed() {
                info!(
                    "{}: composed {} post with {:?} on attempt {}",
                    self.account,
                    composition.draft.angle,
                    composition.draft.hashtags,
                    attempt + 1
                );
                return Some(composition);
            }
            warn!(
                "{}: attempt {} rejected, {}",
                self.account,
                attempt + 1,
                result
            );
        }

        let fallback = self.composer.fallback(self.cursor, offer);
        let result = self.validator.validate(&fallback.draft);
        if result.passed() {
            warn!(
                "{}: retry budget exhausted, using the canned {} post",
                self.account, fallback.draft.angle
            );
            Some(fallback)
        } else {
            warn!("{}: canned post rejected too, {}", self.account, result);
            None
        }
    }
}

/// Offer for the `cycle`-th post, rotating through the configured list.
pub fn offer_for_cycle(offers: &[OfferFact], cycle: usize) -> Option<&OfferFact> {
    if offers.is_empty() {
        return None;
    }
    offers.get(cycle % offers.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::MarketingAngle;
    use crate::config::ValidationConfig;
    use crate::guarantor::DOMAIN_TAG_LIBRARY;
    use crate::history::{InMemoryHistory, DUPLICATE_WINDOW_DAYS};
    use crate::trends::{TrendFetcher, TrendSource};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticFetcher {
        tags: Vec<&'static str>,
        delay: Duration,
    }

    #[async_trait]
    impl TrendFetcher for StaticFetcher {
        fn name(&self) -> &str {
            "static"
        }

        fn source(&self) -> TrendSource {
            TrendSource::Search
        }

        async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>> {
            tokio::time::sleep(self.delay).await;
            Ok(self
                .tags
                .iter()
                .take(max_count)
                .map(|t| CandidateTag::new(*t, TrendSource::Search, Utc::now()))
                .collect())
        }
    }

    fn pipeline_with(tags: Vec<&'static str>, delay: Duration, config: &Config) -> AccountPipeline {
        let fetcher: Arc<dyn TrendFetcher> = Arc::new(StaticFetcher { tags, delay });
        let aggregator = TrendAggregator::new(vec![fetcher], Duration::from_secs(5), Duration::from_secs(60));
        AccountPipeline::new(config, "account_a", aggregator).unwrap()
    }

    fn pipeline() -> AccountPipeline {
        pipeline_with(vec![], Duration::ZERO, &Config::default())
    }

    fn offer() -> OfferFact {
        Config::default().offers[0].clone()
    }

    fn candidates(texts: &[&str], now: DateTime<Utc>) -> Vec<CandidateTag> {
        texts
            .iter()
            .map(|t| CandidateTag::new(*t, TrendSource::Search, now))
            .collect()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.promo.code = String::new();
        assert!(AccountPipeline::from_config(&config, "account_a", true).is_err());
    }

    #[test]
    fn test_off_topic_trends_get_a_synthesized_partner() {
        let now = Utc::now();
        let mut pipeline = pipeline();
        let draft = pipeline
            .compose_from_candidates(&candidates(&["#UFCPerth", "#Sunday"], now), &offer(), now)
            .unwrap();

        assert_eq!(draft.hashtags.len(), 2);
        assert!(["UFCPerth", "Sunday"].contains(&draft.hashtags[0].as_str()));
        assert!(DOMAIN_TAG_LIBRARY.iter().any(|e| e.tag == draft.hashtags[1]));
        assert!(!draft.fallback);
        assert!(pipeline.validator().validate(&draft).passed());
        assert_eq!(pipeline.cursor(), AngleCursor::new(1));
    }

    #[test]
    fn test_no_trends_still_posts() {
        let now = Utc::now();
        let mut pipeline = pipeline().with_cursor(AngleCursor::new(4));
        let draft = pipeline.compose_from_candidates(&[], &offer(), now).unwrap();
        assert_eq!(draft.hashtags, vec!["ReliableCompute"]);
        assert_eq!(draft.angle, MarketingAngle::Uptime);
    }

    #[test]
    fn test_six_posts_visit_every_angle() {
        let now = Utc::now();
        let mut pipeline = pipeline();
        let batches: [&[&str]; 3] = [&["#UFCPerth", "#Sunday"], &["#GPUCloud"], &[]];
        let offers = Config::default().offers;

        let mut angles = Vec::new();
        for cycle in 0..6 {
            let batch = candidates(batches[cycle % 3], now);
            let offer = offer_for_cycle(&offers, cycle).unwrap();
            let draft = pipeline.compose_from_candidates(&batch, offer, now).unwrap();
            angles.push(draft.angle);
        }
        assert_eq!(angles, MarketingAngle::ALL.to_vec());
        assert_eq!(pipeline.cursor(), AngleCursor::new(0));
    }

    #[test]
    fn test_exhausted_budget_uses_fallback() {
        let now = Utc::now();
        let mut pipeline = pipeline();
        pipeline.retry_budget = 0;
        let draft = pipeline
            .compose_from_candidates(&candidates(&["#GPUCloud"], now), &offer(), now)
            .unwrap();
        assert!(draft.fallback);
        assert_eq!(draft.hashtags, vec!["CloudGPU"]);
        assert_eq!(pipeline.cursor(), AngleCursor::new(1));
    }

    #[test]
    fn test_nothing_valid_yields_none_and_keeps_cursor() {
        let now = Utc::now();
        let mut pipeline = pipeline();
        let tight = ValidationConfig {
            length_budget: 40,
            ..ValidationConfig::default()
        };
        pipeline.validator = PostValidator::new(&tight, &Config::default().promo.code, 0.55);

        let draft = pipeline.compose_from_candidates(&candidates(&["#GPUCloud"], now), &offer(), now);
        assert!(draft.is_none());
        assert_eq!(pipeline.cursor(), AngleCursor::new(0));
    }

    #[tokio::test]
    async fn test_compose_next_post() {
        let mut pipeline = pipeline_with(vec!["#LowLatency", "#UFCPerth"], Duration::ZERO, &Config::default());
        let draft = pipeline.compose_next_post(&offer()).await.unwrap();
        assert_eq!(draft.hashtags, vec!["LowLatency"]);
        assert_eq!(draft.angle, MarketingAngle::Cost);
        assert_eq!(pipeline.cursor().current(), MarketingAngle::Latency);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_synthesized_post() {
        let config = Config::default();
        let fetcher: Arc<dyn TrendFetcher> = Arc::new(StaticFetcher {
            tags: vec!["#GPUCloud"],
            delay: Duration::from_secs(2),
        });
        // Source timeout shorter than the fetch
        let aggregator = TrendAggregator::new(vec![fetcher], Duration::from_millis(20), Duration::from_secs(60));
        let mut pipeline = AccountPipeline::new(&config, "account_b", aggregator).unwrap();

        let draft = pipeline.compose_next_post(&offer()).await.unwrap();
        assert_eq!(draft.hashtags.len(), 1);
        assert_ne!(draft.hashtags[0], "GPUCloud");
    }

    #[tokio::test]
    async fn test_cycle_timeout_yields_no_post() {
        let config = Config::default();
        let mut pipeline = pipeline_with(vec!["#GPUCloud"], Duration::from_millis(500), &config);
        pipeline.cycle_timeout = Duration::from_millis(20);

        assert!(pipeline.compose_next_post(&offer()).await.is_none());
        assert_eq!(pipeline.cursor(), AngleCursor::new(0));
    }

    #[tokio::test]
    async fn test_duplicate_body_does_not_advance_cursor() {
        let config = Config::default();
        let history = InMemoryHistory::new();
        let mut pipeline = pipeline_with(vec!["#LowLatency"], Duration::ZERO, &config);

        let draft = pipeline.draft_next_post(&offer()).await.unwrap().draft;
        history.record(&content_hash(&draft.body), Utc::now()).await;

        let repeat = pipeline
            .compose_unique_post(&offer(), &history, DUPLICATE_WINDOW_DAYS)
            .await;
        assert!(repeat.is_none());
        assert_eq!(pipeline.cursor(), AngleCursor::new(0));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_unique_post_is_recorded_and_committed() {
        let config = Config::default();
        let history = InMemoryHistory::new();
        let mut pipeline = pipeline_with(vec!["#LowLatency"], Duration::ZERO, &config);

        let draft = pipeline
            .compose_unique_post(&offer(), &history, DUPLICATE_WINDOW_DAYS)
            .await
            .unwrap();
        assert_eq!(pipeline.cursor(), AngleCursor::new(1));
        assert!(history.is_duplicate(&content_hash(&draft.body), DUPLICATE_WINDOW_DAYS).await);
    }

    #[test]
    fn test_offer_rotation() {
        let offers = Config::default().offers;
        assert_eq!(offer_for_cycle(&offers, 0).unwrap().gpu_model, "2x RTX 3090");
        assert_eq!(offer_for_cycle(&offers, 5).unwrap().gpu_model, "5x RTX A6000");
        assert!(offer_for_cycle(&[], 3).is_none());
    }
}
