pub mod blacklist;
pub mod relevance;

use crate::config::Config;
use crate::error::ConfigResult;
use crate::normalization::TagNormalizer;
use crate::trends::{CandidateTag, TrendSource};
use chrono::{DateTime, Utc};
use log::debug;
use std::cmp::Ordering;

pub use blacklist::Blacklist;
pub use relevance::{Category, Relevance, RelevanceScorer};

/// A candidate that survived cleaning, with its domain relevance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTag {
    pub text: String,
    pub key: String,
    pub tokens: Vec<String>,
    pub source: TrendSource,
    pub observed_at: DateTime<Utc>,
    pub raw_score: Option<f64>,
    pub relevance: f64,
    pub category: Category,
    pub accepted: bool,
}

pub struct TrendFilter {
    normalizer: TagNormalizer,
    blacklist: Blacklist,
    scorer: RelevanceScorer,
    relevance_min: f64,
    max_age: chrono::Duration,
    require_fresh: bool,
    dedup_similarity: f64,
}

impl TrendFilter {
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let filter = &config.filter;
        Ok(Self {
            normalizer: TagNormalizer::new(&filter.noise_tokens),
            blacklist: Blacklist::from_config(&config.blacklist)?,
            scorer: RelevanceScorer::new(),
            relevance_min: filter.relevance_min,
            max_age: chrono::Duration::minutes(filter.trend_max_age_minutes as i64),
            require_fresh: filter.require_fresh,
            dedup_similarity: filter.dedup_similarity,
        })
    }

    pub fn relevance_min(&self) -> f64 {
        self.relevance_min
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    fn is_stale(&self, candidate: &CandidateTag, now: DateTime<Utc>) -> bool {
        self.require_fresh && now - candidate.observed_at > self.max_age
    }

    /// Clean, drop, score and de-duplicate one cycle's candidates.
    ///
    /// Stale candidates are dropped before de-duplication so a stale copy can
    /// never shadow a fresh one. Output is ranked by relevance, then raw score,
    /// then earliest observation.
    pub fn filter_and_score(&self, candidates: &[CandidateTag], now: DateTime<Utc>) -> Vec<ScoredTag> {
        let mut scored = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let tag = match self.normalizer.normalize(&candidate.text) {
                Ok(tag) => tag,
                Err(reason) => {
                    debug!("Dropped '{}': {}", candidate.text, reason);
                    continue;
                }
            };

            if let Some(term) = self.blacklist.matched(&tag) {
                debug!("Dropped '{}': blacklisted ({})", tag.text, term);
                continue;
            }

            if self.is_stale(candidate, now) {
                debug!(
                    "Dropped '{}': observed {} minutes ago",
                    tag.text,
                    (now - candidate.observed_at).num_minutes()
                );
                continue;
            }

            let relevance = self.scorer.score_tokens(&tag.tokens);
            let category = self.scorer.classify(&tag.tokens, relevance, self.relevance_min);
            debug!(
                "Scored '{}': relevance {:.2}, category {}",
                tag.text, relevance.score, category
            );

            scored.push(ScoredTag {
                text: tag.text,
                key: tag.key,
                tokens: tag.tokens,
                source: candidate.source,
                observed_at: candidate.observed_at,
                raw_score: candidate.raw_score,
                relevance: relevance.score,
                category,
                accepted: relevance.score >= self.relevance_min,
            });
        }

        scored.sort_by(rank_order);

        let mut kept: Vec<ScoredTag> = Vec::with_capacity(scored.len());
        for tag in scored {
            let duplicate_of = kept
                .iter()
                .find(|k| strsim::normalized_levenshtein(&k.key, &tag.key) >= self.dedup_similarity);
            match duplicate_of {
                Some(existing) => debug!("Dropped '{}': duplicate of '{}'", tag.text, existing.text),
                None => kept.push(tag),
            }
        }

        kept
    }
}

/// Higher relevance first, earliest observation on ties. Source scores are
/// carried for display only.
fn rank_order(a: &ScoredTag, b: &ScoredTag) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| a.observed_at.cmp(&b.observed_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn filter() -> TrendFilter {
        TrendFilter::from_config(&Config::default()).unwrap()
    }

    fn candidate(text: &str, minutes_ago: i64, now: DateTime<Utc>) -> CandidateTag {
        CandidateTag::new(text, TrendSource::Search, now - Duration::minutes(minutes_ago))
    }

    fn mixed_batch(now: DateTime<Utc>) -> Vec<CandidateTag> {
        [
            "#GPUCloud", "#gpucloud", "#GPUClouds", "#UFCPerth", "#SundayFunday", "#Sunday",
            "#NoWar", "#Trump2028", "#fff", "#1da1f2", "#2026", "#Collapsible", "#Café",
            "#AIInference", "#AIInferencing", "#ElectionNight", "#PornHub", "#LowLatency",
            "#TechTuesday", "#BreakingNews", "#NetflixAndChill", "#MLOps", "#nsfwclips",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| candidate(t, i as i64, now))
        .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(filter().filter_and_score(&[], Utc::now()).is_empty());
    }

    #[test]
    fn test_everything_dropped_is_empty() {
        let now = Utc::now();
        let batch = vec![candidate("#fff", 0, now), candidate("#NoWar", 0, now)];
        assert!(filter().filter_and_score(&batch, now).is_empty());
    }

    #[test]
    fn test_blacklisted_never_survive() {
        let now = Utc::now();
        let config = Config::default();
        let blacklist = Blacklist::from_config(&config.blacklist).unwrap();
        let normalizer = TagNormalizer::default();

        let survivors = filter().filter_and_score(&mixed_batch(now), now);
        assert!(!survivors.is_empty());
        for tag in &survivors {
            let normalized = normalizer.normalize(&tag.text).unwrap();
            assert!(!blacklist.is_blocked(&normalized), "{} survived", tag.text);
        }
        let texts: Vec<&str> = survivors.iter().map(|t| t.text.as_str()).collect();
        for banned in ["NoWar", "Trump2028", "ElectionNight", "PornHub", "nsfwclips"] {
            assert!(!texts.contains(&banned));
        }
    }

    #[test]
    fn test_noise_is_dropped() {
        let now = Utc::now();
        let survivors = filter().filter_and_score(&mixed_batch(now), now);
        let texts: Vec<&str> = survivors.iter().map(|t| t.text.as_str()).collect();
        for noise in ["fff", "1da1f2", "2026", "Collapsible", "Café", "Caf"] {
            assert!(!texts.contains(&noise), "{noise} survived");
        }
    }

    #[test]
    fn test_no_duplicates_survive() {
        let now = Utc::now();
        let survivors = filter().filter_and_score(&mixed_batch(now), now);
        for (i, a) in survivors.iter().enumerate() {
            for b in survivors.iter().skip(i + 1) {
                let sim = strsim::normalized_levenshtein(&a.key, &b.key);
                assert!(sim < 0.88, "{} ~ {} ({sim})", a.text, b.text);
            }
        }
    }

    #[test]
    fn test_duplicate_keeps_earliest_on_tie() {
        let now = Utc::now();
        let batch = vec![candidate("#gpucloud", 5, now), candidate("#GPUCloud", 30, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 1);
        // "GPUCloud" tokenizes to two exact keywords and outranks "gpucloud"
        assert_eq!(survivors[0].text, "GPUCloud");

        let batch = vec![candidate("#GPUCloud", 5, now), candidate("#GPUCloud", 30, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].observed_at, now - Duration::minutes(30));
    }

    #[test]
    fn test_ranked_by_relevance() {
        let now = Utc::now();
        let survivors = filter().filter_and_score(&mixed_batch(now), now);
        for pair in survivors.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
        assert!(survivors[0].accepted);

        let ufc = survivors.iter().find(|t| t.text == "UFCPerth").unwrap();
        assert!(!ufc.accepted);
        assert_eq!(ufc.category, Category::Sports);
    }

    #[test]
    fn test_off_topic_trends_are_kept_as_bridges() {
        let now = Utc::now();
        let batch = vec![candidate("#UFCPerth", 0, now), candidate("#Sunday", 0, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 2);
        assert!(survivors.iter().all(|t| !t.accepted && t.relevance < 0.55));
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        let batch = vec![candidate("#GPUCloud", 400, now), candidate("#LowLatency", 10, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].text, "LowLatency");

        let mut config = Config::default();
        config.filter.require_fresh = false;
        let relaxed = TrendFilter::from_config(&config).unwrap();
        assert_eq!(relaxed.filter_and_score(&batch, now).len(), 2);
    }

    #[test]
    fn test_stale_duplicate_does_not_shadow_fresh() {
        let now = Utc::now();
        let batch = vec![candidate("#GPUCloud", 500, now), candidate("#GPUClouds", 5, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].text, "GPUClouds");
    }

    #[test]
    fn test_source_score_does_not_break_relevance_tie() {
        let now = Utc::now();
        let mut later = candidate("#GPUCloud", 5, now);
        later.raw_score = Some(0.9);
        let batch = vec![later, candidate("#GPUCloud", 30, now)];
        let survivors = filter().filter_and_score(&batch, now);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].observed_at, now - Duration::minutes(30));
        assert_eq!(survivors[0].raw_score, None);
    }

    #[test]
    fn test_uppercase_css_colours_never_survive() {
        let now = Utc::now();
        let batch = vec![
            candidate("#FFFFFF", 0, now),
            candidate("#E0E0E0", 0, now),
            candidate("#1DA1F2", 0, now),
            candidate("#DDD", 0, now),
            candidate("#A100", 0, now),
        ];
        let survivors = filter().filter_and_score(&batch, now);
        let texts: Vec<&str> = survivors.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["A100"]);
    }
}
