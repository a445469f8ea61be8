use crate::composer::OfferFact;
use crate::error::{ConfigError, ConfigResult};
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub blacklist: BlacklistConfig,
    #[serde(default)]
    pub guarantor: GuarantorConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub promo: PromoConfig,
    #[serde(default = "default_offers")]
    pub offers: Vec<OfferFact>,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub relevance_min: f64,
    pub trend_max_age_minutes: u64,
    /// When false, stale candidates are kept regardless of age
    pub require_fresh: bool,
    pub dedup_similarity: f64,
    pub noise_tokens: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            relevance_min: 0.55,
            trend_max_age_minutes: 360,
            require_fresh: true,
            dedup_similarity: 0.88,
            noise_tokens: [
                "collapsible",
                "lorem",
                "ipsum",
                "undefined",
                "navbar",
                "dropdown",
                "tooltip",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    pub terms: Vec<String>,
    /// Regular expressions matched against the lowercase tag key
    pub patterns: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        let terms = [
            // nsfw
            "nsfw", "porn", "xxx", "nude", "sex", "onlyfans", "adult", "escort", "fetish",
            "bdsm", "milf", "boobs", "ass", "dick",
            // political
            "trump", "biden", "democrat", "republican", "maga", "liberal", "conservative",
            "election", "vote", "politics", "congress", "senate", "president", "governor",
            "campaign", "ballot",
            // violence
            "war", "conflict", "attack", "bomb", "terror", "death", "died", "killed",
            "murder", "shooting",
        ];
        Self {
            terms: terms.iter().map(|s| s.to_string()).collect(),
            patterns: ["porn", "nsfw", "xxx", "hentai"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuarantorConfig {
    pub max_tags: usize,
    pub top_k: usize,
}

impl Default for GuarantorConfig {
    fn default() -> Self {
        Self {
            max_tags: 2,
            top_k: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_hashtags: usize,
    pub length_budget: usize,
    /// Fixed length every URL counts for, whatever its real length
    pub url_weight: usize,
    pub caps_ratio_max: f64,
    pub language_ratio_min: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_hashtags: 2,
            length_budget: 260,
            url_weight: 23,
            caps_ratio_max: 0.30,
            language_ratio_min: 0.60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoConfig {
    pub code: String,
    pub base_url: String,
    pub utm_source: String,
    pub utm_medium: String,
}

impl Default for PromoConfig {
    fn default() -> Self {
        Self {
            code: "SHA-256-C7E8976BBAF2".to_string(),
            base_url: "https://voltagegpu.com/".to_string(),
            utm_source: "twitter".to_string(),
            utm_medium: "social".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Html,
    Rss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSourceConfig {
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token
    pub bearer_token_env: String,
    pub query: String,
    pub max_results: u32,
}

impl Default for SearchSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.twitter.com/2/tweets/search/recent".to_string(),
            bearer_token_env: "X_BEARER_TOKEN".to_string(),
            query: "lang:en has:hashtags -is:retweet -is:reply".to_string(),
            max_results: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSourceConfig {
    pub name: String,
    pub url: String,
    pub format: FeedFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub timeout_seconds: u64,
    pub max_candidates: usize,
    pub cache_ttl_minutes: u64,
    pub search: Option<SearchSourceConfig>,
    pub aggregators: Vec<AggregatorSourceConfig>,
    pub temporal: bool,
    pub generated: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            max_candidates: 50,
            cache_ttl_minutes: 30,
            search: Some(SearchSourceConfig::default()),
            aggregators: vec![
                AggregatorSourceConfig {
                    name: "getdaytrends".to_string(),
                    url: "https://getdaytrends.com/".to_string(),
                    format: FeedFormat::Html,
                },
                AggregatorSourceConfig {
                    name: "google-trends".to_string(),
                    url: "https://trends.google.com/trending/rss?geo=US".to_string(),
                    format: FeedFormat::Rss,
                },
            ],
            temporal: true,
            generated: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Template attempts before falling back to the canned draft
    pub retry_budget: usize,
    pub cycle_timeout_seconds: u64,
    pub interval_minutes: u64,
    pub account_gap_minutes: u64,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            retry_budget: 3,
            cycle_timeout_seconds: 60,
            interval_minutes: 90,
            account_gap_minutes: 45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_offers() -> Vec<OfferFact> {
    vec![
        OfferFact::new("2x RTX 3090", 0.46, None),
        OfferFact::new("5x RTX A6000", 2.10, Some("Des Moines, US")).with_rival("AWS", 16.29),
        OfferFact::new("8x A100-80GB", 6.02, Some("Washington, US")).with_rival("AWS", 32.77),
        OfferFact::new("8x H200", 26.60, Some("Douglasville, US")).with_rival("AWS", 98.32),
    ]
}

fn default_accounts() -> Vec<AccountConfig> {
    vec![
        AccountConfig {
            id: "account_a".to_string(),
        },
        AccountConfig {
            id: "account_b".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            blacklist: BlacklistConfig::default(),
            guarantor: GuarantorConfig::default(),
            validation: ValidationConfig::default(),
            promo: PromoConfig::default(),
            offers: default_offers(),
            accounts: default_accounts(),
            sources: SourcesConfig::default(),
            compose: ComposeConfig::default(),
            logging: None,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl Config {
    /// Load from TOML, or YAML when the file extension says so.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn default_path() -> &'static str {
        "trendcaster.toml"
    }

    /// Reject values that would make every composition cycle misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit("filter.relevance_min", self.filter.relevance_min)?;
        check_unit("filter.dedup_similarity", self.filter.dedup_similarity)?;
        if self.filter.trend_max_age_minutes == 0 {
            return Err(ConfigError::Zero("filter.trend_max_age_minutes"));
        }

        for pattern in &self.blacklist.patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        if self.guarantor.max_tags == 0 {
            return Err(ConfigError::Zero("guarantor.max_tags"));
        }
        if self.guarantor.top_k == 0 {
            return Err(ConfigError::Zero("guarantor.top_k"));
        }

        let v = &self.validation;
        if v.max_hashtags == 0 {
            return Err(ConfigError::Zero("validation.max_hashtags"));
        }
        if self.guarantor.max_tags > v.max_hashtags {
            return Err(ConfigError::OutOfRange {
                field: "guarantor.max_tags",
                value: self.guarantor.max_tags as f64,
                min: 1.0,
                max: v.max_hashtags as f64,
            });
        }
        if v.length_budget == 0 {
            return Err(ConfigError::Zero("validation.length_budget"));
        }
        if v.url_weight == 0 {
            return Err(ConfigError::Zero("validation.url_weight"));
        }
        check_unit("validation.caps_ratio_max", v.caps_ratio_max)?;
        check_unit("validation.language_ratio_min", v.language_ratio_min)?;

        if self.promo.code.trim().is_empty() {
            return Err(ConfigError::EmptyPromoCode);
        }
        let base = Url::parse(&self.promo.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.promo.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.promo.base_url.clone(),
                reason: "expected an http(s) URL with a host".to_string(),
            });
        }

        if self.offers.is_empty() {
            return Err(ConfigError::NoOffers);
        }
        for offer in &self.offers {
            let rival_price = offer.rival.as_ref().map_or(1.0, |r| r.price_usd_per_hr);
            for price in [offer.price_usd_per_hr, rival_price] {
                if !(price.is_finite() && price > 0.0) {
                    return Err(ConfigError::InvalidOfferPrice(offer.gpu_model.clone()));
                }
            }
        }
        if self.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }

        if self.sources.timeout_seconds == 0 {
            return Err(ConfigError::Zero("sources.timeout_seconds"));
        }
        if self.sources.max_candidates == 0 {
            return Err(ConfigError::Zero("sources.max_candidates"));
        }
        if self.compose.cycle_timeout_seconds == 0 {
            return Err(ConfigError::Zero("compose.cycle_timeout_seconds"));
        }
        if self.compose.interval_minutes == 0 {
            return Err(ConfigError::Zero("compose.interval_minutes"));
        }

        Ok(())
    }
}

fn check_unit(field: &'static str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.relevance_min, 0.55);
        assert_eq!(config.filter.trend_max_age_minutes, 360);
        assert_eq!(config.validation.length_budget, 260);
        assert_eq!(config.validation.url_weight, 23);
        assert_eq!(config.guarantor.max_tags, 2);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = Config::default();
        config.filter.relevance_min = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "filter.relevance_min",
                ..
            })
        ));

        let mut config = Config::default();
        config.validation.caps_ratio_max = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_promo_and_bad_url_rejected() {
        let mut config = Config::default();
        config.promo.code = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPromoCode)));

        let mut config = Config::default();
        config.promo.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_blacklist_pattern_rejected() {
        let mut config = Config::default();
        config.blacklist.patterns.push("(unclosed".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_guarantor_cannot_exceed_hashtag_limit() {
        let mut config = Config::default();
        config.guarantor.max_tags = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trendcaster.toml");

        let mut config = Config::default();
        config.filter.require_fresh = false;
        config.to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert!(!loaded.filter.require_fresh);
        assert_eq!(loaded.offers.len(), 4);
        assert_eq!(loaded.offers, config.offers);
        assert_eq!(loaded.promo.code, "SHA-256-C7E8976BBAF2");
    }

    #[test]
    fn test_rival_price_must_be_positive() {
        let mut config = Config::default();
        assert_eq!(config.offers[3].savings_pct(), Some(72));
        config.offers[0] = config.offers[0].clone().with_rival("AWS", 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOfferPrice(model)) if model == "2x RTX 3090"
        ));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trendcaster.yaml");
        std::fs::write(
            &path,
            "filter:\n  relevance_min: 0.6\npromo:\n  code: TEST-CODE\n  base_url: https://example.com/\n  utm_source: x\n  utm_medium: social\n",
        )
        .unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.filter.relevance_min, 0.6);
        assert_eq!(loaded.filter.dedup_similarity, 0.88);
        assert_eq!(loaded.promo.code, "TEST-CODE");
        assert_eq!(loaded.accounts.len(), 2);
        assert!(loaded.validate().is_ok());
    }
}
