use crate::composer::DraftPost;
use crate::config::{Config, ValidationConfig};
use crate::filter::RelevanceScorer;
use crate::language::LanguageDetector;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    HasPromo,
    HasUrl,
    LengthOk,
    HasHashtag,
    #[serde(rename = "max_2_hashtags")]
    Max2Hashtags,
    HasDomainTag,
    LanguageRatio,
    CapsRatio,
}

impl RuleId {
    pub const ALL: [RuleId; 8] = [
        RuleId::HasPromo,
        RuleId::HasUrl,
        RuleId::LengthOk,
        RuleId::HasHashtag,
        RuleId::Max2Hashtags,
        RuleId::HasDomainTag,
        RuleId::LanguageRatio,
        RuleId::CapsRatio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleId::HasPromo => "has_promo",
            RuleId::HasUrl => "has_url",
            RuleId::LengthOk => "length_ok",
            RuleId::HasHashtag => "has_hashtag",
            RuleId::Max2Hashtags => "max_2_hashtags",
            RuleId::HasDomainTag => "has_domain_tag",
            RuleId::LanguageRatio => "language_ratio",
            RuleId::CapsRatio => "caps_ratio",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Measurements taken while validating, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMetrics {
    pub weighted_length: usize,
    pub hashtag_count: usize,
    pub english_ratio: Option<f64>,
    pub caps_ratio: f64,
    /// Non-Latin scripts found in the prose
    pub scripts: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    failed_rules: BTreeSet<RuleId>,
    metrics: ValidationMetrics,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.failed_rules.is_empty()
    }

    pub fn failed_rules(&self) -> &BTreeSet<RuleId> {
        &self.failed_rules
    }

    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(f, "passed")?;
        } else {
            let failed: Vec<&str> = self.failed_rules.iter().map(RuleId::name).collect();
            write!(f, "failed [{}]", failed.join(", "))?;
        }
        write!(
            f,
            " (length {}, hashtags {}, english {}, caps {:.2})",
            self.metrics.weighted_length,
            self.metrics.hashtag_count,
            self.metrics
                .english_ratio
                .map(|r| format!("{r:.2}"))
                .unwrap_or_else(|| "n/a".to_string()),
            self.metrics.caps_ratio
        )?;
        if !self.metrics.scripts.is_empty() {
            write!(f, " scripts {}", self.metrics.scripts.join(", "))?;
        }
        Ok(())
    }
}

fn is_url_token(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

fn is_hashtag_token(token: &str) -> bool {
    token
        .strip_prefix('#')
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_alphanumeric() || c == '_')
}

/// Character count with every URL token weighted as `url_weight`.
pub fn weighted_length(text: &str, url_weight: usize) -> usize {
    let url_chars: usize = text
        .split_whitespace()
        .filter(|t| is_url_token(t))
        .map(|t| t.chars().count())
        .sum();
    let urls = text.split_whitespace().filter(|t| is_url_token(t)).count();
    text.chars().count() - url_chars + urls * url_weight
}

pub fn hashtag_count(text: &str) -> usize {
    text.split_whitespace().filter(|t| is_hashtag_token(t)).count()
}

pub struct PostValidator {
    promo_code: String,
    scorer: RelevanceScorer,
    relevance_min: f64,
    length_budget: usize,
    url_weight: usize,
    max_hashtags: usize,
    caps_ratio_max: f64,
    language_ratio_min: f64,
}

impl PostValidator {
    pub fn new(config: &ValidationConfig, promo_code: &str, relevance_min: f64) -> Self {
        Self {
            promo_code: promo_code.to_string(),
            scorer: RelevanceScorer::new(),
            relevance_min,
            length_budget: config.length_budget,
            url_weight: config.url_weight,
            max_hashtags: config.max_hashtags,
            caps_ratio_max: config.caps_ratio_max,
            language_ratio_min: config.language_ratio_min,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.validation, &config.promo.code, config.filter.relevance_min)
    }

    /// Checks the draft against its own promo code.
    pub fn validate(&self, draft: &DraftPost) -> ValidationResult {
        self.check(&draft.body, &draft.promo_code)
    }

    /// Checks a bare body against the configured promo code.
    pub fn validate_body(&self, body: &str) -> ValidationResult {
        self.check(body, &self.promo_code)
    }

    /// Every rule is evaluated; failures are collected, never short-circuited.
    fn check(&self, body: &str, promo_code: &str) -> ValidationResult {
        let mut failed_rules = BTreeSet::new();

        if promo_code.is_empty() || !body.contains(promo_code) {
            failed_rules.insert(RuleId::HasPromo);
        }

        if !self.has_url(body) {
            failed_rules.insert(RuleId::HasUrl);
        }

        let weighted_length = weighted_length(body, self.url_weight);
        if weighted_length > self.length_budget {
            failed_rules.insert(RuleId::LengthOk);
        }

        let hashtag_count = hashtag_count(body);
        if hashtag_count == 0 {
            failed_rules.insert(RuleId::HasHashtag);
        }
        if hashtag_count > self.max_hashtags {
            failed_rules.insert(RuleId::Max2Hashtags);
        }
        if !self.has_domain_tag(body) {
            failed_rules.insert(RuleId::HasDomainTag);
        }

        let prose = prose(body, promo_code);

        let english_ratio = LanguageDetector::english_ratio(&prose);
        if english_ratio.map_or(false, |r| r < self.language_ratio_min) {
            failed_rules.insert(RuleId::LanguageRatio);
        }

        let caps_ratio = caps_ratio(&prose);
        if caps_ratio >= self.caps_ratio_max {
            failed_rules.insert(RuleId::CapsRatio);
        }

        ValidationResult {
            failed_rules,
            metrics: ValidationMetrics {
                weighted_length,
                hashtag_count,
                english_ratio,
                caps_ratio,
                scripts: LanguageDetector::detect_scripts(&prose),
            },
        }
    }

    fn has_url(&self, body: &str) -> bool {
        body.split_whitespace()
            .filter(|t| is_url_token(t))
            .filter_map(|t| Url::parse(t).ok())
            .any(|url| url.host_str().map_or(false, |h| !h.is_empty()))
    }

    fn has_domain_tag(&self, body: &str) -> bool {
        body.split_whitespace()
            .filter(|t| is_hashtag_token(t))
            .any(|t| self.scorer.score_text(t) >= self.relevance_min)
    }
}

/// The body without URLs, hashtags and the promo code.
fn prose(body: &str, promo_code: &str) -> String {
    body.split_whitespace()
        .filter(|t| !is_url_token(t) && !is_hashtag_token(t))
        .map(|t| {
            if promo_code.is_empty() {
                t.to_string()
            } else {
                t.replace(promo_code, "")
            }
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn caps_ratio(text: &str) -> f64 {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / letters as f64
}
