use crate::language::LanguageDetector;
use crate::normalization::split_camel_case;
use crate::similarity::TermVector;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DOMAIN_KEYWORDS: &[&str] = &[
    "ai", "gpu", "gpus", "llm", "llms", "ml", "cloud", "inference", "training", "rendering",
    "compute", "computing", "latency", "autoscale", "autoscaling", "scale", "scaling",
    "deep", "learning", "machine", "neural", "model", "models", "deployment", "serverless",
    "kubernetes", "k8s", "docker", "api", "performance", "optimization", "cuda", "tensor",
    "pytorch", "tensorflow", "huggingface", "openai", "anthropic", "gemini", "llama",
    "mistral", "nvidia", "transformer", "serving", "acceleration", "endpoint", "algorithm",
    "processing", "parallel", "distributed", "cluster", "node", "instance", "pods",
    "container", "orchestration", "infrastructure", "infra", "bandwidth", "throughput",
    "uptime", "availability", "mlops", "hpc", "datacenter", "h100", "h200", "a100",
    "rtx", "genai", "pricing", "region", "regions", "elastic",
];

/// Adjacent tech vocabulary: on the way to the domain but not in it.
pub const ADJACENT_SYNONYMS: &[&str] = &[
    "tech", "code", "coding", "dev", "devops", "developer", "data", "software", "app",
    "apps", "chip", "chips", "semiconductor", "server", "servers", "quantum", "cyber",
    "digital", "robot", "robotics", "automation", "startup", "saas", "enterprise",
    "programming", "opensource", "linux", "python", "rust", "hardware", "silicon",
];

const SPORTS_KEYWORDS: &[&str] = &[
    "ufc", "mma", "boxing", "fight", "fightnight", "nfl", "nba", "mlb", "nhl", "wnba",
    "soccer", "football", "baseball", "basketball", "hockey", "tennis", "golf", "f1",
    "olympics", "worldcup", "championship", "league", "cup", "match", "gameday",
    "superbowl", "playoffs", "derby", "grandprix", "marchmadness", "premier",
    "worldseries", "wrestling", "cricket", "rugby", "race", "racing",
];

const ENTERTAINMENT_KEYWORDS: &[&str] = &[
    "music", "concert", "festival", "movie", "movies", "film", "netflix", "disney",
    "gaming", "xbox", "playstation", "nintendo", "album", "tour", "oscars", "grammys",
    "emmys", "trailer", "premiere", "anime", "kpop", "tv", "series", "episode",
    "celebrity", "fashion", "funday", "vibes", "halloween", "show", "song", "streaming",
];

const NEWS_KEYWORDS: &[&str] = &[
    "breaking", "news", "alert", "launch", "release", "announcement", "update",
    "earnings", "report", "summit", "conference", "weather", "storm", "earthquake",
    "market", "markets", "stocks", "economy", "cybermonday", "blackfriday",
];

static MATCHUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{2,}vs[a-z0-9]{2,}$").expect("valid matchup regex"));

static DOMAIN_TRIGRAMS: Lazy<TermVector> = Lazy::new(|| {
    let mut vector = TermVector::default();
    for keyword in DOMAIN_KEYWORDS {
        vector.merge(&TermVector::from_trigrams(keyword));
    }
    vector
});

pub const EXACT_SCORE: f64 = 0.85;
pub const EXTRA_EXACT_BONUS: f64 = 0.05;
pub const PARTIAL_SCORE: f64 = 0.65;
pub const SYNONYM_SCORE: f64 = 0.45;
pub const FALLBACK_WEIGHT: f64 = 0.3;
const MIN_STEM_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Tech,
    Entertainment,
    News,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Sports => "sports",
            Category::Tech => "tech",
            Category::Entertainment => "entertainment",
            Category::News => "news",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relevance {
    pub score: f64,
    pub synonym_hit: bool,
}

/// Keyword-overlap relevance of a tag to GPU / AI / cloud compute.
pub struct RelevanceScorer {
    keywords: HashSet<&'static str>,
    synonyms: HashSet<&'static str>,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RelevanceScorer {
    pub fn new() -> Self {
        Self {
            keywords: DOMAIN_KEYWORDS.iter().copied().collect(),
            synonyms: ADJACENT_SYNONYMS.iter().copied().collect(),
        }
    }

    /// A keyword inside a compound ("gpucloud"), or a truncated keyword
    /// ("infer"). Truncations must be 5+ chars and not everyday English, so
    /// "mode", "open" and "train" do not pass for "model", "openai" and "training".
    fn is_partial(&self, token: &str) -> bool {
        let may_be_stem = token.len() >= MIN_STEM_LEN && !LanguageDetector::is_english_word(token);
        DOMAIN_KEYWORDS.iter().any(|k| {
            let compound = k.len() >= 3
                && token.len() > k.len()
                && (token.starts_with(k) || token.ends_with(k));
            let stem = may_be_stem && k.len() > token.len() && k.starts_with(token);
            compound || stem
        })
    }

    pub fn score_tokens(&self, tokens: &[String]) -> Relevance {
        let exact = tokens
            .iter()
            .filter(|t| self.keywords.contains(t.as_str()))
            .count();
        let synonym_hit = tokens.iter().any(|t| self.synonyms.contains(t.as_str()));

        let score = if exact > 0 {
            (EXACT_SCORE + EXTRA_EXACT_BONUS * (exact - 1) as f64).min(1.0)
        } else if tokens.iter().any(|t| self.is_partial(t)) {
            PARTIAL_SCORE
        } else if synonym_hit {
            SYNONYM_SCORE
        } else {
            let joined: String = tokens.concat();
            FALLBACK_WEIGHT * TermVector::from_trigrams(&joined).cosine(&DOMAIN_TRIGRAMS)
        };

        Relevance { score, synonym_hit }
    }

    /// Score a display tag such as `LowLatency` or `#GPUCloud`.
    pub fn score_text(&self, text: &str) -> f64 {
        let tokens = split_camel_case(text.trim_start_matches('#'));
        self.score_tokens(&tokens).score
    }

    pub fn classify(&self, tokens: &[String], relevance: Relevance, relevance_min: f64) -> Category {
        if relevance.score >= relevance_min || relevance.synonym_hit {
            return Category::Tech;
        }

        let key: String = tokens.concat();
        let has_any = |set: &[&str]| {
            tokens.iter().any(|t| set.contains(&t.as_str())) || set.contains(&key.as_str())
        };

        if has_any(SPORTS_KEYWORDS) || MATCHUP.is_match(&key) {
            Category::Sports
        } else if has_any(ENTERTAINMENT_KEYWORDS) {
            Category::Entertainment
        } else if has_any(NEWS_KEYWORDS) {
            Category::News
        } else {
            Category::Other
        }
    }

    /// Category for a display tag when no scored tag is at hand.
    pub fn classify_text(&self, text: &str, relevance_min: f64) -> Category {
        let tokens = split_camel_case(text.trim_start_matches('#'));
        let relevance = self.score_tokens(&tokens);
        self.classify(&tokens, relevance, relevance_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        split_camel_case(text)
    }

    #[test]
    fn test_enough_domain_keywords() {
        assert!(DOMAIN_KEYWORDS.len() >= 50);
    }

    #[test]
    fn test_exact_match_scores() {
        let scorer = RelevanceScorer::new();
        assert_eq!(scorer.score_text("#AI"), 0.85);
        assert!((scorer.score_text("GPUCloud") - 0.90).abs() < 1e-9);
        assert!((scorer.score_text("GPUCloudInferenceTrainingLatency") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_and_synonym_scores() {
        let scorer = RelevanceScorer::new();
        assert_eq!(scorer.score_text("gpucloud"), PARTIAL_SCORE);
        assert_eq!(scorer.score_text("InferDay"), PARTIAL_SCORE);
        assert_eq!(scorer.score_text("TechTuesday"), SYNONYM_SCORE);
    }

    #[test]
    fn test_everyday_words_are_not_keyword_stems() {
        let scorer = RelevanceScorer::new();
        for text in ["DarkMode", "OpenHouse", "TrainStrike", "BandPractice"] {
            let score = scorer.score_text(text);
            assert!(score < 0.55, "{text} scored {score}");
        }
        assert!(scorer.score_text("ModelTraining") >= 0.85);
    }

    #[test]
    fn test_off_topic_scores_near_zero() {
        let scorer = RelevanceScorer::new();
        let ufc = scorer.score_text("UFCPerth");
        let sunday = scorer.score_text("Sunday");
        assert!(ufc < 0.2, "UFCPerth scored {ufc}");
        assert!(sunday < 0.2, "Sunday scored {sunday}");
        assert!(scorer.score_text("CapitalOne") < 0.55);
    }

    #[test]
    fn test_classification() {
        let scorer = RelevanceScorer::new();
        assert_eq!(scorer.classify_text("UFCPerth", 0.55), Category::Sports);
        assert_eq!(scorer.classify_text("lakersvsceltics", 0.55), Category::Sports);
        assert_eq!(scorer.classify_text("NetflixAndChill", 0.55), Category::Entertainment);
        assert_eq!(scorer.classify_text("BreakingNews", 0.55), Category::News);
        assert_eq!(scorer.classify_text("CloudGPU", 0.55), Category::Tech);
        assert_eq!(scorer.classify_text("TechTuesday", 0.55), Category::Tech);
        assert_eq!(scorer.classify_text("Sunday", 0.55), Category::Other);
    }

    #[test]
    fn test_relevance_bounds() {
        let scorer = RelevanceScorer::new();
        for text in ["x", "GPUGPUGPUGPUGPUGPU", "Perth", "ModelTraining", "DataDay"] {
            let score = scorer.score_tokens(&tokens(text)).score;
            assert!((0.0..=1.0).contains(&score), "{text} -> {score}");
        }
    }
}
