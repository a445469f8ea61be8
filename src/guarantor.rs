use crate::composer::MarketingAngle;
use crate::config::Config;
use crate::filter::{Category, RelevanceScorer, ScoredTag};
use crate::similarity::TermVector;
use log::debug;

/// A hashtag that will be rendered on the post.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalTag {
    pub text: String,
    pub relevance: f64,
    pub category: Category,
    pub synthesized: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LibraryEntry {
    pub tag: &'static str,
    pub angle: MarketingAngle,
    pub keywords: &'static [&'static str],
}

/// Domain hashtags available for synthesis. Order is the tie-break: on equal
/// scores the earlier entry wins.
pub const DOMAIN_TAG_LIBRARY: &[LibraryEntry] = &[
    LibraryEntry {
        tag: "CloudCost",
        angle: MarketingAngle::Cost,
        keywords: &["cost", "cheap", "price", "budget", "save", "cloud", "pay"],
    },
    LibraryEntry {
        tag: "GPUPricing",
        angle: MarketingAngle::Cost,
        keywords: &["gpu", "price", "pricing", "hourly", "rent", "cost"],
    },
    LibraryEntry {
        tag: "LowLatency",
        angle: MarketingAngle::Latency,
        keywords: &["latency", "fast", "speed", "live", "realtime", "stream", "lag"],
    },
    LibraryEntry {
        tag: "FastInference",
        angle: MarketingAngle::Latency,
        keywords: &["inference", "fast", "model", "serving", "response", "ai"],
    },
    LibraryEntry {
        tag: "AutoScale",
        angle: MarketingAngle::Autoscale,
        keywords: &["scale", "autoscale", "traffic", "spike", "surge", "burst", "demand"],
    },
    LibraryEntry {
        tag: "ElasticGPU",
        angle: MarketingAngle::Autoscale,
        keywords: &["elastic", "gpu", "scale", "grow", "burst", "launch"],
    },
    LibraryEntry {
        tag: "GlobalGPU",
        angle: MarketingAngle::Regions,
        keywords: &["global", "region", "world", "worldwide", "edge", "local"],
    },
    LibraryEntry {
        tag: "MultiRegionGPU",
        angle: MarketingAngle::Regions,
        keywords: &["region", "multi", "gpu", "deploy", "near", "fans"],
    },
    LibraryEntry {
        tag: "HighAvailability",
        angle: MarketingAngle::Uptime,
        keywords: &["uptime", "availability", "reliable", "always", "outage", "downtime"],
    },
    LibraryEntry {
        tag: "ReliableCompute",
        angle: MarketingAngle::Uptime,
        keywords: &["reliable", "compute", "stable", "uptime", "data"],
    },
    LibraryEntry {
        tag: "GPUSupport",
        angle: MarketingAngle::Support,
        keywords: &["support", "help", "expert", "team", "engineer", "gpu"],
    },
    LibraryEntry {
        tag: "CloudGPU",
        angle: MarketingAngle::Support,
        keywords: &["render", "rendering", "studio", "frames", "gpu"],
    },
];

/// Words that carry an off-topic category over to compute.
pub fn bridge_vocabulary(category: Category) -> &'static [&'static str] {
    match category {
        Category::Sports => &["traffic", "spike", "surge", "live", "stream", "scale", "fans"],
        Category::Entertainment => &["stream", "render", "rendering", "live", "fast", "scale"],
        Category::News => &["launch", "traffic", "data", "fast", "scale", "surge"],
        Category::Tech => &["gpu", "compute", "inference", "cloud"],
        Category::Other => &["gpu", "cloud", "compute"],
    }
}

const ANGLE_HINT_BONUS: f64 = 0.3;

/// Ensures the final hashtag set always carries at least one on-topic tag.
pub struct DomainTagGuarantor {
    scorer: RelevanceScorer,
    relevance_min: f64,
    max_tags: usize,
    top_k: usize,
}

impl DomainTagGuarantor {
    pub fn new(relevance_min: f64, max_tags: usize, top_k: usize) -> Self {
        Self {
            scorer: RelevanceScorer::new(),
            relevance_min,
            max_tags: max_tags.max(1),
            top_k: top_k.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.filter.relevance_min,
            config.guarantor.max_tags,
            config.guarantor.top_k,
        )
    }

    fn is_relevant(&self, tag: &ScoredTag) -> bool {
        tag.relevance >= self.relevance_min
    }

    fn final_tag(tag: &ScoredTag) -> FinalTag {
        FinalTag {
            text: tag.text.clone(),
            relevance: tag.relevance,
            category: tag.category,
            synthesized: false,
        }
    }

    /// Pick the library entry closest to the trend. Ties go to the lower index.
    pub fn synthesize(&self, trend: Option<&ScoredTag>, angle_hint: Option<MarketingAngle>) -> FinalTag {
        let category = trend.map_or(Category::Other, |t| t.category);

        let mut query = TermVector::from_terms(bridge_vocabulary(category));
        if let Some(trend) = trend {
            query.merge(&TermVector::from_terms(&trend.tokens));
        }

        let mut best = &DOMAIN_TAG_LIBRARY[0];
        let mut best_score = f64::NEG_INFINITY;
        for entry in DOMAIN_TAG_LIBRARY {
            let mut score = query.cosine(&TermVector::from_terms(entry.keywords));
            if angle_hint == Some(entry.angle) {
                score += ANGLE_HINT_BONUS;
            }
            if score > best_score {
                best = entry;
                best_score = score;
            }
        }

        debug!(
            "Synthesized #{} for {} trend (score {:.3})",
            best.tag,
            category,
            best_score
        );

        FinalTag {
            text: best.tag.to_string(),
            relevance: self.scorer.score_text(best.tag),
            category: Category::Tech,
            synthesized: true,
        }
    }

    /// At most `max_tags` tags, trend first, with at least one that is
    /// domain-relevant or synthesized.
    pub fn guarantee(&self, ranked: &[ScoredTag], angle_hint: Option<MarketingAngle>) -> Vec<FinalTag> {
        let Some(trend) = ranked.first() else {
            return vec![self.synthesize(None, angle_hint)];
        };

        if self.is_relevant(trend) {
            return vec![Self::final_tag(trend)];
        }

        let domain = ranked
            .iter()
            .take(self.top_k)
            .skip(1)
            .find(|t| self.is_relevant(t))
            .map(Self::final_tag)
            .unwrap_or_else(|| self.synthesize(Some(trend), angle_hint));

        if self.max_tags < 2 {
            return vec![domain];
        }
        vec![Self::final_tag(trend), domain]
    }
}
