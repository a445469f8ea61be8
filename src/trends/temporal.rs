use super::{CandidateTag, TrendFetcher, TrendSource};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc, Weekday};

/// Weekday and seasonal hashtags that trend on a predictable calendar.
pub struct TemporalFetcher;

impl TemporalFetcher {
    pub fn new() -> Self {
        Self
    }

    pub fn weekday_tag(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "MondayMotivation",
            Weekday::Tue => "TechTuesday",
            Weekday::Wed => "WednesdayWisdom",
            Weekday::Thu => "ThrowbackThursday",
            Weekday::Fri => "FridayFeeling",
            Weekday::Sat => "SaturdayVibes",
            Weekday::Sun => "SundayFunday",
        }
    }

    pub fn seasonal_tags(month: u32) -> &'static [&'static str] {
        match month {
            1 => &["NewYearGoals"],
            2 => &["SuperBowl"],
            3 => &["MarchMadness"],
            4 => &["SpringBreak"],
            5 => &["GraduationSeason"],
            6 | 7 => &["SummerVibes"],
            8 | 9 => &["BackToSchool"],
            10 => &["Halloween"],
            11 => &["BlackFriday", "CyberMonday"],
            12 => &["HolidaySeason"],
            _ => &[],
        }
    }

    pub fn tags_for(now: DateTime<Utc>) -> Vec<CandidateTag> {
        std::iter::once(Self::weekday_tag(now.weekday()))
            .chain(Self::seasonal_tags(now.month()).iter().copied())
            .map(|tag| CandidateTag::new(tag, TrendSource::Temporal, now).with_score(0.3))
            .collect()
    }
}

impl Default for TemporalFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrendFetcher for TemporalFetcher {
    fn name(&self) -> &str {
        "temporal"
    }

    fn source(&self) -> TrendSource {
        TrendSource::Temporal
    }

    async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>> {
        let mut tags = Self::tags_for(Utc::now());
        tags.truncate(max_count);
        Ok(tags)
    }
}

/// Evergreen domain contexts, so a cycle with no live trends still has
/// on-topic candidates.
pub const SEMANTIC_CONTEXTS: &[&str] = &[
    "GPUComputing",
    "CloudGPU",
    "AIInfrastructure",
    "MLOps",
    "DeepLearning",
    "CloudNative",
    "Serverless",
    "LowLatency",
    "PayPerUse",
    "ElasticScale",
    "HPCCloud",
];

pub struct GeneratedFetcher;

impl GeneratedFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GeneratedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrendFetcher for GeneratedFetcher {
    fn name(&self) -> &str {
        "generated"
    }

    fn source(&self) -> TrendSource {
        TrendSource::Generated
    }

    async fn fetch(&self, max_count: usize) -> anyhow::Result<Vec<CandidateTag>> {
        let now = Utc::now();
        Ok(SEMANTIC_CONTEXTS
            .iter()
            .take(max_count)
            .map(|tag| CandidateTag::new(*tag, TrendSource::Generated, now).with_score(0.2))
            .collect())
    }
}
