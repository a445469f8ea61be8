pub mod composer;
pub mod config;
pub mod error;
pub mod filter;
pub mod guarantor;
pub mod history;
pub mod language;
pub mod normalization;
pub mod pipeline;
pub mod similarity;
pub mod trends;
pub mod validator;

pub use composer::{AngleCursor, DraftPost, MarketingAngle, OfferFact, TemplateComposer};
pub use config::Config;
pub use error::{ConfigError, ConfigResult};
pub use filter::{Category, ScoredTag, TrendFilter};
pub use guarantor::{DomainTagGuarantor, FinalTag};
pub use history::{content_hash, ContentHistory, InMemoryHistory};
pub use language::LanguageDetector;
pub use pipeline::AccountPipeline;
pub use trends::{CandidateTag, TrendAggregator, TrendFetcher, TrendSource};
pub use validator::{PostValidator, RuleId, ValidationResult};
