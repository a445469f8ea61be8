use thiserror::Error;

/// Configuration misuse detected at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("Promo code cannot be empty")]
    EmptyPromoCode,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid blacklist pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("At least one offer must be configured")]
    NoOffers,

    #[error("At least one account must be configured")]
    NoAccounts,

    #[error("Offer '{0}' has a non-positive price")]
    InvalidOfferPrice(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
