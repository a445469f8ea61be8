use crate::config::BlacklistConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::normalization::NormalizedTag;
use regex::Regex;
use std::collections::HashSet;

/// Terms this long are also matched inside compound tags ("Trump2028").
/// Shorter ones only match a whole CamelCase token, so "Warriors" is not "war".
const SUBSTRING_MIN_LEN: usize = 5;

pub struct Blacklist {
    terms: HashSet<String>,
    substring_terms: Vec<String>,
    patterns: Vec<Regex>,
}

impl Blacklist {
    pub fn from_config(config: &BlacklistConfig) -> ConfigResult<Self> {
        let terms: HashSet<String> = config
            .terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut substring_terms: Vec<String> = terms
            .iter()
            .filter(|t| t.len() >= SUBSTRING_MIN_LEN)
            .cloned()
            .collect();
        substring_terms.sort();

        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            terms,
            substring_terms,
            patterns,
        })
    }

    /// The term or pattern that blocks this tag, if any.
    pub fn matched(&self, tag: &NormalizedTag) -> Option<String> {
        if let Some(token) = tag.tokens.iter().find(|t| self.terms.contains(t.as_str())) {
            return Some(token.clone());
        }
        if let Some(term) = self.substring_terms.iter().find(|t| tag.key.contains(t.as_str())) {
            return Some(term.clone());
        }
        self.patterns
            .iter()
            .find(|p| p.is_match(&tag.key))
            .map(|p| format!("/{}/", p.as_str()))
    }

    pub fn is_blocked(&self, tag: &NormalizedTag) -> bool {
        self.matched(tag).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::TagNormalizer;

    fn blocked(blacklist: &Blacklist, raw: &str) -> bool {
        let tag = TagNormalizer::default().normalize(raw).unwrap();
        blacklist.is_blocked(&tag)
    }

    #[test]
    fn test_default_terms() {
        let blacklist = Blacklist::from_config(&BlacklistConfig::default()).unwrap();
        assert!(blocked(&blacklist, "#NoWar"));
        assert!(blocked(&blacklist, "#Trump2028"));
        assert!(blocked(&blacklist, "#ElectionNight"));
        assert!(blocked(&blacklist, "#nsfw"));
        assert!(blocked(&blacklist, "#PornHub"));
    }

    #[test]
    fn test_short_terms_need_whole_token() {
        let blacklist = Blacklist::from_config(&BlacklistConfig::default()).unwrap();
        assert!(!blocked(&blacklist, "#GoldenStateWarriors"));
        assert!(!blocked(&blacklist, "#ClassicRock"));
        assert!(!blocked(&blacklist, "#Sussex"));
        assert!(!blocked(&blacklist, "#GPUCloud"));
    }

    #[test]
    fn test_custom_pattern() {
        let config = BlacklistConfig {
            terms: vec![],
            patterns: vec![r"^crypto".to_string()],
        };
        let blacklist = Blacklist::from_config(&config).unwrap();
        assert!(blocked(&blacklist, "#CryptoPump"));
        assert!(!blocked(&blacklist, "#CloudCrypto"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = BlacklistConfig {
            terms: vec![],
            patterns: vec!["[".to_string()],
        };
        assert!(Blacklist::from_config(&config).is_err());
    }
}
