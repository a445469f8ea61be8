use std::collections::HashSet;
use std::fmt;

/// A raw trend string reduced to a clean, comparable hashtag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTag {
    /// Display form, original casing kept, no leading `#`
    pub text: String,
    /// Lowercase comparison key
    pub key: String,
    /// Lowercase CamelCase tokens
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    NonAscii,
    HexColor,
    Numeric,
    Length(usize),
    UiChrome(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "empty after stripping"),
            Rejection::NonAscii => write!(f, "non-ASCII"),
            Rejection::HexColor => write!(f, "hex-color-like"),
            Rejection::Numeric => write!(f, "purely numeric"),
            Rejection::Length(len) => write!(f, "length {len} out of range"),
            Rejection::UiChrome(token) => write!(f, "UI chrome token '{token}'"),
        }
    }
}

const MIN_TAG_LEN: usize = 2;
const MAX_TAG_LEN: usize = 30;

pub struct TagNormalizer {
    noise_tokens: HashSet<String>,
}

impl TagNormalizer {
    pub fn new<I, S>(noise_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            noise_tokens: noise_tokens
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn normalize(&self, raw: &str) -> Result<NormalizedTag, Rejection> {
        let trimmed = raw.trim().trim_start_matches('#');
        if !trimmed.is_ascii() {
            return Err(Rejection::NonAscii);
        }

        let text: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        let text = text.trim_matches('_').to_string();
        if text.is_empty() {
            return Err(Rejection::Empty);
        }

        let key = text.to_lowercase();

        if key.chars().all(|c| c.is_ascii_digit()) {
            return Err(Rejection::Numeric);
        }
        if is_hex_color_like(&key) {
            return Err(Rejection::HexColor);
        }
        if key.len() < MIN_TAG_LEN || key.len() > MAX_TAG_LEN {
            return Err(Rejection::Length(key.len()));
        }
        if self.noise_tokens.contains(&key) {
            return Err(Rejection::UiChrome(key));
        }

        let tokens = split_camel_case(&text);
        Ok(NormalizedTag { text, key, tokens })
    }
}

impl Default for TagNormalizer {
    fn default() -> Self {
        Self::new(crate::config::FilterConfig::default().noise_tokens)
    }
}

/// CSS-style colour codes leak out of scraped pages as `#fff`, `#E0E0E0` or
/// `#1DA1F2`. Case is ignored. A single letter followed by three or more
/// digits is a model name (`A100`, `B200`), not a colour.
pub fn is_hex_color_like(text: &str) -> bool {
    let len = text.len();
    if !matches!(len, 3 | 4 | 6 | 8) {
        return false;
    }
    if !text.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    if is_model_name(text) {
        return false;
    }
    text.chars().any(|c| c.is_ascii_digit()) || len == 3 || len == 6
}

fn is_model_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    first.is_ascii_alphabetic() && rest.len() >= 3 && rest.chars().all(|c| c.is_ascii_digit())
}

/// Split a hashtag into lowercase word tokens.
///
/// `UFCPerth` -> `ufc`, `perth`; `H100Cluster` -> `h100`, `cluster`;
/// `CheapGPUs` -> `cheap`, `gpus`; `machine_learning` -> `machine`, `learning`.
pub fn split_camel_case(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            flush(&mut current, &mut tokens);
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_next = chars.get(i + 2).copied();

            // "GPUs": a trailing plural stays on the acronym
            let plural_acronym =
                next == Some('s') && !after_next.map_or(false, |a| a.is_ascii_lowercase());

            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase()
                    && next.map_or(false, |n| n.is_ascii_lowercase())
                    && !plural_acronym);

            if boundary {
                flush(&mut current, &mut tokens);
            }
        }

        current.push(c.to_ascii_lowercase());
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
