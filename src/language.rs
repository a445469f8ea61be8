use once_cell::sync::Lazy;
use std::collections::HashSet;

// Common English plus the product vocabulary the templates are written in.
const ENGLISH_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "always", "am", "an", "and", "any", "are",
    "around", "as", "ask", "at", "away", "back", "bad", "be", "been", "before", "being",
    "best", "better", "big", "both", "but", "by", "call", "came", "can", "come", "could",
    "day", "did", "do", "does", "done", "down", "during", "each", "early", "easy", "else",
    "even", "every", "few", "find", "first", "for", "free", "from", "full", "get", "give",
    "go", "good", "got", "great", "had", "has", "have", "he", "her", "here", "high", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "just", "keep", "know", "last",
    "less", "let", "like", "little", "long", "look", "low", "made", "make", "many", "may",
    "me", "might", "more", "most", "much", "must", "my", "need", "never", "new", "next",
    "no", "not", "nothing", "now", "of", "off", "on", "one", "only", "or", "other", "our",
    "out", "over", "own", "per", "right", "same", "say", "see", "she", "should", "small",
    "so", "some", "something", "start", "still", "such", "take", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "thing", "think", "this", "those",
    "through", "time", "to", "today", "tonight", "too", "try", "two", "under", "until",
    "up", "us", "use", "very", "want", "was", "way", "we", "well", "were", "what", "when",
    "where", "which", "while", "who", "why", "will", "with", "without", "work", "would",
    "yes", "you", "your", "all", "already", "ready", "real", "while", "whole", "worth",
    // time
    "hour", "hr", "minute", "second", "week", "month", "year", "night", "morning",
    "weekend", "season", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday",
    // events and hooks
    "game", "fight", "match", "fan", "crowd", "live", "stream", "watch", "show", "drop",
    "launch", "release", "news", "breaking", "story", "headline", "update", "moment",
    "trend", "trending", "viral", "buzz", "hype", "event", "party", "music", "movie",
    "play", "player", "team", "win", "score", "final", "round", "card", "main", "big",
    "everyone", "talking", "internet", "world", "global", "local", "loud", "busy",
    "wild", "huge", "hot", "peak", "rush", "wave", "surge", "spike", "flood", "storm",
    // product
    "gpu", "gpus", "compute", "cloud", "server", "cluster", "node", "pod", "instance",
    "model", "inference", "training", "train", "latency", "deploy", "deployment",
    "scale", "autoscale", "scaling", "region", "regional", "uptime", "support",
    "expert", "engineer", "team", "cost", "price", "pricing", "budget", "cheap", "cheaper",
    "pay", "bill", "billing", "usage", "value", "save", "saving", "spend", "fast",
    "faster", "speed", "quick", "instant", "instantly", "second", "minute", "load",
    "traffic", "workload", "job", "queue", "wait", "waiting", "idle", "burst", "demand",
    "capacity", "reliable", "available", "availability", "stable", "steady", "online",
    "code", "promo", "deal", "offer", "discount", "link", "run", "ship", "build",
    "data", "api", "app", "user", "request", "response", "edge", "close", "near",
    "closer", "nearby", "anywhere", "worldwide", "zone", "handle", "help", "human",
    "real", "answer", "ticket", "chat", "fix", "stuck", "ai", "llm", "ml", "neural",
    "network", "deep", "learning", "machine", "serve", "serving", "render", "rendering",
    "auto", "automatic", "grow", "growth", "shrink", "idle", "elastic", "flexible",
    "down", "downtime", "outage", "always", "guaranteed", "seamless", "smooth", "zero",
    "lag", "ping", "millisecond", "global", "nine", "around", "clock", "hand", "hands",
    "unlock", "grab", "claim", "check", "spin", "rent", "own", "hardware", "plan",
    "lock", "contract", "surprise", "no", "fee", "extra", "hidden", "simple",
    "power", "powered", "ahead", "behind", "cold", "warm", "heavy", "light", "top",
    "builder", "crunch", "cut", "pick", "shipping", "break", "bring", "choice", "count",
    "deserve", "everywhere", "move", "plus", "quiet", "sleep", "stay", "below", "charge",
    "markup", "skip",
];

static LEXICON: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH_WORDS.iter().copied().collect());

/// Minimum alphabetic tokens before a ratio is meaningful
pub const MIN_TOKENS_FOR_RATIO: usize = 3;

pub struct LanguageDetector;

impl LanguageDetector {
    /// Lexicon lookup with light suffix stripping ("spikes", "scaled", "serving").
    pub fn is_english_word(word: &str) -> bool {
        let word = word.to_ascii_lowercase();
        if LEXICON.contains(word.as_str()) {
            return true;
        }

        let stems = [
            word.strip_suffix("es"),
            word.strip_suffix('s'),
            word.strip_suffix("ed"),
            word.strip_suffix('d'),
            word.strip_suffix("ing"),
            word.strip_suffix("ly"),
            word.strip_suffix("er"),
        ];
        if stems
            .iter()
            .flatten()
            .any(|stem| stem.len() >= 2 && LEXICON.contains(stem))
        {
            return true;
        }

        // "scaling" -> "scale"
        word.strip_suffix("ing")
            .map(|stem| format!("{stem}e"))
            .map_or(false, |stem| LEXICON.contains(stem.as_str()))
    }

    /// Alphabetic tokens of `text`. Tokens carrying digits are skipped, hyphenated
    /// words are split, and tokens in a non-Latin script are kept so they count
    /// against the ratio.
    pub fn alphabetic_tokens(text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for raw in text.split_whitespace() {
            if raw.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            for part in raw.split(['-', '/']) {
                let word = part.trim_matches(|c: char| !c.is_alphabetic());
                let word = word.trim_end_matches("'s").trim_end_matches("'");
                if !word.is_empty() && word.chars().any(|c| c.is_alphabetic()) {
                    tokens.push(word.to_string());
                }
            }
        }
        tokens
    }

    /// All-caps tokens such as "RTX" or "US" read the same in any language.
    fn is_acronym(token: &str) -> bool {
        token.len() >= 2 && token.chars().all(|c| c.is_ascii_uppercase())
    }

    /// Share of alphabetic tokens that are English, or `None` when there are
    /// too few tokens to judge. Acronyms are left out of both sides.
    pub fn english_ratio(text: &str) -> Option<f64> {
        let tokens: Vec<String> = Self::alphabetic_tokens(text)
            .into_iter()
            .filter(|t| !Self::is_acronym(t))
            .collect();
        if tokens.len() < MIN_TOKENS_FOR_RATIO {
            return None;
        }

        let english = tokens
            .iter()
            .filter(|t| t.is_ascii() && Self::is_english_word(t))
            .count();
        Some(english as f64 / tokens.len() as f64)
    }

    fn contains_japanese(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(c,
                '\u{3040}'..='\u{309F}' |  // Hiragana
                '\u{30A0}'..='\u{30FF}'    // Katakana
            )
        })
    }

    fn contains_chinese(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(c,
                '\u{4E00}'..='\u{9FAF}' |  // CJK Unified Ideographs
                '\u{3400}'..='\u{4DBF}'    // CJK Extension A
            )
        })
    }

    fn contains_korean(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(c,
                '\u{AC00}'..='\u{D7AF}' |  // Hangul Syllables
                '\u{1100}'..='\u{11FF}' |  // Hangul Jamo
                '\u{3130}'..='\u{318F}'    // Hangul Compatibility Jamo
            )
        })
    }

    fn contains_arabic(text: &str) -> bool {
        text.chars()
            .any(|c| matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}'))
    }

    fn contains_cyrillic(text: &str) -> bool {
        text.chars()
            .any(|c| matches!(c, '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}'))
    }

    fn contains_thai(text: &str) -> bool {
        text.chars().any(|c| matches!(c, '\u{0E00}'..='\u{0E7F}'))
    }

    fn contains_hebrew(text: &str) -> bool {
        text.chars().any(|c| matches!(c, '\u{0590}'..='\u{05FF}'))
    }

    /// Non-Latin scripts present in the text, for diagnostics.
    pub fn detect_scripts(text: &str) -> Vec<&'static str> {
        let mut scripts = Vec::new();

        if Self::contains_japanese(text) {
            scripts.push("Japanese");
        }
        if Self::contains_chinese(text) {
            scripts.push("Chinese");
        }
        if Self::contains_korean(text) {
            scripts.push("Korean");
        }
        if Self::contains_arabic(text) {
            scripts.push("Arabic");
        }
        if Self::contains_cyrillic(text) {
            scripts.push("Cyrillic");
        }
        if Self::contains_thai(text) {
            scripts.push("Thai");
        }
        if Self::contains_hebrew(text) {
            scripts.push("Hebrew");
        }

        scripts
    }
}
