//! Text normalization and tokenization.
//!
//! Posts arrive as HTML-ish title/body text. The analyzer turns one raw
//! document into the term sequence the vectorizer counts:
//!
//! ```text
//! raw → strip markup → lowercase → strip accents → tokenize → drop stop words
//! ```
//!
//! Every step is a pure function of the input and the `VectorizerConfig`,
//! so a persisted vectorizer reproduces the exact same terms at inference.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::{StopWords, TokenizerKind, VectorizerConfig};

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

static CODE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.?[\p{L}\p{N}_][\p{L}\p{N}_#+.\-]*").expect("token pattern is valid")
});

/// Common English words that carry no tagging signal.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

static ENGLISH_STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Remove HTML tags and decode the handful of entities post bodies use.
pub fn strip_markup(raw: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(raw, " ");
    without_tags
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        // Must run last so "&amp;lt;" decodes to "&lt;", not "<"
        .replace("&amp;", "&")
}

/// Fold accented characters to their base letters ("café" → "cafe").
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Split normalized text into tokens.
pub fn tokenize(text: &str, kind: TokenizerKind) -> Vec<String> {
    match kind {
        TokenizerKind::Code => CODE_TOKEN
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(['.', '-']))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        TokenizerKind::Whitespace => text.split_whitespace().map(str::to_string).collect(),
    }
}

/// Whether `token` is on the built-in English stop-word list.
pub fn is_english_stop_word(token: &str) -> bool {
    ENGLISH_STOP_WORD_SET.contains(token)
}

/// Applies the configured normalization chain to raw documents.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    config: VectorizerConfig,
}

impl TextAnalyzer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    /// Normalize a raw document to the text that gets tokenized.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = if self.config.strip_markup {
            strip_markup(raw)
        } else {
            raw.to_string()
        };
        if self.config.lowercase {
            text = text.to_lowercase();
        }
        if self.config.strip_accents {
            text = strip_accents(&text);
        }
        text
    }

    /// Full chain: normalize, tokenize, then filter stop words.
    pub fn analyze(&self, raw: &str) -> Vec<String> {
        let normalized = self.normalize(raw);
        let mut tokens = tokenize(&normalized, self.config.tokenizer);
        if self.config.stop_words == StopWords::English {
            tokens.retain(|t| !is_english_stop_word(t));
        }
        tokens
    }
}
