//! Text Normalizer: turns raw extracted text (PDF dumps, scraped pages) into a canonical
//! single-line form containing only ASCII letters, digits and single spaces.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*?>").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w+#]+|[^\w\s+#]").unwrap());

/// Removes markup tags and URLs but keeps punctuation and line structure intact.
///
/// The extractor runs on this form: sentence boundaries and symbols such as the `+` in
/// `c++` are still needed there.
pub fn strip_markup(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, "");
    URL_RE.replace_all(&without_tags, "").into_owned()
}

/// Canonical normalization: strip tags and URLs, drop everything outside `[A-Za-z0-9 ]`,
/// collapse whitespace runs and trim.
///
/// Total and idempotent. Whitespace of any kind (newlines, tabs) separates words rather than
/// being deleted, so `"Python\nSQL"` becomes `"Python SQL"`.
pub fn normalize(raw: &str) -> String {
    let stripped = strip_markup(raw);
    let cleaned = DISALLOWED_RE.replace_all(&stripped, "");
    WHITESPACE_RE.replace_all(cleaned.trim(), " ").into_owned()
}

/// Splits text into lowercase match tokens. Words are runs of word characters plus `+` and
/// `#`; every other non-space character becomes a token of its own.
///
/// Skill phrases and document text go through the same function, so `"C++,"` yields `c++`
/// followed by `,` and matches the vocabulary entry `"c++"`. Punctuation tokens keep phrase
/// matches from spanning a comma or a sentence end.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|token| token.as_str().to_lowercase())
        .collect()
}
