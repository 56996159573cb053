//! Keyword extraction shared by the classifier and the fallback engine

/// Words that never carry classification signal
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "are", "this", "that", "from", "they", "have", "will", "can",
    "all",
];

/// Minimum token length kept (tokens must be strictly longer than this)
pub const MIN_TOKEN_LEN: usize = 2;

/// Tokenize free text into distinct, meaningful, lower-case keywords
///
/// Splits on anything that is not alphanumeric, drops tokens of length
/// [`MIN_TOKEN_LEN`] or less and [`STOP_WORDS`], and keeps first-seen order.
///
/// # Examples
///
/// ```
/// use dutywise_domain::keywords::tokenize;
///
/// let tokens = tokenize("CMOS image sensor for digital camera, image module");
/// assert_eq!(tokens, vec!["cmos", "image", "sensor", "digital", "camera", "module"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > MIN_TOKEN_LEN)
        .filter(|t| !STOP_WORDS.contains(t))
    {
        if !seen.iter().any(|s: &String| s == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// The first `limit` keywords of a description
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut tokens = tokenize(text);
    tokens.truncate(limit);
    tokens
}

/// Whether `token` matches `keyword`, tolerating a plural suffix
pub fn keyword_matches(token: &str, keyword: &str) -> bool {
    token == keyword
        || token.strip_suffix('s') == Some(keyword)
        || token.strip_suffix("es") == Some(keyword)
}
