/// Shortest token kept; single characters carry no signal for matching.
const MIN_TOKEN_CHARS: usize = 2;

/// Lowercases `text` and splits it on every non-alphanumeric character.
///
/// Used for both corpus indexing and query encoding; any change here changes both sides.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(|t| t.to_lowercase())
        .collect()
}
