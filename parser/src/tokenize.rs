//! Line tokenization, numeric normalization and key/value pair scanning.
//!
//! Every grammar reads lines through these helpers, so their edge-case
//! behavior (trimming, empty delimiters, `CHECK` sentinels) is shared.

use cardprofile_core::Attribute;

/// Sentinel the benchmark tools write in place of a failed sanity check.
pub const CHECK_SENTINEL: &str = "CHECK";

/// Splits `line` literally on `delimiter` and trims every token.
///
/// There is no quoting or escaping. A line without the delimiter, or an
/// empty delimiter, yields the whole trimmed line as a single token.
///
/// # Examples
///
/// ```
/// use cardprofile_parser::tokenize;
///
/// assert_eq!(tokenize(" a ; b;;c ", ";"), vec!["a", "b", "", "c"]);
/// assert_eq!(tokenize("no delimiter here", ";"), vec!["no delimiter here"]);
/// assert_eq!(tokenize("x :: y", "::"), vec!["x", "y"]);
/// ```
pub fn tokenize<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![line.trim()];
    }
    line.split(delimiter).map(str::trim).collect()
}

/// Normalizes a numeric token to dot-decimal notation.
///
/// Returns `None` for the empty string, the `CHECK` sentinel and anything
/// that does not parse as a real number after replacing `,` with `.`.
/// Valid dot-notation values come back unchanged.
///
/// # Examples
///
/// ```
/// use cardprofile_parser::normalize_numeric;
///
/// assert_eq!(normalize_numeric("103,50").as_deref(), Some("103.50"));
/// assert_eq!(normalize_numeric(" 7.00 ").as_deref(), Some("7.00"));
/// assert_eq!(normalize_numeric("CHECK"), None);
/// assert_eq!(normalize_numeric("n/a"), None);
/// ```
pub fn normalize_numeric(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token == CHECK_SENTINEL {
        return None;
    }
    let normalized = token.replace(',', ".");
    normalized.parse::<f64>().ok().map(|_| normalized)
}

/// Builds an attribute from the first two tokens; a missing value becomes `""`.
pub(crate) fn attribute_from_tokens(tokens: &[&str]) -> Option<Attribute> {
    let name = tokens.first()?;
    let value = tokens.get(1).copied().unwrap_or_default();
    Some(Attribute::new(*name, value))
}

/// Scans `name:` / value pairs starting at token `start`.
///
/// A token ending in `:` is a key (colon stripped) and the token after it
/// is its value, or `""` at the end of the line. Tokens that are not keys
/// are skipped one at a time.
pub(crate) fn colon_pairs<'a>(tokens: &[&'a str], start: usize) -> Vec<(&'a str, &'a str)> {
    let mut pairs = Vec::new();
    let mut i = start;
    while i < tokens.len() {
        match tokens[i].strip_suffix(':') {
            Some(key) => {
                let value = tokens.get(i + 1).copied().unwrap_or_default();
                pairs.push((key, value));
                i += 2;
            }
            None => i += 1,
        }
    }
    pairs
}

/// Reads tokens two at a time as key then value, starting at `start`.
///
/// Pairs where either side is empty are skipped; a dangling last token is
/// ignored.
pub(crate) fn adjacent_pairs<'a>(tokens: &[&'a str], start: usize) -> Vec<(&'a str, &'a str)> {
    let mut pairs = Vec::new();
    let mut i = start;
    while i + 1 < tokens.len() {
        let (key, value) = (tokens[i], tokens[i + 1]);
        if !key.is_empty() && !value.is_empty() {
            pairs.push((key, value));
        }
        i += 2;
    }
    pairs
}
