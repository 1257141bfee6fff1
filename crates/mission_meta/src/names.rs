//! Mission name normalization and the small pattern matchers used by the
//! lookup fallbacks.

use common::config::MetadataConfig;

/// Strips rocket-variant prefixes such as `"Falcon 9 Block 5 | "`.
#[derive(Debug, Clone)]
pub struct NameCleaner {
    prefixes: Vec<String>,
}

impl NameCleaner {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(config.name_prefixes.clone())
    }

    /// Remove every configured prefix (case-insensitive, all occurrences,
    /// in configured order) and trim.
    pub fn clean(&self, name: &str) -> String {
        let mut cleaned = name.to_string();
        for prefix in &self.prefixes {
            cleaned = remove_all_ignore_case(&cleaned, prefix);
        }
        cleaned.trim().to_string()
    }
}

impl Default for NameCleaner {
    fn default() -> Self {
        Self::from_config(&MetadataConfig::default())
    }
}

fn remove_all_ignore_case(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(&needle) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

fn leading_digits(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

/// Find `<code>[- ]?<digits>` anywhere in `name` (case-insensitive) and
/// return the digits of the first match.
pub fn code_number<'a>(name: &'a str, code: &str) -> Option<&'a str> {
    let lower = name.to_ascii_lowercase();
    let code = code.to_ascii_lowercase();

    let mut from = 0;
    while let Some(found) = lower[from..].find(&code) {
        let after = from + found + code.len();
        let rest = &name[after..];
        let rest = rest
            .strip_prefix('-')
            .or_else(|| rest.strip_prefix(' '))
            .unwrap_or(rest);
        if let Some(digits) = leading_digits(rest) {
            return Some(digits);
        }
        from = from + found + 1;
    }
    None
}

/// Find `starlink <ws> group <ws> <a>[- ]<b>` (case-insensitive) and return
/// the two group numbers.
pub fn starlink_group(name: &str) -> Option<(&str, &str)> {
    let lower = name.to_ascii_lowercase();

    let mut from = 0;
    while let Some(found) = lower[from..].find("starlink") {
        let start = from + found;
        if let Some(group) = parse_group_tail(&name[start + "starlink".len()..]) {
            return Some(group);
        }
        from = start + 1;
    }
    None
}

fn parse_group_tail(rest: &str) -> Option<(&str, &str)> {
    let rest = strip_required_whitespace(rest)?;
    if !rest.get(..5)?.eq_ignore_ascii_case("group") {
        return None;
    }
    let rest = strip_required_whitespace(&rest[5..])?;
    let first = leading_digits(rest)?;
    let rest = &rest[first.len()..];
    let rest = rest.strip_prefix('-').or_else(|| rest.strip_prefix(' '))?;
    let second = leading_digits(rest)?;
    Some((first, second))
}

fn strip_required_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

/// All maximal digit runs in `name`, in order.
pub fn digit_runs(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}
