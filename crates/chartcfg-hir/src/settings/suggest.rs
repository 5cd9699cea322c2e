//! "Did you mean" ranking for unknown setting names.
//!
//! Candidates are scored with Jaro-Winkler similarity over cleared names,
//! against both the setting name and its display name. A query made of the
//! same words as a multi-word setting in another order (`time-start`) scores
//! as a near match.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::catalog::{clear_name, SettingDescriptor};

const MAX_SUGGESTIONS: usize = 3;

/// Score of a candidate whose words are a reordering of the query's.
const REORDERED_WORDS: f64 = 0.99;

/// `'a'`, `'a' or 'b'`, `'a', 'b', or 'c'`.
#[must_use]
pub fn format_suggestion_list(suggestions: &[SmolStr]) -> String {
    match suggestions {
        [] => String::new(),
        [one] => format!("'{one}'"),
        [one, two] => format!("'{one}' or '{two}'"),
        [one, two, three, ..] => format!("'{one}', '{two}', or '{three}'"),
    }
}

/// Up to three setting names closest to `query`, best first.
#[must_use]
pub fn top_ranked_suggestions<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a SettingDescriptor>,
) -> Vec<SmolStr> {
    let cleared = clear_name(query);
    if cleared.len() < 3 {
        return Vec::new();
    }
    let words = sorted_words(query);
    let min_score = if cleared.len() < 5 { 0.9 } else { 0.8 };

    let mut seen = FxHashSet::default();
    let mut scored: Vec<(f64, usize, &SmolStr)> = Vec::new();
    for descriptor in candidates {
        let candidate = clear_name(&descriptor.name);
        if candidate == cleared || !seen.insert(candidate.clone()) {
            continue;
        }
        let score = [&descriptor.name, &descriptor.display_name]
            .into_iter()
            .map(|spelling| score(&cleared, &words, spelling))
            .fold(0.0, f64::max);
        if score >= min_score {
            let distance = strsim::damerau_levenshtein(&cleared, &candidate);
            scored.push((score, distance, &descriptor.name));
        }
    }

    scored.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(b.2))
    });
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, _, name)| name.clone())
        .collect()
}

fn score(cleared_query: &str, query_words: &[String], spelling: &str) -> f64 {
    if query_words.len() > 1 && sorted_words(spelling) == query_words {
        return REORDERED_WORDS;
    }
    strsim::jaro_winkler(cleared_query, &clear_name(spelling))
}

/// Lowercase alphabetic words of `name`, sorted.
fn sorted_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = name
        .split(|ch: char| !ch.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    words.sort_unstable();
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ResourceProvider};

    fn suggest(query: &str) -> Vec<SmolStr> {
        let catalog = Catalog::bundled();
        top_ranked_suggestions(query, catalog.all_descriptors().iter().map(|descriptor| &**descriptor))
    }

    #[test]
    fn test_close_spelling_ranks_first() {
        assert_eq!(suggest("colour").first().map(SmolStr::as_str), Some("color"));
        assert_eq!(suggest("strat-time").first().map(SmolStr::as_str), Some("start-time"));
    }

    #[test]
    fn test_reordered_words() {
        assert_eq!(suggest("time-start").first().map(SmolStr::as_str), Some("start-time"));
        assert_eq!(
            suggest("expression alert").first().map(SmolStr::as_str),
            Some("alert-expression")
        );
    }

    #[test]
    fn test_short_or_distant_queries() {
        assert!(suggest("zz").is_empty());
        assert!(suggest("qqqqqqqq").is_empty());
        assert!(suggest("colour").len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_suggestion_list(&["a".into()]), "'a'");
        assert_eq!(
            format_suggestion_list(&["a".into(), "b".into(), "c".into(), "d".into()]),
            "'a', 'b', or 'c'"
        );
    }
}
