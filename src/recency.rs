use crate::query::extract_search_term;

/// How many previous searches are offered for re-issue.
pub const RECENT_SEARCHES: usize = 5;

/// Distinct recent search terms, oldest first, excluding the current one.
///
/// Only adjacent repeats are collapsed, so a term searched, left and searched
/// again shows up twice.
pub fn last_searches<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for url in urls {
        let term = extract_search_term(url.as_ref());
        if terms.last() != Some(&term) {
            terms.push(term);
        }
    }

    let window = terms.len().saturating_sub(RECENT_SEARCHES + 1);
    let mut recent = terms.split_off(window);
    recent.pop();
    recent
}
