pub const API_BASE: &str = "https://hn.algolia.com/api/v1";
pub const API_SEARCH: &str = "/search";
pub const PARAM_SEARCH: &str = "query=";
pub const PARAM_PAGE: &str = "page=";

/// Where search requests go. Terms are concatenated verbatim, so a term
/// containing `&` or `?` does not survive a trip through the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    base: String,
}

impl Default for SearchEndpoint {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl SearchEndpoint {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, term: &str, page: usize) -> String {
        format!(
            "{}{}?{}{}&{}{}",
            self.base, API_SEARCH, PARAM_SEARCH, term, PARAM_PAGE, page
        )
    }
}

/// Request URL against the public API.
#[allow(dead_code)]
pub fn build_url(term: &str, page: usize) -> String {
    SearchEndpoint::default().url(term, page)
}

/// Recovers the search term from a URL made by [`SearchEndpoint::url`].
pub fn extract_search_term(url: &str) -> String {
    let query = match url.find('?') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };
    let segment = match query.find('&') {
        Some(idx) => &query[..idx],
        None => query,
    };
    segment.replacen(PARAM_SEARCH, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builds_the_search_url() {
        assert_eq!(
            build_url("React", 0),
            "https://hn.algolia.com/api/v1/search?query=React&page=0"
        );
        assert_eq!(
            build_url("rust lang", 3),
            "https://hn.algolia.com/api/v1/search?query=rust lang&page=3"
        );
    }

    #[test]
    fn custom_base_drops_trailing_slash() {
        let endpoint = SearchEndpoint::new("http://127.0.0.1:8080/api/");
        assert_eq!(endpoint.base(), "http://127.0.0.1:8080/api");
        assert_eq!(
            endpoint.url("Redux", 1),
            "http://127.0.0.1:8080/api/search?query=Redux&page=1"
        );
    }

    #[test]
    fn extracts_term_without_page_parameter() {
        assert_eq!(extract_search_term("?query=A"), "A");
        assert_eq!(
            extract_search_term("https://hn.algolia.com/api/v1/search?query=React"),
            "React"
        );
    }

    #[test]
    fn extracts_empty_term() {
        assert_eq!(extract_search_term(&build_url("", 0)), "");
    }

    #[test]
    fn terms_with_reserved_characters_do_not_round_trip() {
        assert_eq!(extract_search_term(&build_url("a&b", 0)), "a");
    }

    proptest! {
        #[test]
        fn extract_inverts_build(term in "[^&?]{0,24}", page in 0usize..1000) {
            prop_assert_eq!(extract_search_term(&build_url(&term, page)), term);
        }
    }
}
