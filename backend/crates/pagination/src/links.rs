//! Navigation link building for collection responses.

use serde::Serialize;
use url::Url;

use crate::envelope::Page;

/// `self`/`next`/`prev` links for a collection page.
///
/// Links reuse the endpoint's existing query parameters (for example a
/// filtering `id`) and overwrite only `page` and `per_page`, so a client
/// can follow them without reconstructing the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prev: Option<String>,
}

impl PageLinks {
    /// Build links for `page` as served from `endpoint`.
    #[must_use]
    pub fn for_page<T>(endpoint: &Url, page: &Page<T>) -> Self {
        let per_page = page.per_page();
        let next = page
            .has_next()
            .then(|| with_page_params(endpoint, page.page() + 1, per_page));
        let prev = page
            .has_prev()
            .then(|| with_page_params(endpoint, page.page() - 1, per_page));

        Self {
            self_link: with_page_params(endpoint, page.page(), per_page),
            next,
            prev,
        }
    }

    /// Link to the served page itself.
    #[must_use]
    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    /// Link to the following page, when one exists.
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Link to the preceding page, when one exists.
    #[must_use]
    pub fn prev(&self) -> Option<&str> {
        self.prev.as_deref()
    }
}

fn with_page_params(endpoint: &Url, page: u32, per_page: u32) -> String {
    let retained: Vec<(String, String)> = endpoint
        .query_pairs()
        .filter(|(name, _)| name.as_ref() != "page" && name.as_ref() != "per_page")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = endpoint.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &retained {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("page", &page.to_string());
        pairs.append_pair("per_page", &per_page.to_string());
    }
    String::from(url)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "panicking on malformed fixtures is the assertion"
)]
mod tests {
    use super::*;
    use crate::request::PageRequest;
    use rstest::rstest;

    fn endpoint() -> Url {
        Url::parse("https://api.example.test/api/users?id=3").expect("valid url")
    }

    #[rstest]
    fn middle_page_links_in_both_directions() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 6);
        let links = PageLinks::for_page(&endpoint(), &page);

        assert_eq!(
            links.self_link(),
            "https://api.example.test/api/users?id=3&page=2&per_page=2"
        );
        assert_eq!(
            links.next(),
            Some("https://api.example.test/api/users?id=3&page=3&per_page=2")
        );
        assert_eq!(
            links.prev(),
            Some("https://api.example.test/api/users?id=3&page=1&per_page=2")
        );
    }

    #[rstest]
    fn first_page_has_no_prev() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2), 3);
        let links = PageLinks::for_page(&endpoint(), &page);
        assert!(links.prev().is_none());
        assert!(links.next().is_some());
    }

    #[rstest]
    fn stale_page_params_are_overwritten() {
        let url = Url::parse("https://api.example.test/api/users?page=9&per_page=50")
            .expect("valid url");
        let page = Page::new(vec![1], PageRequest::new(1, 10), 1);
        let links = PageLinks::for_page(&url, &page);
        assert_eq!(
            links.self_link(),
            "https://api.example.test/api/users?page=1&per_page=10"
        );
    }
}
