//! Page request parsing and clamping.

use thiserror::Error;

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound on the page size a caller may request.
///
/// The serving layer must clamp caller-controlled page sizes to bound the
/// resources a single request can consume.
pub const MAX_PER_PAGE: u32 = 100;

/// A validated, clamped request for one page of a collection.
///
/// Pages are 1-indexed. Construction clamps the page number to at least 1
/// and the page size into `1..=`[`MAX_PER_PAGE`], so a `PageRequest` is
/// always safe to turn into a SQL limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a request, clamping out-of-range values.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// The first page with the default page size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }

    /// Parse raw query-string parameters into a request.
    ///
    /// Missing parameters fall back to page 1 and [`DEFAULT_PER_PAGE`];
    /// present but non-numeric values are rejected.
    pub fn from_params(
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<Self, PageParamError> {
        let page = parse_param("page", page, 1)?;
        let per_page = parse_param("per_page", per_page, DEFAULT_PER_PAGE)?;
        Ok(Self::new(page, per_page))
    }

    /// The 1-indexed page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// The clamped page size.
    #[must_use]
    pub const fn per_page(self) -> u32 {
        self.per_page
    }

    /// The page size as a SQL `LIMIT` value.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.per_page as i64
    }

    /// The number of rows to skip as a SQL `OFFSET` value.
    #[must_use]
    pub const fn offset(self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// The request for the page after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self::new(self.page.saturating_add(1), self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

fn parse_param(
    name: &'static str,
    value: Option<&str>,
    fallback: u32,
) -> Result<u32, PageParamError> {
    match value {
        None => Ok(fallback),
        Some(raw) => raw.trim().parse().map_err(|_| PageParamError::InvalidNumber {
            name,
            value: raw.to_owned(),
        }),
    }
}

/// Errors raised while parsing caller-supplied pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageParamError {
    /// A parameter is present but is not a non-negative integer.
    #[error("invalid value for {name}='{value}'; expected a non-negative integer")]
    InvalidNumber {
        /// Name of the offending parameter.
        name: &'static str,
        /// Raw value as received.
        value: String,
    },
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "panicking on malformed fixtures is the assertion"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 1, 1)]
    #[case(1, 10, 1, 10)]
    #[case(3, 250, 3, MAX_PER_PAGE)]
    fn new_clamps_out_of_range_values(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[rstest]
    fn offset_accounts_for_one_indexing() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(4, 25).offset(), 75);
        assert_eq!(PageRequest::new(2, 10).limit(), 10);
    }

    #[rstest]
    fn from_params_defaults_missing_values() {
        let request = PageRequest::from_params(None, None).expect("defaults");
        assert_eq!(request, PageRequest::first());
    }

    #[rstest]
    fn from_params_parses_and_clamps() {
        let request =
            PageRequest::from_params(Some("7"), Some("500")).expect("numeric params");
        assert_eq!(request.page(), 7);
        assert_eq!(request.per_page(), MAX_PER_PAGE);
    }

    #[rstest]
    #[case(Some("abc"), None)]
    #[case(None, Some("-3"))]
    fn from_params_rejects_non_numeric(
        #[case] page: Option<&str>,
        #[case] per_page: Option<&str>,
    ) {
        let err = PageRequest::from_params(page, per_page).expect_err("rejected");
        assert!(matches!(err, PageParamError::InvalidNumber { .. }));
    }

    #[rstest]
    fn next_keeps_page_size() {
        let request = PageRequest::new(2, 20).next();
        assert_eq!(request.page(), 3);
        assert_eq!(request.per_page(), 20);
    }
}
