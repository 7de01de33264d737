//! Paging of the user listing
//!
//! Page parameters come straight from the query string. Anything that is not
//! a positive integer turns paging off for the request: every record is
//! returned and the offending parameter is echoed back as `null` rather than
//! being repaired to a default.

use serde::{Serialize, Serializer};

use crate::{User, UserSummary};

/// A page number or page size as received from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageParam {
    /// Not supplied at all.
    #[default]
    Unspecified,
    /// Supplied, but not a positive integer.
    Invalid,
    Valid(u64),
}

impl PageParam {
    /// Interpret a raw query-string value.
    ///
    /// ```rust
    /// use emporium_core::pagination::PageParam;
    ///
    /// assert_eq!(PageParam::parse(Some("3")), PageParam::Valid(3));
    /// assert_eq!(PageParam::parse(Some("0")), PageParam::Invalid);
    /// assert_eq!(PageParam::parse(Some("-2")), PageParam::Invalid);
    /// assert_eq!(PageParam::parse(Some("abc")), PageParam::Invalid);
    /// assert_eq!(PageParam::parse(None), PageParam::Unspecified);
    /// ```
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return PageParam::Unspecified;
        };

        match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => PageParam::Valid(n as u64),
            _ => PageParam::Invalid,
        }
    }

    pub fn valid(&self) -> Option<u64> {
        match self {
            PageParam::Valid(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid().is_some()
    }
}

impl From<Option<u64>> for PageParam {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(0) => PageParam::Invalid,
            Some(n) => PageParam::Valid(n),
            None => PageParam::Unspecified,
        }
    }
}

impl Serialize for PageParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageParam::Valid(n) => serializer.serialize_u64(*n),
            _ => serializer.serialize_none(),
        }
    }
}

/// One page of the user listing, ready to be returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub page_number: PageParam,
    pub page_size: PageParam,
    pub count: usize,
    pub total_pages: Option<u64>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub data: Vec<UserSummary>,
}

/// Slice an already filtered and sorted listing into a page.
///
/// When both parameters are valid the page number is clamped to the last
/// page and only that page is emitted. Otherwise every record is emitted.
/// The previous/next flags compare whatever page number was finally used,
/// so an unusable operand always makes the comparison false.
pub fn paginate(users: Vec<User>, page_number: PageParam, page_size: PageParam) -> PageResult {
    let len = users.len() as u64;
    let total_pages = page_size.valid().map(|size| len.div_ceil(size));

    let page_number = match (page_number, total_pages) {
        (PageParam::Valid(n), Some(total)) if n > total => PageParam::Valid(total),
        (other, _) => other,
    };

    let has_previous_page = page_number.valid().is_some_and(|n| n > 1);
    let has_next_page = match (page_number.valid(), total_pages) {
        (Some(n), Some(total)) => n < total,
        _ => false,
    };

    let data: Vec<UserSummary> = match (page_number.valid(), page_size.valid()) {
        (Some(0), Some(_)) => Vec::new(),
        (Some(n), Some(size)) => {
            let start = usize::try_from((n - 1).saturating_mul(size)).unwrap_or(usize::MAX);
            let take = usize::try_from(size).unwrap_or(usize::MAX);
            users
                .into_iter()
                .skip(start)
                .take(take)
                .map(UserSummary::from)
                .collect()
        }
        _ => users.into_iter().map(UserSummary::from).collect(),
    };

    PageResult {
        page_number,
        page_size,
        count: data.len(),
        total_pages,
        has_previous_page,
        has_next_page,
        data,
    }
}
