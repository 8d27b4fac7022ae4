//! Page parameters and page metadata shared by every listing.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};

/// Default page size for favorite listings.
pub const FAVORITES_DEFAULT_LIMIT: u32 = 6;

/// Default page size for review and writable-estimate listings.
pub const REVIEWS_DEFAULT_LIMIT: u32 = 5;

/// Default page size for the mover directory.
pub const MOVERS_DEFAULT_LIMIT: u32 = 10;

/// Largest page size any listing will serve.
pub const MAX_LIMIT: u32 = 50;

/// Raw, untrusted page parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
    }
}

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Parse parameters, falling back to defaults for anything absent or malformed.
    pub fn lenient(params: &PageParams, default_limit: u32) -> Self {
        let page = params
            .page
            .as_deref()
            .and_then(parse_positive)
            .unwrap_or(1);
        Self {
            page,
            limit: parse_limit(params.limit.as_deref(), default_limit),
        }
    }

    /// Parse parameters, rejecting a present page that is not a positive integer.
    ///
    /// The limit still degrades to the default.
    pub fn strict(params: &PageParams, default_limit: u32) -> Result<Self> {
        let page = match params.page.as_deref() {
            None => 1,
            Some(raw) => parse_positive(raw).ok_or_else(|| Error::InvalidPage(raw.to_string()))?,
        };
        Ok(Self {
            page,
            limit: parse_limit(params.limit.as_deref(), default_limit),
        })
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Page metadata for a listing of `total` items.
    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total_pages: total_pages(total, self.limit),
        }
    }

    /// Whether items exist beyond this page.
    pub fn has_more(&self, total: u64) -> bool {
        self.offset() + u64::from(self.limit) < total
    }

    /// Cut this page out of a fully ordered result set.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect()
    }
}

/// Page metadata returned alongside every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// `ceil(total / limit)`, and zero for an empty listing.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}

fn parse_limit(raw: Option<&str>, default_limit: u32) -> u32 {
    raw.and_then(parse_positive)
        .map(|n| n.min(MAX_LIMIT))
        .unwrap_or(default_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: &str, limit: &str) -> PageParams {
        PageParams {
            page: Some(page.into()),
            limit: Some(limit.into()),
        }
    }

    #[test]
    fn lenient_defaults_on_garbage() {
        let request = PageRequest::lenient(&params("abc", "xyz"), FAVORITES_DEFAULT_LIMIT);
        assert_eq!(request, PageRequest { page: 1, limit: 6 });

        let request = PageRequest::lenient(&PageParams::default(), FAVORITES_DEFAULT_LIMIT);
        assert_eq!(request, PageRequest { page: 1, limit: 6 });

        let request = PageRequest::lenient(&params("-3", "0"), FAVORITES_DEFAULT_LIMIT);
        assert_eq!(request, PageRequest { page: 1, limit: 6 });
    }

    #[test]
    fn limit_is_clamped() {
        let request = PageRequest::lenient(&params("2", "500"), FAVORITES_DEFAULT_LIMIT);
        assert_eq!(request, PageRequest { page: 2, limit: MAX_LIMIT });
    }

    #[test]
    fn strict_rejects_page_zero() {
        let err = PageRequest::strict(&params("0", "10"), MOVERS_DEFAULT_LIMIT).unwrap_err();
        assert_eq!(err, Error::InvalidPage("0".into()));
        assert!(PageRequest::strict(&params("two", "10"), MOVERS_DEFAULT_LIMIT).is_err());

        let request = PageRequest::strict(&PageParams::default(), MOVERS_DEFAULT_LIMIT).unwrap();
        assert_eq!(request, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 6), 0);
        assert_eq!(total_pages(1, 6), 1);
        assert_eq!(total_pages(6, 6), 1);
        assert_eq!(total_pages(7, 6), 2);
    }

    #[test]
    fn slice_and_has_more() {
        let request = PageRequest { page: 2, limit: 3 };
        assert_eq!(request.slice(1..=8), vec![4, 5, 6]);
        assert!(request.has_more(7));
        assert!(!request.has_more(6));

        let past_end = PageRequest { page: 5, limit: 3 };
        assert!(past_end.slice(1..=8).is_empty());
    }
}
