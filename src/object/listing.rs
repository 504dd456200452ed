//! Paginated listing contract shared by every object type.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Canonical datetime format of the host object layer (`Y-m-d H:i:s`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Pagination parameters sent by the host with a list request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Page size requested by the host
    pub max: Option<i64>,
    /// Index of the first wanted record
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn new(max: i64, offset: i64) -> Self {
        Self {
            max: Some(max),
            offset: Some(offset),
        }
    }

    /// `(limit, page)` to request, or `None` when the host asked for no paging.
    ///
    /// Paging applies only with `max > 0` and `offset >= 0`; the page is
    /// 1-based: `1 + floor(offset / max)`. A page past `i64::MAX` disables paging.
    pub fn limit_and_page(&self) -> Option<(i64, i64)> {
        match (self.max, self.offset) {
            (Some(max), Some(offset)) if max > 0 && offset >= 0 => {
                (offset / max).checked_add(1).map(|page| (max, page))
            }
            _ => None,
        }
    }
}

/// Counters attached to a listing page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Records in this page
    pub current: u64,
    /// Records across all pages
    pub total: u64,
}

/// One page of mapped record summaries.
///
/// `meta.current` always equals `items.len()`; `meta.total` comes from an
/// independent count and may be larger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingPage<T> {
    pub meta: ListMeta,
    pub items: Vec<T>,
}

impl<T> ListingPage<T> {
    /// Page returned when the external API produced no data at all.
    pub fn empty() -> Self {
        Self {
            meta: ListMeta::default(),
            items: Vec::new(),
        }
    }

    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self {
            meta: ListMeta {
                current: items.len() as u64,
                total,
            },
            items,
        }
    }
}

/// Reformat an RFC 3339 timestamp into [`DATETIME_FORMAT`].
///
/// The wall-clock time of the source offset is kept; no conversion to UTC.
pub fn to_canonical_datetime(raw: &str) -> Option<String> {
    DateTime::<FixedOffset>::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_offset() {
        assert_eq!(Pagination::new(25, 50).limit_and_page(), Some((25, 3)));
        assert_eq!(Pagination::new(25, 0).limit_and_page(), Some((25, 1)));
        assert_eq!(Pagination::new(25, 24).limit_and_page(), Some((25, 1)));
        assert_eq!(Pagination::new(25, 25).limit_and_page(), Some((25, 2)));
        assert_eq!(Pagination::new(10, 99).limit_and_page(), Some((10, 10)));
    }

    #[test]
    fn test_page_at_offset_limit() {
        assert_eq!(Pagination::new(1, i64::MAX).limit_and_page(), None);
        assert_eq!(Pagination::new(1, i64::MAX - 1).limit_and_page(), Some((1, i64::MAX)));
        assert_eq!(Pagination::new(i64::MAX, i64::MAX).limit_and_page(), Some((i64::MAX, 2)));
    }

    #[test]
    fn test_no_paging_without_valid_bounds() {
        assert_eq!(Pagination::default().limit_and_page(), None);
        assert_eq!(Pagination::new(0, 10).limit_and_page(), None);
        assert_eq!(Pagination::new(-5, 10).limit_and_page(), None);
        assert_eq!(Pagination::new(10, -1).limit_and_page(), None);

        let max_only = Pagination {
            max: Some(10),
            offset: None,
        };
        assert_eq!(max_only.limit_and_page(), None);
    }

    #[test]
    fn test_listing_page_counts() {
        let page = ListingPage::new(vec!["a", "b"], 40);
        assert_eq!(page.meta.current, 2);
        assert_eq!(page.meta.total, 40);

        let empty: ListingPage<String> = ListingPage::empty();
        assert_eq!(empty.meta, ListMeta { current: 0, total: 0 });
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_listing_page_serialization() {
        let page = ListingPage::new(vec![1, 2, 3], 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["meta"]["current"], 3);
        assert_eq!(json["meta"]["total"], 3);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_canonical_datetime() {
        assert_eq!(
            to_canonical_datetime("2024-03-15T10:30:00-05:00").as_deref(),
            Some("2024-03-15 10:30:00")
        );
        assert_eq!(
            to_canonical_datetime("2024-03-15T10:30:00Z").as_deref(),
            Some("2024-03-15 10:30:00")
        );
        assert!(to_canonical_datetime("15/03/2024").is_none());
        assert!(to_canonical_datetime("").is_none());
    }
}
