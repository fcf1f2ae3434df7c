//! Per-page timetable query parameters.

use super::ApiTime;

/// The timetable endpoint returns at most this many connections per request.
pub const MAX_PAGE_SIZE: u8 = 6;

/// Parameters for a single timetable page.
///
/// Direction (forward), sort order (by departure), filters and passenger
/// profile are fixed by the client and therefore not part of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Lower bound for departures on this page.
    pub cursor: ApiTime,
    /// Number of results requested, never more than [`MAX_PAGE_SIZE`].
    pub count: u8,
}

impl PageRequest {
    /// Request `wanted` results departing at or after `cursor`, capped to
    /// the provider's page size.
    ///
    /// # Examples
    ///
    /// ```
    /// use oebb::domain::{ApiTime, PageRequest};
    ///
    /// let cursor = ApiTime::parse("2024-03-15T10:00:00").unwrap();
    /// assert_eq!(PageRequest::capped(cursor, 20).count, 6);
    /// assert_eq!(PageRequest::capped(cursor, 2).count, 2);
    /// ```
    pub fn capped(cursor: ApiTime, wanted: usize) -> Self {
        let count = wanted.min(usize::from(MAX_PAGE_SIZE)) as u8;
        Self { cursor, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_page_size() {
        let cursor = ApiTime::parse("2024-03-15T10:00:00").unwrap();
        for wanted in 0..50 {
            let page = PageRequest::capped(cursor, wanted);
            assert!(page.count <= MAX_PAGE_SIZE);
            assert_eq!(usize::from(page.count), wanted.min(6));
        }
    }
}
