use serde::Serialize;

/// Largest page a client may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Builds a request from raw query values, clamping out-of-range input.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

/// Pagination metadata returned next to list results.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn meta(&self) -> PageMeta {
        let size = self.request.size;
        PageMeta {
            current_page: self.request.page,
            per_page: size,
            last_page: ((self.total + size - 1) / size).max(1),
            total: self.total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let request = PageRequest::new(None, None);
        assert_eq!(request, PageRequest { page: 1, size: 10 });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, size: 1 });
        assert_eq!(PageRequest::new(Some(-3), Some(5000)).size, MAX_PAGE_SIZE);
    }

    #[test]
    fn meta_rounds_last_page_up() {
        let page: Page<()> = Page {
            items: vec![],
            total: 21,
            request: PageRequest::new(Some(2), Some(5)),
        };
        assert_eq!(
            page.meta(),
            PageMeta { current_page: 2, per_page: 5, last_page: 5, total: 21 }
        );
    }
}
