use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// The one pagination contract every listing goes through:
/// `{page, limit, sort_key, sort_dir} -> {items, total, page, page_count}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort_key: String,
    pub sort_dir: SortDir,
}

impl PageRequest {
    pub const DEFAULT_SORT_KEY: &'static str = "id";

    /// Clamps `page` to >= 1 and `limit` to `1..=max_limit`.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
        Self {
            page: page.unwrap_or(1).max(1),
            limit,
            sort_key: Self::DEFAULT_SORT_KEY.to_string(),
            sort_dir: SortDir::Desc,
        }
    }

    pub fn sorted(mut self, sort_key: impl Into<String>, sort_dir: SortDir) -> Self {
        self.sort_key = sort_key.into();
        self.sort_dir = sort_dir;
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, 10, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub page_count: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        let page_count = total.div_ceil(limit) as u32;
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            page_count,
        }
    }

    /// Slices an already ordered, already filtered collection.
    pub fn slice(all: Vec<T>, request: &PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            page_count: self.page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_clamped() {
        let req = PageRequest::new(Some(0), Some(500), 20, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 100);

        let req = PageRequest::new(None, Some(0), 20, 100);
        assert_eq!(req.limit, 1);

        let req = PageRequest::new(None, None, 20, 100);
        assert_eq!(req.limit, 20);
        assert_eq!(req.sort_dir, SortDir::Desc);
    }

    #[test]
    fn test_slice_reports_page_count() {
        let req = PageRequest::new(Some(2), Some(5), 10, 100);
        let page = Page::slice((1..=12).collect::<Vec<_>>(), &req);
        assert_eq!(page.items, vec![6, 7, 8, 9, 10]);
        assert_eq!(page.total, 12);
        assert_eq!(page.page_count, 3);

        let past_end = Page::slice(vec![1, 2], &PageRequest::new(Some(4), Some(5), 10, 100));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.page_count, 1);
    }
}
