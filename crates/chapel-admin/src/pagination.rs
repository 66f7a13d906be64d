//! Pagination

use serde::{Deserialize, Deserializer, Serialize};

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, page_size: 20 }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page: page.max(1), page_size: page_size.max(1) }
    }

    pub fn next(self) -> Self {
        Self { page: self.page.saturating_add(1), ..self }
    }

    pub fn previous(self) -> Self {
        Self { page: self.page.saturating_sub(1).max(1), ..self }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("page_size", self.page_size.to_string())]
    }
}

/// One page of a server-side list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size)) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fill in paging fields the server left out from the request
    pub(crate) fn assume(mut self, requested: Pagination) -> Self {
        if self.page == 0 {
            self.page = requested.page;
        }
        if self.page_size == 0 {
            self.page_size = requested.page_size;
        }
        self
    }
}

/// Either a bare array or an object carrying the items and counts
#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Bare(Vec<T>),
    Paged {
        #[serde(alias = "data", alias = "results")]
        items: Vec<T>,
        #[serde(default, alias = "count")]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, alias = "pageSize", alias = "per_page")]
        page_size: Option<u32>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Bare(items) => Page {
                total: items.len() as u64,
                page: 1,
                page_size: items.len() as u32,
                items,
            },
            PageRepr::Paged { items, total, page, page_size } => Page {
                total: total.unwrap_or(items.len() as u64),
                page: page.unwrap_or_default(),
                page_size: page_size.unwrap_or_default(),
                items,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let page = Page { items: vec![1, 2], total: 41, page: 1, page_size: 20 };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        let last = Page { items: vec![1], total: 41, page: 3, page_size: 20 };
        assert!(!last.has_next());
        let empty: Page<u8> = Page { items: vec![], total: 0, page: 1, page_size: 20 };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_deserialize_shapes() {
        let bare: Page<u8> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!((bare.total, bare.page, bare.items.len()), (3, 1, 3));

        let paged: Page<u8> =
            serde_json::from_str(r#"{"items":[1],"total":9,"page":2,"page_size":5}"#).unwrap();
        assert_eq!(paged.total_pages(), 2);

        let data: Page<u8> = serde_json::from_str(r#"{"data":[1,2],"count":12}"#).unwrap();
        let data = data.assume(Pagination::new(3, 2));
        assert_eq!((data.total, data.page, data.page_size), (12, 3, 2));
    }

    #[test]
    fn test_pagination_steps() {
        let p = Pagination::new(0, 0);
        assert_eq!(p, Pagination { page: 1, page_size: 1 });
        assert_eq!(Pagination::default().next().offset(), 20);
        assert_eq!(Pagination::new(u32::MAX, 20).next().page, u32::MAX);
        assert_eq!(Pagination::default().previous().page, 1);
    }
}
