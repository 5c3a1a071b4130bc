use crate::client::ListQuery;
use crate::errors::{ClientError, Result};
use crate::models::ResourceItem;

/// Rows per page served by the backend.
pub const PAGE_SIZE: usize = 10;

/// Filter, sort and page selection for one list view, plus the last fetched page.
#[derive(Debug, Clone)]
pub struct ListState {
    page: u32,
    filter: String,
    sort: String,
    items: Vec<ResourceItem>,
    dirty: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            page: 1,
            filter: String::new(),
            sort: String::new(),
            items: Vec::new(),
            // Nothing fetched yet.
            dirty: true,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    /// True when the selection changed since the last successful fetch.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.dirty = true;
    }

    pub fn set_sort(&mut self, sort: impl Into<String>) {
        self.sort = sort.into();
        self.dirty = true;
    }

    pub fn set_page(&mut self, page: i64) -> Result<()> {
        let page = u32::try_from(page)
            .ok()
            .filter(|page| *page >= 1)
            .ok_or(ClientError::InvalidPage(page))?;
        self.page = page;
        self.dirty = true;
        Ok(())
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            page: self.page,
        }
    }

    /// Stores the result of a successful fetch for the current selection.
    pub fn replace_items(&mut self, items: Vec<ResourceItem>) {
        self.items = items;
        self.dirty = false;
    }

    /// A short page means the backend ran out of rows.
    pub fn likely_last_page(&self) -> bool {
        !self.dirty && self.items.len() < PAGE_SIZE
    }
}
