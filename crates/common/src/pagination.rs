use doku::Document;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Document, SmartDefault,
)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Score,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Document, SmartDefault,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Query parameters for one page of the joke feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub order: SortOrder,
}

/// Page cursor for infinite scrolling.
///
/// Pages are numbered from 1. The cursor only moves on once a fetched page had content, an empty
/// or null page ends the session. Changing the sort starts a new session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    exhausted: bool,
    sort: Sort,
}

impl PageCursor {
    pub fn new(sort: Sort) -> Self {
        Self {
            page: 1,
            exhausted: false,
            sort,
        }
    }

    /// The page which should be fetched next, or `None` when there is nothing left.
    pub fn next_page(&self) -> Option<u32> {
        if self.exhausted {
            None
        } else {
            Some(self.page)
        }
    }

    /// Feed back the size of the page returned for [Self::next_page], `None` if the backend
    /// returned null.
    pub fn record_page(&mut self, len: Option<usize>) {
        if self.exhausted {
            return;
        }
        match len {
            Some(len) if len > 0 => self.page += 1,
            _ => self.exhausted = true,
        }
    }

    /// Returns true if this started a new session, in which case all previously loaded pages
    /// need to be dropped.
    pub fn resort(&mut self, sort: Sort) -> bool {
        if sort == self.sort {
            return false;
        }
        *self = Self::new(sort);
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn query(&self, page_size: u32) -> Option<FeedQuery> {
        self.next_page().map(|page| FeedQuery {
            page,
            page_size,
            sort_field: self.sort.field,
            order: self.sort.order,
        })
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(Sort::default())
    }
}
