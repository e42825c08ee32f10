//! Fixed-size page arithmetic shared by every post listing.

use std::str::FromStr;

use serde::Serialize;

/// Number of posts on one listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Requested page, as given in the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page number.
    Number(u64),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

/// The requested page does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid page")]
pub struct PageError;

impl FromStr for PageRequest {
    type Err = PageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "last" {
            return Ok(PageRequest::Last);
        }
        raw.parse::<u64>()
            .map(PageRequest::Number)
            .map_err(|_| PageError)
    }
}

impl PageRequest {
    /// Parse an optional query value, defaulting to the first page.
    pub fn parse(raw: Option<&str>) -> Result<Self, PageError> {
        raw.map_or(Ok(Self::default()), str::parse)
    }

    /// Resolve to a concrete 1-based page number given the number of pages.
    ///
    /// An empty result set still has a first page.
    pub fn resolve(self, total_pages: u64) -> Result<u64, PageError> {
        let last = total_pages.max(1);
        match self {
            PageRequest::Last => Ok(last),
            PageRequest::Number(n) if (1..=last).contains(&n) => Ok(n),
            PageRequest::Number(_) => Err(PageError),
        }
    }
}

/// Number of pages needed for `total_items`.
pub fn page_count(total_items: u64, per_page: u64) -> u64 {
    total_items.div_ceil(per_page)
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    /// Slice an already filtered and ordered collection into a page.
    pub fn from_sorted(all: Vec<T>, request: PageRequest, per_page: u64) -> Result<Self, PageError> {
        let total_items = all.len() as u64;
        let total_pages = page_count(total_items, per_page);
        let number = request.resolve(total_pages)?;
        let skip = ((number - 1) * per_page) as usize;

        Ok(Self {
            items: all.into_iter().skip(skip).take(per_page as usize).collect(),
            number,
            per_page,
            total_items,
            total_pages,
        })
    }
}
