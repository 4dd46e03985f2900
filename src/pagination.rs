//! Splitting ordered records into fixed-size pages
//!
//! Pages never copy records: every [`Page`] holds a clone of the same
//! `Arc<[R]>` plus the range it covers, so concurrent page tasks share the
//! fetched records read-only.

use crate::error::{Error, Result};
use std::ops::Range;
use std::sync::Arc;

/// Largest page the paginator may produce
pub const MAX_PAGE_SIZE: usize = 10;

/// Records per page, always within `1..=MAX_PAGE_SIZE`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    /// The largest allowed page size
    pub const MAX: PageSize = PageSize(MAX_PAGE_SIZE);

    /// Validate a page size
    pub fn new(size: usize) -> Result<Self> {
        if (1..=MAX_PAGE_SIZE).contains(&size) {
            Ok(Self(size))
        } else {
            Err(Error::Config {
                message: format!(
                    "page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                ),
                key: Some("report.page_size".into()),
            })
        }
    }

    /// The size as a plain number
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<usize> for PageSize {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self> {
        Self::new(size)
    }
}

/// A contiguous run of records tagged with its position in the sequence
#[derive(Debug)]
pub struct Page<R> {
    number: usize,
    count: usize,
    records: Arc<[R]>,
    range: Range<usize>,
}

impl<R> Page<R> {
    /// 1-based page number
    pub fn number(&self) -> usize {
        self.number
    }

    /// Total number of pages in the sequence this page belongs to
    pub fn count(&self) -> usize {
        self.count
    }

    /// Records on this page, in their original order
    pub fn records(&self) -> &[R] {
        &self.records[self.range.clone()]
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Pages produced by [`paginate`] are never empty
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Zero-based offset of the first record within the full sequence
    pub fn offset(&self) -> usize {
        self.range.start
    }

    /// Whether this is the final page
    pub fn is_last(&self) -> bool {
        self.number == self.count
    }
}

// Manual impl: deriving would require R: Clone
impl<R> Clone for Page<R> {
    fn clone(&self) -> Self {
        Self {
            number: self.number,
            count: self.count,
            records: Arc::clone(&self.records),
            range: self.range.clone(),
        }
    }
}

/// Number of pages needed for `total` records
pub fn page_count(total: usize, page_size: PageSize) -> usize {
    total.div_ceil(page_size.get())
}

/// Split `records` into pages of at most `page_size`
///
/// Returns no pages for an empty sequence. Only the last page may be
/// shorter than `page_size`, and concatenating the pages in order yields
/// `records` unchanged.
pub fn paginate<R>(records: Arc<[R]>, page_size: PageSize) -> Vec<Page<R>> {
    let total = records.len();
    let count = page_count(total, page_size);
    let size = page_size.get();

    (0..count)
        .map(|index| {
            let start = index * size;
            let end = (start + size).min(total);
            Page {
                number: index + 1,
                count,
                records: Arc::clone(&records),
                range: start..end,
            }
        })
        .collect()
}
