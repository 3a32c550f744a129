//! Pagination request for list queries
//!
//! `Page` is what callers send; `normalize` turns it into the zero-based index and
//! page size a store feeds to its paginator.

use serde::{Deserialize, Serialize};

/// Largest page size a store will honour
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page index
    pub number: u32,
    /// items per page
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self { Self { number, size } }

    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let number = if self.number == 0 { 1 } else { self.number };
        let size = self.size.clamp(1, MAX_PAGE_SIZE);
        ((number - 1) as u64, size as u64)
    }

    /// Number of records to skip before this page
    pub fn offset(self) -> u64 {
        let (idx, size) = self.normalize();
        idx * size
    }
}

impl Default for Page {
    fn default() -> Self { Self { number: 1, size: 20 } }
}
