//! Response envelopes returned by the storefront API.
//!
//! Every endpoint wraps its payload as `{ "message": ..., "body": ... }`.
//! List endpoints add `meta.pagination`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub current_page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: Pagination,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub body: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Truncates `body` to the reported page limit.
    ///
    /// Returns `true` if the server sent more rows than its own `limit`.
    pub fn enforce_limit(&mut self) -> bool {
        let limit = self.meta.pagination.limit as usize;
        if limit > 0 && self.body.len() > limit {
            self.body.truncate(limit);
            return true;
        }
        false
    }
}

/// Envelope for single-record endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub body: T,
}
