//! Query parameters for the catalog search endpoint.

use serde::Serialize;

/// Parameters of `GET <base>/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams<'a> {
    /// Normalized query.
    pub q: &'a str,
    pub offset: usize,
    pub limit: usize,
}
