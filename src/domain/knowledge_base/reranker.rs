//! Post-processing hook applied to search results

use std::fmt::Debug;

use super::document::Document;

/// Reorders or trims retrieved documents for a query
pub trait Reranker: Send + Sync + Debug {
    fn rerank(&self, query: &str, documents: Vec<Document>) -> Vec<Document>;
}
