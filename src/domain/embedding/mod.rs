//! Embedder domain trait and vector math

mod provider;
mod similarity;

pub use provider::Embedder;
pub use similarity::{cosine_similarity, inner_product, Distance};

#[cfg(test)]
pub use provider::mock::MockEmbedder;
