//! Knowledge base loader and vector store implementations

mod in_memory;
mod knowledge;

pub use in_memory::InMemoryVectorDb;
pub use knowledge::{KnowledgeBase, DEFAULT_NUM_DOCUMENTS, DEFAULT_OPTIMIZE_ON};
