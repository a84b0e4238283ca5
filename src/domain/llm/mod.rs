//! Language model domain trait

mod provider;

pub use provider::LanguageModel;

#[cfg(test)]
pub use provider::MockLanguageModel;
