//! LLM provider implementations

mod openai;
mod resolver;

pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};
pub use resolver::CatalogProviderResolver;
