//! Catalog of agents, models and knowledge bases backing the node handlers

mod in_memory;

pub use in_memory::{CatalogData, InMemoryCatalog};
