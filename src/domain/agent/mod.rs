//! Agent domain module

mod entity;
mod repository;

pub use entity::Agent;
pub use repository::AgentRepository;
