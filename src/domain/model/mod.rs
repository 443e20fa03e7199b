//! Model domain module

mod entity;

pub use entity::{Model, DEFAULT_PROVIDER};
