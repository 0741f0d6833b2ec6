//! Connection acceptance and server lifecycle

pub mod lifecycle;
pub mod listener;

pub use lifecycle::{Server, ServerError};
