//! Static file serving
//!
//! This module turns a request target into a response: the router decides
//! which file (if any) a target names, and the responder opens it.

pub mod responder;
pub mod router;

pub use router::{Route, Router};
