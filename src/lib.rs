//! Docroot - Static File Server
//!
//! Core library for serving a local asset tree over HTTP/1.1.

pub mod config;
pub mod http;
pub mod logging;
pub mod server;
pub mod static_files;
