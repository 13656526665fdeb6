//! HTTP surface: envelope helpers, query parsing and handlers.

pub mod envelope;
pub(crate) mod handlers;
pub mod list_query;
pub(crate) mod request_tracing;
