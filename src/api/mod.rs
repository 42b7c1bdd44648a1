//! API surface: endpoint builders, wire types, domain types, HTTP client.

pub mod client;
pub mod endpoints;
pub mod types;
pub mod wire;

pub use client::ApiClient;
pub use endpoints::PageQuery;
