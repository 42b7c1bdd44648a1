//! Client-side data layer for the Plaza community platform.
//!
//! The crate covers the part of the client that has real invariants:
//! canonical cache keys, endpoint construction, cursor-pagination merging,
//! and optimistic engagement mutations. Rendering and auth flows live in the
//! embedding application.
//!
//! - [`cache::keys`] builds canonical, hierarchical [`cache::key::CacheKey`]s
//!   per resource.
//! - [`api::endpoints`] maps logical parameters to encoded URLs.
//! - [`query::paged::PagedQuery`] merges cursor-paginated pages into one
//!   ordered, de-duplicated collection.
//! - [`query::mutation::MutationCoordinator`] applies like/scrap/vote
//!   actions optimistically and rolls them back on failure.
//! - [`session::Session`] wires everything to the HTTP client.
//!
//! All state transitions happen in `poll` calls on the caller's logical
//! thread; network tasks communicate exclusively through channels.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod session;

pub use config::Config;
pub use error::Error;
pub use session::Session;
