//! Poll-driven async queries: paged feeds and optimistic mutations.

pub mod mutation;
pub mod paged;

pub use mutation::{MutationCoordinator, MutationKind, MutationOutcome, TicketId, TicketState};
pub use paged::{FeedPhase, Page, PagedQuery};
