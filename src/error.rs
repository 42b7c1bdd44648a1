//! Error taxonomy for the data layer.

use crate::api::types::Resource;
use crate::query::mutation::MutationKind;
use thiserror::Error;

/// Errors surfaced by the data layer.
///
/// `InvalidParameter` and `Conflict` are caller mistakes and are never worth
/// retrying. `Network` is transient; retry policy belongs to the caller.
/// `Rejected` is an authoritative backend failure and is surfaced verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
  /// Malformed input to a pure builder (zero id, out-of-range page size, ...)
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// Transport-level failure: connect, read, or an undecodable body
  #[error("network error: {0}")]
  Network(String),

  /// A mutation of the same kind is already pending for this item
  #[error("{kind} already in flight for {resource} {id}")]
  Conflict {
    resource: Resource,
    id: u64,
    kind: MutationKind,
  },

  /// The backend rejected the request with an application-level error
  #[error("server rejected request ({code}): {message}")]
  Rejected { code: String, message: String },
}

impl Error {
  /// Whether a retry with the same input could possibly succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Error::Network(_))
  }
}
