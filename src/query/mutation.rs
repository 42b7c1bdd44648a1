//! Optimistic mutation coordinator for engagement actions.
//!
//! Like/scrap/vote actions write their expected result into the shared
//! [`ItemStore`] immediately, then issue the network request. A successful
//! response reconciles the touched fields with the server's authoritative
//! values; a failure restores them from the pre-mutation snapshot. At most
//! one mutation per (resource, item, kind) may be pending at a time, which
//! serializes writers and absorbs double-clicks.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::types::{Engagement, Resource};
use crate::cache::store::ItemStore;
use crate::error::Error;

/// Engagement actions that may be applied optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
  Like,
  Scrap,
  Vote,
}

impl MutationKind {
  /// Copy the fields this mutation touches from `src` into `dst`,
  /// leaving every other field alone.
  pub(crate) fn copy_fields(self, src: &Engagement, dst: &mut Engagement) {
    match self {
      MutationKind::Like => {
        dst.liked = src.liked;
        dst.like_count = src.like_count;
      }
      MutationKind::Scrap => {
        dst.scraped = src.scraped;
        dst.scrap_count = src.scrap_count;
      }
      MutationKind::Vote => {
        dst.polled = src.polled;
        dst.poll_count = src.poll_count;
      }
    }
  }
}

impl fmt::Display for MutationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      MutationKind::Like => "like",
      MutationKind::Scrap => "scrap",
      MutationKind::Vote => "vote",
    };
    write!(f, "{}", name)
  }
}

/// Identifier of one mutation ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId(u64);

/// Resolution status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
  Pending,
  Committed,
  RolledBack,
}

/// Tracking record for one in-flight optimistic mutation.
#[derive(Debug, Clone)]
pub struct MutationTicket {
  id: TicketId,
  resource: Resource,
  item_id: u64,
  kind: MutationKind,
  /// Pre-mutation values of the touched fields
  snapshot: Engagement,
  state: TicketState,
}

impl MutationTicket {
  pub fn id(&self) -> TicketId {
    self.id
  }

  pub fn resource(&self) -> Resource {
    self.resource
  }

  pub fn item_id(&self) -> u64 {
    self.item_id
  }

  pub fn kind(&self) -> MutationKind {
    self.kind
  }

  pub fn state(&self) -> TicketState {
    self.state
  }
}

/// Resolution of one mutation, surfaced for user-facing notification.
#[derive(Debug)]
pub struct MutationOutcome {
  pub ticket: TicketId,
  pub resource: Resource,
  pub item_id: u64,
  pub kind: MutationKind,
  /// `Err` carries the failure that triggered the rollback
  pub result: Result<(), Error>,
}

/// Coordinates optimistic mutations against a shared [`ItemStore`].
///
/// Network requests are spawned; their results come back through a channel
/// and are committed or rolled back during [`MutationCoordinator::poll`] on
/// the caller's logical thread.
pub struct MutationCoordinator {
  tickets: HashMap<TicketId, MutationTicket>,
  pending: HashMap<(Resource, u64, MutationKind), TicketId>,
  tx: mpsc::UnboundedSender<(TicketId, Result<Engagement, Error>)>,
  rx: mpsc::UnboundedReceiver<(TicketId, Result<Engagement, Error>)>,
  next_id: u64,
}

impl Default for MutationCoordinator {
  fn default() -> Self {
    Self::new()
  }
}

impl MutationCoordinator {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      tickets: HashMap::new(),
      pending: HashMap::new(),
      tx,
      rx,
      next_id: 0,
    }
  }

  /// Apply `local` to the touched fields immediately and issue `request`.
  ///
  /// The request future resolves to the server's authoritative values for
  /// the touched fields. Fails with [`Error::Conflict`] when a mutation of
  /// the same kind is already pending for this item.
  pub fn apply<Fut>(
    &mut self,
    store: &mut ItemStore,
    resource: Resource,
    item_id: u64,
    kind: MutationKind,
    local: Engagement,
    request: Fut,
  ) -> Result<TicketId, Error>
  where
    Fut: Future<Output = Result<Engagement, Error>> + Send + 'static,
  {
    let slot = (resource, item_id, kind);
    if self.pending.contains_key(&slot) {
      return Err(Error::Conflict {
        resource,
        id: item_id,
        kind,
      });
    }

    // Snapshot only the fields this mutation touches
    let before = store.get(resource, item_id).unwrap_or_default();
    let mut snapshot = Engagement::default();
    kind.copy_fields(&before, &mut snapshot);

    store.update(resource, item_id, |e| kind.copy_fields(&local, e));

    let id = TicketId(self.next_id);
    self.next_id += 1;
    self.tickets.insert(
      id,
      MutationTicket {
        id,
        resource,
        item_id,
        kind,
        snapshot,
        state: TicketState::Pending,
      },
    );
    self.pending.insert(slot, id);
    debug!(%resource, item_id, %kind, ticket = ?id, "optimistic mutation applied");

    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = request.await;
      // Ignore send errors - the coordinator may have been dropped
      let _ = tx.send((id, result));
    });

    Ok(id)
  }

  /// Drain resolved mutations, committing or rolling back each one.
  pub fn poll(&mut self, store: &mut ItemStore) -> Vec<MutationOutcome> {
    let mut outcomes = Vec::new();
    while let Ok((id, result)) = self.rx.try_recv() {
      if let Some(outcome) = self.resolve(store, id, result) {
        outcomes.push(outcome);
      }
    }
    outcomes
  }

  /// Look up a ticket by id.
  pub fn ticket(&self, id: TicketId) -> Option<&MutationTicket> {
    self.tickets.get(&id)
  }

  /// Whether a mutation of `kind` is currently pending for this item.
  pub fn is_pending(&self, resource: Resource, item_id: u64, kind: MutationKind) -> bool {
    self.pending.contains_key(&(resource, item_id, kind))
  }

  /// Resolve one ticket. Resolving an already-resolved ticket is a no-op,
  /// so duplicate callbacks from retried network layers are harmless.
  fn resolve(
    &mut self,
    store: &mut ItemStore,
    id: TicketId,
    result: Result<Engagement, Error>,
  ) -> Option<MutationOutcome> {
    let ticket = self.tickets.get_mut(&id)?;
    if ticket.state != TicketState::Pending {
      return None;
    }

    let (resource, item_id, kind) = (ticket.resource, ticket.item_id, ticket.kind);
    let outcome = match result {
      Ok(server) => {
        // Server wins on any discrepancy with the optimistic value
        ticket.state = TicketState::Committed;
        store.update(resource, item_id, |e| kind.copy_fields(&server, e));
        debug!(%resource, item_id, %kind, "mutation committed");
        Ok(())
      }
      Err(error) => {
        ticket.state = TicketState::RolledBack;
        let snapshot = ticket.snapshot;
        store.update(resource, item_id, |e| kind.copy_fields(&snapshot, e));
        warn!(%resource, item_id, %kind, %error, "mutation rolled back");
        Err(error)
      }
    };

    self.pending.remove(&(resource, item_id, kind));
    Some(MutationOutcome {
      ticket: id,
      resource,
      item_id,
      kind,
      result: outcome,
    })
  }
}

impl fmt::Debug for MutationCoordinator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MutationCoordinator")
      .field("tickets", &self.tickets.len())
      .field("pending", &self.pending.len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  fn liked(like_count: u32, liked: bool) -> Engagement {
    Engagement {
      liked,
      like_count,
      ..Engagement::default()
    }
  }

  fn seeded_store() -> ItemStore {
    let mut store = ItemStore::new();
    store.insert_page(Resource::Article, [(42, liked(10, false))]);
    store
  }

  #[tokio::test]
  async fn test_optimistic_write_is_visible_immediately() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    let ticket = coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Ok(liked(11, true)) },
      )
      .unwrap();

    // Before the network resolves, the local state is already applied
    assert_eq!(store.get(Resource::Article, 42).unwrap(), liked(11, true));
    assert_eq!(
      coordinator.ticket(ticket).unwrap().state(),
      TicketState::Pending
    );
  }

  #[tokio::test]
  async fn test_commit_reconciles_with_server_values() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    // Server reports a different count than the optimistic guess
    let ticket = coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Ok(liked(14, true)) },
      )
      .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let outcomes = coordinator.poll(&mut store);

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());
    assert_eq!(store.get(Resource::Article, 42).unwrap(), liked(14, true));
    assert_eq!(
      coordinator.ticket(ticket).unwrap().state(),
      TicketState::Committed
    );
    assert!(!coordinator.is_pending(Resource::Article, 42, MutationKind::Like));
  }

  #[tokio::test]
  async fn test_network_failure_rolls_back_to_snapshot() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    let ticket = coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Err(Error::Network("connection reset".into())) },
      )
      .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let outcomes = coordinator.poll(&mut store);

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].result, Err(Error::Network(_))));
    assert_eq!(store.get(Resource::Article, 42).unwrap(), liked(10, false));
    assert_eq!(
      coordinator.ticket(ticket).unwrap().state(),
      TicketState::RolledBack
    );
  }

  #[tokio::test]
  async fn test_double_submit_yields_conflict() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    let slow = || async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok(liked(11, true))
    };

    coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        slow(),
      )
      .unwrap();

    let second = coordinator.apply(
      &mut store,
      Resource::Article,
      42,
      MutationKind::Like,
      liked(12, true),
      slow(),
    );
    assert!(matches!(second, Err(Error::Conflict { .. })));

    // A different kind on the same item is fine
    coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Scrap,
        Engagement {
          scraped: true,
          scrap_count: 1,
          ..Engagement::default()
        },
        async { Ok(Engagement::default()) },
      )
      .unwrap();
  }

  #[tokio::test]
  async fn test_resolution_is_idempotent() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    let ticket = coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Ok(liked(11, true)) },
      )
      .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(coordinator.poll(&mut store).len(), 1);
    let committed = store.get(Resource::Article, 42).unwrap();

    // A duplicate success callback for the same ticket is a no-op
    assert!(coordinator
      .resolve(&mut store, ticket, Ok(liked(99, true)))
      .is_none());
    assert_eq!(store.get(Resource::Article, 42).unwrap(), committed);

    // So is a late failure: no rollback after commit
    assert!(coordinator
      .resolve(
        &mut store,
        ticket,
        Err(Error::Network("late timeout".into()))
      )
      .is_none());
    assert_eq!(store.get(Resource::Article, 42).unwrap(), committed);
  }

  #[tokio::test]
  async fn test_rollback_restores_only_touched_fields() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Err(Error::Network("reset".into())) },
      )
      .unwrap();

    // A page merge lands mid-flight and updates the scrap fields
    store.update(Resource::Article, 42, |e| {
      e.scraped = true;
      e.scrap_count = 7;
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.poll(&mut store);

    let after = store.get(Resource::Article, 42).unwrap();
    // Like fields rolled back, scrap fields kept
    assert!(!after.liked);
    assert_eq!(after.like_count, 10);
    assert!(after.scraped);
    assert_eq!(after.scrap_count, 7);
  }

  #[tokio::test]
  async fn test_after_resolution_a_new_mutation_is_accepted() {
    let mut store = seeded_store();
    let mut coordinator = MutationCoordinator::new();

    coordinator
      .apply(
        &mut store,
        Resource::Article,
        42,
        MutationKind::Like,
        liked(11, true),
        async { Ok(liked(11, true)) },
      )
      .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.poll(&mut store);

    // Un-like after the like committed
    let ticket = coordinator.apply(
      &mut store,
      Resource::Article,
      42,
      MutationKind::Like,
      liked(10, false),
      async { Ok(liked(10, false)) },
    );
    assert!(ticket.is_ok());
  }
}
