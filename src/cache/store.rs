//! Shared engagement store and change notification.

use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::trace;

use crate::api::types::{Engagement, Resource};

/// In-memory store of engagement state, keyed by resource family and item id.
///
/// The store is passed explicitly (`&mut`) into the pagination merger and the
/// mutation coordinator; there is no ambient singleton. Readers always get
/// copies, never references into the map, and the exclusive borrow makes
/// concurrent writes from two logical operations unrepresentable.
#[derive(Debug, Default)]
pub struct ItemStore {
  items: HashMap<(Resource, u64), Engagement>,
  watchers: Vec<Watcher>,
}

#[derive(Debug)]
struct Watcher {
  resource: Resource,
  tx: mpsc::UnboundedSender<u64>,
}

impl ItemStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of an item's engagement state.
  pub fn get(&self, resource: Resource, id: u64) -> Option<Engagement> {
    self.items.get(&(resource, id)).copied()
  }

  /// Number of tracked items across all resource families.
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Bulk insert from a merged page. Last writer wins: a record fetched
  /// later overwrites whatever was there before.
  pub fn insert_page(
    &mut self,
    resource: Resource,
    entries: impl IntoIterator<Item = (u64, Engagement)>,
  ) {
    for (id, engagement) in entries {
      self.items.insert((resource, id), engagement);
      self.notify(resource, id);
    }
  }

  /// Apply a field-level update through a closure, creating a default record
  /// if the item was not tracked yet. Returns the post-update snapshot.
  pub fn update(
    &mut self,
    resource: Resource,
    id: u64,
    f: impl FnOnce(&mut Engagement),
  ) -> Engagement {
    let entry = self.items.entry((resource, id)).or_default();
    f(entry);
    let snapshot = *entry;
    trace!(%resource, id, ?snapshot, "store updated");
    self.notify(resource, id);
    snapshot
  }

  /// Subscribe to change notifications for one resource family.
  ///
  /// The receiver yields the ids of changed items. Dropping the receiver
  /// unsubscribes implicitly.
  pub fn subscribe(&mut self, resource: Resource) -> mpsc::UnboundedReceiver<u64> {
    let (tx, rx) = mpsc::unbounded_channel();
    self.watchers.push(Watcher { resource, tx });
    rx
  }

  fn notify(&mut self, resource: Resource, id: u64) {
    // Prune watchers whose receiver has been dropped
    self
      .watchers
      .retain(|w| w.resource != resource || w.tx.send(id).is_ok());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_returns_copies() {
    let mut store = ItemStore::new();
    store.insert_page(
      Resource::Article,
      [(1, Engagement {
        like_count: 10,
        ..Engagement::default()
      })],
    );

    let mut snapshot = store.get(Resource::Article, 1).unwrap();
    snapshot.like_count = 99;

    assert_eq!(store.get(Resource::Article, 1).unwrap().like_count, 10);
  }

  #[test]
  fn test_resource_families_do_not_collide() {
    let mut store = ItemStore::new();
    store.update(Resource::Article, 1, |e| e.like_count = 1);
    store.update(Resource::Recruit, 1, |e| e.like_count = 2);

    assert_eq!(store.get(Resource::Article, 1).unwrap().like_count, 1);
    assert_eq!(store.get(Resource::Recruit, 1).unwrap().like_count, 2);
  }

  #[test]
  fn test_insert_page_overwrites_existing_records() {
    let mut store = ItemStore::new();
    store.update(Resource::Article, 1, |e| {
      e.liked = true;
      e.like_count = 11;
    });
    store.insert_page(
      Resource::Article,
      [(1, Engagement {
        like_count: 12,
        ..Engagement::default()
      })],
    );

    // Last writer wins, including the liked flag
    let after = store.get(Resource::Article, 1).unwrap();
    assert_eq!(after.like_count, 12);
    assert!(!after.liked);
  }

  #[test]
  fn test_subscribers_receive_changed_ids() {
    let mut store = ItemStore::new();
    let mut rx = store.subscribe(Resource::Article);
    let mut other = store.subscribe(Resource::LunchMenu);

    store.update(Resource::Article, 7, |e| e.liked = true);
    store.insert_page(Resource::Article, [(8, Engagement::default())]);

    assert_eq!(rx.try_recv(), Ok(7));
    assert_eq!(rx.try_recv(), Ok(8));
    assert!(rx.try_recv().is_err());
    assert!(other.try_recv().is_err());
  }

  #[test]
  fn test_dropped_subscribers_are_pruned() {
    let mut store = ItemStore::new();
    let rx = store.subscribe(Resource::Article);
    drop(rx);

    store.update(Resource::Article, 1, |e| e.liked = true);
    assert!(store.watchers.is_empty());
  }
}
