//! Cursor-paginated feed with merge-on-append semantics.
//!
//! A `PagedQuery<T>` encapsulates async page fetching, the feed lifecycle,
//! and the merged result set for one cache key. It is polled from the
//! caller's event loop; network tasks only ever talk back through a channel,
//! so every state transition happens on the caller's logical thread.
//!
//! # Example
//!
//! ```ignore
//! let mut feed = session.article_feed(3, Some("rust"));
//!
//! feed.fetch_first();
//!
//! // In event loop tick
//! if feed.poll(&mut store) {
//!     // State changed, trigger re-render
//! }
//!
//! match feed.phase() {
//!     FeedPhase::Ready => render_list(feed.items()),
//!     FeedPhase::Error => render_error(feed.last_error()),
//!     _ => render_spinner(),
//! }
//! ```

use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::types::FeedItem;
use crate::cache::key::CacheKey;
use crate::cache::store::ItemStore;
use crate::error::Error;

/// One fetched page of items plus the cursor where the next page starts.
///
/// Immutable once produced; `next_cursor == None` means the feed is
/// exhausted after this page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub next_cursor: Option<u64>,
}

/// Lifecycle of a paged feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
  /// Nothing fetched yet
  Empty,
  /// First page in flight
  LoadingFirst,
  /// At least one page merged and a next cursor is known
  Ready,
  /// Next page in flight
  LoadingNext,
  /// Server reported no further cursor
  Exhausted,
  /// First fetch failed; there is nothing to show
  Error,
}

type PageFuture<T> = BoxFuture<'static, Result<Page<T>, Error>>;

/// A factory producing the fetch future for a given cursor.
type PageFetcher<T> = Box<dyn Fn(Option<u64>) -> PageFuture<T> + Send + Sync>;

/// Cursor-paginated feed for one cache key.
///
/// Holds the ordered, de-duplicated concatenation of all fetched pages.
/// Server order is authoritative: items are appended in received order and
/// never re-sorted. At most one fetch is in flight at a time.
pub struct PagedQuery<T> {
  key: CacheKey,
  phase: FeedPhase,
  items: Vec<T>,
  seen: HashSet<u64>,
  next_cursor: Option<u64>,
  last_error: Option<Error>,
  fetcher: PageFetcher<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<Page<T>, Error>>>,
  fetched_at: Option<DateTime<Utc>>,
  stale_time: Duration,
}

impl<T: FeedItem> PagedQuery<T> {
  /// Create a feed for `key`. The fetcher receives the cursor to fetch from
  /// (`None` for the first page) and is called once per page request.
  pub fn new<F, Fut>(key: CacheKey, fetcher: F) -> Self
  where
    F: Fn(Option<u64>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, Error>> + Send + 'static,
  {
    Self {
      key,
      phase: FeedPhase::Empty,
      items: Vec::new(),
      seen: HashSet::new(),
      next_cursor: None,
      last_error: None,
      fetcher: Box::new(move |cursor| Box::pin(fetcher(cursor))),
      receiver: None,
      fetched_at: None,
      stale_time: Duration::minutes(5),
    }
  }

  /// Set how long merged data stays fresh before `is_stale` reports true.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn key(&self) -> &CacheKey {
    &self.key
  }

  pub fn phase(&self) -> FeedPhase {
    self.phase
  }

  /// The merged collection, in server order, first occurrence of each id.
  pub fn items(&self) -> &[T] {
    &self.items
  }

  /// The error surfaced by the most recent failed fetch, if any.
  pub fn last_error(&self) -> Option<&Error> {
    self.last_error.as_ref()
  }

  pub fn next_cursor(&self) -> Option<u64> {
    self.next_cursor
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.phase, FeedPhase::LoadingFirst | FeedPhase::LoadingNext)
  }

  /// Whether another page can be requested right now.
  pub fn has_more(&self) -> bool {
    self.phase == FeedPhase::Ready && self.next_cursor.is_some()
  }

  /// Whether the merged data is older than the configured stale time.
  pub fn is_stale(&self) -> bool {
    match self.phase {
      FeedPhase::Ready | FeedPhase::Exhausted => self
        .fetched_at
        .map(|t| Utc::now() - t > self.stale_time)
        .unwrap_or(true),
      _ => false,
    }
  }

  /// Start fetching the first page.
  ///
  /// No-op unless the feed is `Empty` or `Error`; a failed first fetch
  /// retries from scratch, and a fetch while loading is ignored.
  pub fn fetch_first(&mut self) {
    match self.phase {
      FeedPhase::Empty | FeedPhase::Error => {}
      _ => return,
    }
    self.last_error = None;
    self.phase = FeedPhase::LoadingFirst;
    self.start_fetch(None);
  }

  /// Request the next page. No-op unless `Ready` with a known next cursor.
  pub fn fetch_next(&mut self) {
    if self.phase != FeedPhase::Ready {
      return;
    }
    let Some(cursor) = self.next_cursor else {
      return;
    };
    self.phase = FeedPhase::LoadingNext;
    self.start_fetch(Some(cursor));
  }

  /// Cancel an in-flight fetch, returning to the prior stable state.
  /// Already-committed pages are untouched.
  pub fn cancel(&mut self) {
    self.receiver = None;
    match self.phase {
      FeedPhase::LoadingFirst => self.phase = FeedPhase::Empty,
      FeedPhase::LoadingNext => self.phase = FeedPhase::Ready,
      _ => {}
    }
  }

  /// Replace the key after a filter change.
  ///
  /// Clears the merged collection and marks any in-flight request stale:
  /// its resolution, success or failure, is discarded silently.
  pub fn rekey(&mut self, key: CacheKey) {
    debug!(old = %self.key, new = %key, "rekeying feed");
    self.key = key;
    self.reset();
  }

  /// Clear all merged pages and return to `Empty`.
  pub fn reset(&mut self) {
    // Dropping the channel makes any stale response a no-op
    self.receiver = None;
    self.items.clear();
    self.seen.clear();
    self.next_cursor = None;
    self.last_error = None;
    self.fetched_at = None;
    self.phase = FeedPhase::Empty;
  }

  /// Poll for a fetch result, merging it into the feed and bulk-inserting
  /// engagement state into `store`. Returns `true` if the state changed.
  pub fn poll(&mut self, store: &mut ItemStore) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(page)) => {
        self.receiver = None;
        self.merge(page, store);
        true
      }
      Ok(Err(error)) => {
        self.receiver = None;
        self.fail(error);
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending
        self.receiver = None;
        self.fail(Error::Network("fetch task dropped without a result".into()));
        true
      }
    }
  }

  fn merge(&mut self, page: Page<T>, store: &mut ItemStore) {
    let mut engagements = Vec::new();
    for item in page.items {
      // Overlapping pages (e.g. after a concurrent refetch shifted the
      // window) keep the first-seen occurrence; later duplicates are dropped
      if !self.seen.insert(item.item_id()) {
        continue;
      }
      if let Some(engagement) = item.engagement() {
        engagements.push((item.item_id(), engagement));
      }
      self.items.push(item);
    }
    store.insert_page(T::resource(), engagements);

    self.next_cursor = page.next_cursor;
    self.phase = if page.next_cursor.is_some() {
      FeedPhase::Ready
    } else {
      FeedPhase::Exhausted
    };
    self.fetched_at = Some(Utc::now());
    debug!(
      key = %self.key,
      total = self.items.len(),
      cursor = ?self.next_cursor,
      "page merged"
    );
  }

  fn fail(&mut self, error: Error) {
    warn!(key = %self.key, %error, "feed fetch failed");
    // A failed next-page fetch keeps the committed pages and stays
    // retryable; a failed first fetch leaves nothing to show
    self.phase = match self.phase {
      FeedPhase::LoadingNext => FeedPhase::Ready,
      _ => FeedPhase::Error,
    };
    self.last_error = Some(error);
  }

  fn start_fetch(&mut self, cursor: Option<u64>) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let future = (self.fetcher)(cursor);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the request may have gone stale
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PagedQuery<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PagedQuery")
      .field("key", &self.key)
      .field("phase", &self.phase)
      .field("items", &self.items.len())
      .field("next_cursor", &self.next_cursor)
      .finish_non_exhaustive()
  }
}
