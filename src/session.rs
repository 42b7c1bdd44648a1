//! Session facade wiring configuration, the API client, feeds and mutations.
//!
//! A `Session` builds [`PagedQuery`] feeds with their cache key and fetcher
//! already wired, and routes engagement actions through the
//! [`MutationCoordinator`]. The [`ItemStore`] is owned by the caller and
//! passed in explicitly, so the UI layer decides its lifetime and scope.

use color_eyre::Result;

use crate::api::client::ApiClient;
use crate::api::endpoints::PageQuery;
use crate::api::types::{
  ArticleCategory, ArticleSummary, CommentSummary, Engagement, LunchDate, LunchMenuSummary,
  RecruitFilter, RecruitSummary, Resource,
};
use crate::cache::keys;
use crate::cache::store::ItemStore;
use crate::config::Config;
use crate::error::Error;
use crate::query::mutation::{MutationCoordinator, MutationKind, MutationOutcome, TicketId};
use crate::query::paged::PagedQuery;

/// Entry point for the data layer.
pub struct Session {
  client: ApiClient,
  coordinator: MutationCoordinator,
  page_size: u32,
}

impl Session {
  pub fn new(config: &Config) -> Result<Self> {
    let client = ApiClient::new(config)?;
    Ok(Self {
      client,
      coordinator: MutationCoordinator::new(),
      page_size: config.feed.page_size,
    })
  }

  pub fn client(&self) -> &ApiClient {
    &self.client
  }

  // ==========================================================================
  // Feeds
  // ==========================================================================

  /// Paged feed of articles in a category, optionally filtered by keyword.
  pub fn article_feed(&self, category_id: u64, keyword: Option<&str>) -> PagedQuery<ArticleSummary> {
    let client = self.client.clone();
    let size = self.page_size;
    let keyword = keyword.map(str::to_owned);
    PagedQuery::new(keys::articles::list(category_id, keyword.as_deref()), move |cursor| {
      let client = client.clone();
      let keyword = keyword.clone();
      async move {
        client
          .article_page(category_id, PageQuery { cursor, size }, keyword.as_deref())
          .await
      }
    })
  }

  /// Paged feed of trending articles.
  pub fn hot_article_feed(&self, keyword: Option<&str>) -> PagedQuery<ArticleSummary> {
    let client = self.client.clone();
    let size = self.page_size;
    let keyword = keyword.map(str::to_owned);
    PagedQuery::new(keys::articles::hot(keyword.as_deref()), move |cursor| {
      let client = client.clone();
      let keyword = keyword.clone();
      async move {
        client
          .hot_article_page(PageQuery { cursor, size }, keyword.as_deref())
          .await
      }
    })
  }

  /// Paged feed of the signed-in user's articles.
  pub fn my_article_feed(&self) -> PagedQuery<ArticleSummary> {
    let client = self.client.clone();
    let size = self.page_size;
    PagedQuery::new(keys::articles::mine(), move |cursor| {
      let client = client.clone();
      async move { client.my_article_page(PageQuery { cursor, size }).await }
    })
  }

  /// Paged feed of recruiting posts.
  pub fn recruit_feed(&self, filter: RecruitFilter) -> PagedQuery<RecruitSummary> {
    let client = self.client.clone();
    let size = self.page_size;
    let key = keys::recruits::list(&filter);
    PagedQuery::new(key, move |cursor| {
      let client = client.clone();
      let filter = filter.clone();
      async move {
        client
          .recruit_page(PageQuery { cursor, size }, &filter)
          .await
      }
    })
  }

  // ==========================================================================
  // Unpaginated reads, passed straight through to the client
  // ==========================================================================

  pub async fn article_categories(&self) -> Result<Vec<ArticleCategory>, Error> {
    self.client.article_categories().await
  }

  pub async fn article_comments(&self, article_id: u64) -> Result<Vec<CommentSummary>, Error> {
    self.client.article_comments(article_id).await
  }

  pub async fn recruit_comments(&self, recruit_id: u64) -> Result<Vec<CommentSummary>, Error> {
    self.client.recruit_comments(recruit_id).await
  }

  pub async fn lunch_menus(
    &self,
    campus: &str,
    date: LunchDate,
  ) -> Result<Vec<LunchMenuSummary>, Error> {
    self.client.lunch_menus(campus, date.to_date()).await
  }

  // ==========================================================================
  // Optimistic mutations. `local` is the state the caller expects the server
  // to confirm; only the fields the mutation kind touches are read from it.
  // ==========================================================================

  pub fn like_article(
    &mut self,
    store: &mut ItemStore,
    article_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::Article,
      article_id,
      MutationKind::Like,
      local,
      async move { client.like_article(article_id).await },
    )
  }

  pub fn scrap_article(
    &mut self,
    store: &mut ItemStore,
    article_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::Article,
      article_id,
      MutationKind::Scrap,
      local,
      async move { client.scrap_article(article_id).await },
    )
  }

  pub fn like_comment(
    &mut self,
    store: &mut ItemStore,
    comment_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::ArticleComment,
      comment_id,
      MutationKind::Like,
      local,
      async move { client.like_comment(comment_id).await },
    )
  }

  pub fn scrap_recruit(
    &mut self,
    store: &mut ItemStore,
    recruit_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::Recruit,
      recruit_id,
      MutationKind::Scrap,
      local,
      async move { client.scrap_recruit(recruit_id).await },
    )
  }

  pub fn vote_lunch(
    &mut self,
    store: &mut ItemStore,
    lunch_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::LunchMenu,
      lunch_id,
      MutationKind::Vote,
      local,
      async move { client.vote_lunch(lunch_id).await },
    )
  }

  pub fn revert_lunch_vote(
    &mut self,
    store: &mut ItemStore,
    lunch_id: u64,
    local: Engagement,
  ) -> Result<TicketId, Error> {
    let client = self.client.clone();
    self.coordinator.apply(
      store,
      Resource::LunchMenu,
      lunch_id,
      MutationKind::Vote,
      local,
      async move { client.revert_lunch_vote(lunch_id).await },
    )
  }

  /// Drain resolved mutations, committing or rolling back each one.
  /// Call from the event loop tick, alongside polling the active feeds.
  pub fn poll(&mut self, store: &mut ItemStore) -> Vec<MutationOutcome> {
    self.coordinator.poll(store)
  }

  /// Whether a mutation of `kind` is pending for this item, e.g. to disable
  /// the corresponding button.
  pub fn is_mutation_pending(&self, resource: Resource, item_id: u64, kind: MutationKind) -> bool {
    self.coordinator.is_pending(resource, item_id, kind)
  }
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("client", &self.client)
      .field("coordinator", &self.coordinator)
      .field("page_size", &self.page_size)
      .finish()
  }
}
