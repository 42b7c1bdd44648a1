//! Domain types for the platform's resources.
//!
//! Wire-level serde types live in [`crate::api::wire`]; these are the shapes
//! the rest of the crate works with.

use chrono::{Duration, Utc};
use std::fmt;

/// Resource families that carry cached, optimistically-updated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
  Article,
  Recruit,
  ArticleComment,
  RecruitComment,
  LunchMenu,
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Resource::Article => "article",
      Resource::Recruit => "recruit",
      Resource::ArticleComment => "article comment",
      Resource::RecruitComment => "recruit comment",
      Resource::LunchMenu => "lunch menu",
    };
    write!(f, "{}", name)
  }
}

/// Mutable engagement counters attached to an item.
///
/// These are the only fields the layer ever updates optimistically; each
/// mutation kind touches a fixed subset of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
  pub liked: bool,
  pub like_count: u32,
  pub scraped: bool,
  pub scrap_count: u32,
  pub polled: bool,
  pub poll_count: u32,
}

/// Items that can appear in a cursor-paginated feed.
pub trait FeedItem: Clone + Send + 'static {
  /// Identifier unique within the item's resource family
  fn item_id(&self) -> u64;

  /// Resource family, used as the item-store namespace
  fn resource() -> Resource;

  /// Engagement counters carried by the item, if the list payload has any
  fn engagement(&self) -> Option<Engagement> {
    None
  }
}

/// Article category (board) metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCategory {
  pub board_id: u64,
  pub title: String,
  pub description: String,
}

/// Summary of an article for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
  pub post_id: u64,
  pub board_title: String,
  pub title: String,
  pub content: String,
  pub like_count: u32,
  pub comment_count: u32,
  pub created_at: String,
  pub nickname: String,
  pub anonymous: bool,
}

impl FeedItem for ArticleSummary {
  fn item_id(&self) -> u64 {
    self.post_id
  }

  fn resource() -> Resource {
    Resource::Article
  }

  fn engagement(&self) -> Option<Engagement> {
    // List payloads carry counts only; liked/scraped flags come from the
    // detail endpoint or a later mutation commit
    Some(Engagement {
      like_count: self.like_count,
      ..Engagement::default()
    })
  }
}

/// Summary of a recruiting post for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruitSummary {
  pub recruit_id: u64,
  pub title: String,
  pub finished_recruit: bool,
  pub recruit_end: String,
  pub skills: Vec<String>,
}

impl FeedItem for RecruitSummary {
  fn item_id(&self) -> u64 {
    self.recruit_id
  }

  fn resource() -> Resource {
    Resource::Recruit
  }
}

/// A comment on an article or recruiting post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSummary {
  pub comment_id: u64,
  pub content: String,
  pub liked: bool,
  pub like_count: u32,
  pub created_at: String,
  pub nickname: String,
  pub anonymous: bool,
  pub deleted: bool,
}

impl FeedItem for CommentSummary {
  fn item_id(&self) -> u64 {
    self.comment_id
  }

  fn resource() -> Resource {
    Resource::ArticleComment
  }

  fn engagement(&self) -> Option<Engagement> {
    Some(Engagement {
      liked: self.liked,
      like_count: self.like_count,
      ..Engagement::default()
    })
  }
}

/// A lunch menu candidate with its vote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunchMenuSummary {
  pub lunch_id: u64,
  pub main_menu: String,
  pub extra_menus: Vec<String>,
  pub polled: bool,
  pub poll_count: u32,
}

impl FeedItem for LunchMenuSummary {
  fn item_id(&self) -> u64 {
    self.lunch_id
  }

  fn resource() -> Resource {
    Resource::LunchMenu
  }

  fn engagement(&self) -> Option<Engagement> {
    Some(Engagement {
      polled: self.polled,
      poll_count: self.poll_count,
      ..Engagement::default()
    })
  }
}

/// Lunch menu date selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LunchDate {
  Today,
  Tomorrow,
}

impl LunchDate {
  pub fn as_str(self) -> &'static str {
    match self {
      LunchDate::Today => "today",
      LunchDate::Tomorrow => "tomorrow",
    }
  }

  /// Resolve to the concrete date the wire format expects.
  pub fn to_date(self) -> chrono::NaiveDate {
    let today = Utc::now().date_naive();
    match self {
      LunchDate::Today => today,
      LunchDate::Tomorrow => today + Duration::days(1),
    }
  }
}

/// Recruiting post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecruitCategory {
  Project,
  Study,
}

impl RecruitCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      RecruitCategory::Project => "project",
      RecruitCategory::Study => "study",
    }
  }
}

/// Filters for the recruiting post feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecruitFilter {
  pub category: Option<RecruitCategory>,
  pub keyword: Option<String>,
  /// Include posts whose recruiting period already ended
  pub include_finished: bool,
}
