//! Pure builders mapping logical request parameters to URL paths with
//! encoded query strings.
//!
//! Builders never emit a malformed URL: structurally invalid identifiers
//! fail with [`Error::InvalidParameter`] instead. Sentinel-empty values
//! (blank keyword) are omitted from the query string entirely, never
//! emitted as `key=`.

use url::form_urlencoded::Serializer;

use crate::error::Error;

/// Default number of items per page for cursor-paginated endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound the backend accepts for `size`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paging window for cursor-paginated list endpoints.
///
/// `cursor == None` requests the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
  pub cursor: Option<u64>,
  pub size: u32,
}

impl Default for PageQuery {
  fn default() -> Self {
    Self {
      cursor: None,
      size: DEFAULT_PAGE_SIZE,
    }
  }
}

fn require_id(name: &str, id: u64) -> Result<u64, Error> {
  if id == 0 {
    return Err(Error::InvalidParameter(format!("{} must be positive", name)));
  }
  Ok(id)
}

fn check_page(page: PageQuery) -> Result<PageQuery, Error> {
  if page.size == 0 || page.size > MAX_PAGE_SIZE {
    return Err(Error::InvalidParameter(format!(
      "size must be in 1..={}, got {}",
      MAX_PAGE_SIZE, page.size
    )));
  }
  Ok(page)
}

/// Treat blank keywords as absent.
fn trimmed(keyword: Option<&str>) -> Option<&str> {
  keyword.map(str::trim).filter(|k| !k.is_empty())
}

fn append_page(qs: &mut Serializer<'_, String>, page: PageQuery) {
  if let Some(cursor) = page.cursor {
    qs.append_pair("cursor", &cursor.to_string());
  }
  qs.append_pair("size", &page.size.to_string());
}

pub mod articles {
  use super::*;

  pub fn categories() -> &'static str {
    "/boards"
  }

  /// Articles in a category. A non-empty keyword switches to the search
  /// endpoint, matching the backend's route split.
  pub fn list(category_id: u64, page: PageQuery, keyword: Option<&str>) -> Result<String, Error> {
    let category_id = require_id("categoryId", category_id)?;
    let page = check_page(page)?;

    let mut qs = Serializer::new(String::new());
    qs.append_pair("boardId", &category_id.to_string());
    append_page(&mut qs, page);

    match trimmed(keyword) {
      Some(keyword) => {
        qs.append_pair("keyword", keyword);
        Ok(format!("/posts/search?{}", qs.finish()))
      }
      None => Ok(format!("/posts?{}", qs.finish())),
    }
  }

  /// Trending articles across all categories.
  pub fn hot(page: PageQuery, keyword: Option<&str>) -> Result<String, Error> {
    let page = check_page(page)?;

    let mut qs = Serializer::new(String::new());
    append_page(&mut qs, page);

    match trimmed(keyword) {
      Some(keyword) => {
        qs.append_pair("keyword", keyword);
        Ok(format!("/posts/hot/search?{}", qs.finish()))
      }
      None => Ok(format!("/posts/hot?{}", qs.finish())),
    }
  }

  /// Articles written by the signed-in user.
  pub fn mine(page: PageQuery) -> Result<String, Error> {
    let page = check_page(page)?;
    let mut qs = Serializer::new(String::new());
    append_page(&mut qs, page);
    Ok(format!("/posts/my?{}", qs.finish()))
  }

  pub fn detail(article_id: u64) -> Result<String, Error> {
    let article_id = require_id("articleId", article_id)?;
    Ok(format!("/posts/{}", article_id))
  }

  pub fn like(article_id: u64) -> Result<String, Error> {
    Ok(format!("{}/like", detail(article_id)?))
  }

  pub fn scrap(article_id: u64) -> Result<String, Error> {
    Ok(format!("{}/scrap", detail(article_id)?))
  }

  pub fn report(article_id: u64) -> Result<String, Error> {
    Ok(format!("{}/report", detail(article_id)?))
  }
}

pub mod comments {
  use super::*;

  pub fn of_article(article_id: u64) -> Result<String, Error> {
    let article_id = require_id("articleId", article_id)?;
    let mut qs = Serializer::new(String::new());
    qs.append_pair("postId", &article_id.to_string());
    Ok(format!("/comments?{}", qs.finish()))
  }

  // Same route as the list; the method differs
  pub fn create(article_id: u64) -> Result<String, Error> {
    of_article(article_id)
  }

  pub fn detail(comment_id: u64) -> Result<String, Error> {
    let comment_id = require_id("commentId", comment_id)?;
    Ok(format!("/comments/{}", comment_id))
  }

  pub fn like(comment_id: u64) -> Result<String, Error> {
    Ok(format!("{}/like", detail(comment_id)?))
  }

  pub fn reply(article_id: u64, comment_id: u64) -> Result<String, Error> {
    let article_id = require_id("articleId", article_id)?;
    let comment_id = require_id("commentId", comment_id)?;
    let mut qs = Serializer::new(String::new());
    qs.append_pair("commentId", &comment_id.to_string());
    qs.append_pair("postId", &article_id.to_string());
    Ok(format!("/comments/reply?{}", qs.finish()))
  }
}

pub mod recruits {
  use super::*;
  use crate::api::types::RecruitFilter;

  pub fn list(page: PageQuery, filter: &RecruitFilter) -> Result<String, Error> {
    let page = check_page(page)?;

    let mut qs = Serializer::new(String::new());
    append_page(&mut qs, page);
    if let Some(category) = filter.category {
      qs.append_pair("category", category.as_str());
    }
    if let Some(keyword) = trimmed(filter.keyword.as_deref()) {
      qs.append_pair("keyword", keyword);
    }
    qs.append_pair(
      "isFinished",
      if filter.include_finished { "true" } else { "false" },
    );
    Ok(format!("/recruits?{}", qs.finish()))
  }

  pub fn detail(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    Ok(format!("/recruits/{}/detail", recruit_id))
  }

  pub fn members(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    Ok(format!("/recruits/{}/members", recruit_id))
  }

  pub fn scrap(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    Ok(format!("/recruits/{}/scrap", recruit_id))
  }

  pub fn apply(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    Ok(format!("/recruits/{}/application", recruit_id))
  }

  pub fn comments(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    Ok(format!("/recruits/{}/comments", recruit_id))
  }

  pub fn applicants(recruit_id: u64) -> Result<String, Error> {
    let recruit_id = require_id("recruitId", recruit_id)?;
    let mut qs = Serializer::new(String::new());
    qs.append_pair("recruitId", &recruit_id.to_string());
    Ok(format!("/recruit-applications?{}", qs.finish()))
  }
}

pub mod members {
  use super::*;

  pub fn my_info() -> &'static str {
    "/members"
  }

  pub fn user_info(user_id: u64) -> Result<String, Error> {
    let user_id = require_id("userId", user_id)?;
    Ok(format!("/members/{}/default-information", user_id))
  }

  pub fn portfolio(user_id: u64) -> Result<String, Error> {
    let user_id = require_id("userId", user_id)?;
    Ok(format!("/members/{}/portfolio", user_id))
  }
}

pub mod meta {
  pub fn campuses() -> &'static str {
    "/meta/campuses"
  }

  pub fn skills() -> &'static str {
    "/meta/skills"
  }

  pub fn recruit_types() -> &'static str {
    "/meta/recruit-types"
  }
}

pub mod lunch {
  use super::*;

  pub fn list(campus: &str, date: chrono::NaiveDate) -> Result<String, Error> {
    let campus = campus.trim();
    if campus.is_empty() {
      return Err(Error::InvalidParameter("campus must not be blank".into()));
    }
    let mut qs = Serializer::new(String::new());
    qs.append_pair("campus", campus);
    qs.append_pair("date", &date.format("%Y-%m-%d").to_string());
    Ok(format!("/lunch?{}", qs.finish()))
  }

  pub fn vote(lunch_id: u64) -> Result<String, Error> {
    let lunch_id = require_id("lunchId", lunch_id)?;
    Ok(format!("/lunch/poll/{}", lunch_id))
  }

  pub fn revert_vote(lunch_id: u64) -> Result<String, Error> {
    let lunch_id = require_id("lunchId", lunch_id)?;
    Ok(format!("/lunch/poll/revert/{}", lunch_id))
  }
}
