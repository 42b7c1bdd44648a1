//! Cache key registry for the platform's resources.
//!
//! Collection keys are strict prefixes of the keys of their members, so bulk
//! invalidation of e.g. everything article-related is a prefix match against
//! [`articles::all`]. Keys that only make sense for the signed-in user hang
//! off the [`auth`] prefix and drop together on sign-out.

use super::key::CacheKey;
use crate::api::types::{LunchDate, RecruitFilter};

/// Root for every per-user key. Invalidate on sign-in/sign-out.
pub fn auth() -> CacheKey {
  CacheKey::root("auth")
}

pub mod profile {
  use super::*;

  pub fn my_info() -> CacheKey {
    auth().name("my-info")
  }

  pub fn user_info(user_id: u64) -> CacheKey {
    CacheKey::root("user-info").id(user_id)
  }

  pub fn my_portfolio() -> CacheKey {
    auth().name("portfolio")
  }

  pub fn portfolio(user_id: u64) -> CacheKey {
    CacheKey::root("portfolio").id(user_id)
  }
}

pub mod articles {
  use super::*;

  pub fn all() -> CacheKey {
    CacheKey::root("articles")
  }

  pub fn categories() -> CacheKey {
    all().name("categories")
  }

  pub fn list(category_id: u64, keyword: Option<&str>) -> CacheKey {
    all().name("category").id(category_id).filter(keyword)
  }

  pub fn hot(keyword: Option<&str>) -> CacheKey {
    all().name("hot").filter(keyword)
  }

  pub fn detail(article_id: u64) -> CacheKey {
    all().id(article_id)
  }

  pub fn mine() -> CacheKey {
    auth().name("articles")
  }
}

pub mod comments {
  use super::*;

  pub fn of_article(article_id: u64) -> CacheKey {
    CacheKey::root("comments").id(article_id)
  }

  pub fn of_recruit(recruit_id: u64) -> CacheKey {
    CacheKey::root("recruit-comments").id(recruit_id)
  }
}

pub mod recruits {
  use super::*;

  pub fn all() -> CacheKey {
    CacheKey::root("recruits")
  }

  pub fn list(filter: &RecruitFilter) -> CacheKey {
    let finished = if filter.include_finished {
      "with-finished"
    } else {
      "open"
    };
    all()
      .filter(filter.category.map(|c| c.as_str()))
      .filter(filter.keyword.as_deref())
      .name(finished)
  }

  pub fn detail(recruit_id: u64) -> CacheKey {
    all().name("detail").id(recruit_id)
  }

  pub fn members(recruit_id: u64) -> CacheKey {
    all().name("members").id(recruit_id)
  }

  /// Applicant lists are only visible to the post author.
  pub fn applicants(recruit_id: u64) -> CacheKey {
    auth().name("recruits").id(recruit_id).name("applicants")
  }
}

pub mod lunch {
  use super::*;

  pub fn all() -> CacheKey {
    auth().name("lunch")
  }

  pub fn list(campus: &str, date: LunchDate) -> CacheKey {
    all().filter(Some(campus)).name(date.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::RecruitCategory;

  #[test]
  fn test_list_keys_are_deterministic() {
    assert_eq!(
      articles::list(3, Some("rust")),
      articles::list(3, Some("rust"))
    );
    let filter = RecruitFilter {
      category: Some(RecruitCategory::Project),
      keyword: Some("backend".into()),
      include_finished: false,
    };
    assert_eq!(recruits::list(&filter), recruits::list(&filter));
  }

  #[test]
  fn test_omitted_and_empty_keyword_share_a_key() {
    assert_eq!(articles::list(3, None), articles::list(3, Some("")));
    assert_eq!(articles::hot(None), articles::hot(Some("  ")));
  }

  #[test]
  fn test_detail_keys_extend_their_collection() {
    assert!(articles::detail(42).starts_with(&articles::all()));
    assert!(articles::list(3, Some("rust")).starts_with(&articles::all()));
    assert!(recruits::detail(7).starts_with(&recruits::all()));
    assert!(recruits::members(7).starts_with(&recruits::all()));
  }

  #[test]
  fn test_per_user_keys_share_the_auth_prefix() {
    assert!(profile::my_info().starts_with(&auth()));
    assert!(articles::mine().starts_with(&auth()));
    assert!(lunch::list("seoul", LunchDate::Today).starts_with(&auth()));
    assert!(recruits::applicants(7).starts_with(&auth()));
    // but not public keys
    assert!(!articles::all().starts_with(&auth()));
  }

  #[test]
  fn test_distinct_filters_produce_distinct_keys() {
    assert_ne!(articles::list(3, Some("rust")), articles::list(3, Some("go")));
    assert_ne!(articles::list(3, None), articles::list(4, None));
    assert_ne!(
      lunch::list("seoul", LunchDate::Today),
      lunch::list("seoul", LunchDate::Tomorrow)
    );
  }
}
