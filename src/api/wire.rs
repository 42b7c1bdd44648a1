//! Serde-deserializable types matching the platform API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs. Every body is
//! decoded at the network boundary into a tagged [`ApiResponse`]: success
//! bodies are `{ "data": ... }` and failure bodies `{ "code", "message" }`.
//! Nothing downstream trusts a raw body.

use serde::{de::DeserializeOwned, Deserialize};

use crate::api::types::{
  ArticleCategory, ArticleSummary, CommentSummary, Engagement, LunchMenuSummary, RecruitSummary,
};
use crate::error::Error;
use crate::query::paged::Page;

/// Decoded API response, tagged at the network boundary.
#[derive(Debug)]
pub enum ApiResponse<T> {
  Success(T),
  Failure { code: String, message: String },
}

#[derive(Debug, Deserialize)]
struct SuccessBody<T> {
  data: T,
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
  #[serde(default)]
  code: String,
  #[serde(default)]
  message: String,
}

impl<T: DeserializeOwned> ApiResponse<T> {
  /// Decode a response body according to whether the HTTP status was a
  /// success. An undecodable success body is a transport error; failure
  /// bodies fall back to status-only information when unparseable.
  pub fn decode(http_ok: bool, body: &[u8]) -> Result<Self, Error> {
    if http_ok {
      let body: SuccessBody<T> = serde_json::from_slice(body)
        .map_err(|e| Error::Network(format!("malformed success body: {}", e)))?;
      Ok(ApiResponse::Success(body.data))
    } else {
      let body: FailureBody = serde_json::from_slice(body).unwrap_or_default();
      Ok(ApiResponse::Failure {
        code: body.code,
        message: body.message,
      })
    }
  }
}

impl<T> ApiResponse<T> {
  pub fn into_result(self) -> Result<T, Error> {
    match self {
      ApiResponse::Success(data) => Ok(data),
      ApiResponse::Failure { code, message } => Err(Error::Rejected { code, message }),
    }
  }
}

// ============================================================================
// List payloads
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticleCategory {
  pub board_id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticleSummary {
  pub post_id: u64,
  #[serde(default)]
  pub board_title: String,
  pub title: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub like_count: u32,
  #[serde(default)]
  pub comment_count: u32,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub nickname: String,
  #[serde(default)]
  pub anonymous: bool,
}

/// Cursor-paginated article list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticlePage {
  #[serde(default)]
  pub posts: Vec<ApiArticleSummary>,
  pub cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecruitSummary {
  pub recruit_id: u64,
  pub title: String,
  #[serde(default)]
  pub finished_recruit: bool,
  #[serde(default)]
  pub recruit_end: String,
  #[serde(default)]
  pub skills: Vec<ApiSkill>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSkill {
  pub name: String,
}

/// Cursor-paginated recruiting post list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecruitPage {
  #[serde(default)]
  pub recruits: Vec<ApiRecruitSummary>,
  pub cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentSummary {
  pub comment_id: u64,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub liked: bool,
  #[serde(default)]
  pub like_count: u32,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub nickname: String,
  #[serde(default)]
  pub anonymous: bool,
  #[serde(default, rename = "deletedComment")]
  pub deleted: bool,
}

/// Comment lists are returned whole, not paginated.
#[derive(Debug, Deserialize)]
pub struct ApiCommentsBody {
  #[serde(default)]
  pub comments: Vec<ApiCommentSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLunchMenuSummary {
  pub lunch_id: u64,
  pub main_menu: String,
  #[serde(default)]
  pub extra_menus: Vec<String>,
  #[serde(default)]
  pub polled: bool,
  #[serde(default)]
  pub poll_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLunchMenusBody {
  #[serde(default)]
  pub menus: Vec<ApiLunchMenuSummary>,
}

// ============================================================================
// Mutation payloads: server-authoritative counter values
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLikeResult {
  pub liked: bool,
  pub like_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiScrapResult {
  pub scraped: bool,
  pub scrap_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPollResult {
  pub poll_count: u32,
}

impl ApiLikeResult {
  pub fn into_engagement(self) -> Engagement {
    Engagement {
      liked: self.liked,
      like_count: self.like_count,
      ..Engagement::default()
    }
  }
}

impl ApiScrapResult {
  pub fn into_engagement(self) -> Engagement {
    Engagement {
      scraped: self.scraped,
      scrap_count: self.scrap_count,
      ..Engagement::default()
    }
  }
}

impl ApiPollResult {
  /// The vote endpoints only return the count; whether the user now has a
  /// vote follows from which endpoint was called.
  pub fn into_engagement(self, polled: bool) -> Engagement {
    Engagement {
      polled,
      poll_count: self.poll_count,
      ..Engagement::default()
    }
  }
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiArticleCategory {
  pub fn into_category(self) -> ArticleCategory {
    ArticleCategory {
      board_id: self.board_id,
      title: self.title,
      description: self.description,
    }
  }
}

impl ApiArticleSummary {
  pub fn into_summary(self) -> ArticleSummary {
    ArticleSummary {
      post_id: self.post_id,
      board_title: self.board_title,
      title: self.title,
      content: self.content,
      like_count: self.like_count,
      comment_count: self.comment_count,
      created_at: self.created_at,
      nickname: self.nickname,
      anonymous: self.anonymous,
    }
  }
}

impl ApiArticlePage {
  pub fn into_page(self) -> Page<ArticleSummary> {
    Page {
      items: self
        .posts
        .into_iter()
        .map(ApiArticleSummary::into_summary)
        .collect(),
      next_cursor: self.cursor,
    }
  }
}

impl ApiRecruitSummary {
  pub fn into_summary(self) -> RecruitSummary {
    RecruitSummary {
      recruit_id: self.recruit_id,
      title: self.title,
      finished_recruit: self.finished_recruit,
      recruit_end: self.recruit_end,
      skills: self.skills.into_iter().map(|s| s.name).collect(),
    }
  }
}

impl ApiRecruitPage {
  pub fn into_page(self) -> Page<RecruitSummary> {
    Page {
      items: self
        .recruits
        .into_iter()
        .map(ApiRecruitSummary::into_summary)
        .collect(),
      next_cursor: self.cursor,
    }
  }
}

impl ApiCommentSummary {
  pub fn into_summary(self) -> CommentSummary {
    CommentSummary {
      comment_id: self.comment_id,
      content: self.content,
      liked: self.liked,
      like_count: self.like_count,
      created_at: self.created_at,
      nickname: self.nickname,
      anonymous: self.anonymous,
      deleted: self.deleted,
    }
  }
}

impl ApiLunchMenuSummary {
  pub fn into_summary(self) -> LunchMenuSummary {
    LunchMenuSummary {
      lunch_id: self.lunch_id,
      main_menu: self.main_menu,
      extra_menus: self.extra_menus,
      polled: self.polled,
      poll_count: self.poll_count,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_success_envelope() {
    let body = br#"{"data":{"posts":[{"postId":1,"title":"hello","likeCount":3}],"cursor":5}}"#;
    let response: ApiResponse<ApiArticlePage> = ApiResponse::decode(true, body).unwrap();
    let page = response.into_result().unwrap().into_page();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].post_id, 1);
    assert_eq!(page.items[0].like_count, 3);
    assert_eq!(page.next_cursor, Some(5));
  }

  #[test]
  fn test_decode_null_cursor_as_exhausted() {
    let body = br#"{"data":{"posts":[],"cursor":null}}"#;
    let response: ApiResponse<ApiArticlePage> = ApiResponse::decode(true, body).unwrap();
    let page = response.into_result().unwrap().into_page();
    assert_eq!(page.next_cursor, None);
  }

  #[test]
  fn test_decode_failure_envelope_into_rejection() {
    let body = br#"{"code":"4003","message":"not allowed"}"#;
    let response: ApiResponse<ApiArticlePage> = ApiResponse::decode(false, body).unwrap();
    let err = response.into_result().unwrap_err();
    assert_eq!(
      err,
      Error::Rejected {
        code: "4003".into(),
        message: "not allowed".into(),
      }
    );
  }

  #[test]
  fn test_unparseable_failure_body_still_fails_cleanly() {
    let response: ApiResponse<ApiArticlePage> = ApiResponse::decode(false, b"<html>").unwrap();
    assert!(matches!(
      response.into_result(),
      Err(Error::Rejected { .. })
    ));
  }

  #[test]
  fn test_malformed_success_body_is_a_network_error() {
    let result: Result<ApiResponse<ApiArticlePage>, _> = ApiResponse::decode(true, b"{\"nope\":1}");
    assert!(matches!(result, Err(Error::Network(_))));
  }
}
