//! HTTP client for the platform API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::endpoints::{self, PageQuery};
use crate::api::types::{
  ArticleCategory, ArticleSummary, CommentSummary, Engagement, LunchMenuSummary, RecruitFilter,
  RecruitSummary,
};
use crate::api::wire::{
  ApiArticleCategory, ApiArticlePage, ApiCommentsBody, ApiLikeResult, ApiLunchMenusBody,
  ApiPollResult, ApiRecruitPage, ApiResponse, ApiScrapResult,
};
use crate::config::Config;
use crate::error::Error;
use crate::query::paged::Page;

/// Thin client over the platform's HTTP+JSON API.
///
/// Every response body is decoded at this boundary into a tagged
/// success/failure result; nothing downstream ever sees a raw body.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self, Error> {
    let base = Url::parse(&config.api.base_url)
      .map_err(|e| Error::InvalidParameter(format!("base url: {}", e)))?;

    let mut headers = HeaderMap::new();
    if let Ok(token) = Config::get_api_token() {
      let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::InvalidParameter("API token contains invalid characters".into()))?;
      headers.insert(AUTHORIZATION, value);
    }

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| Error::Network(e.to_string()))?;

    Ok(Self { http, base })
  }

  fn url(&self, endpoint: &str) -> Result<Url, Error> {
    let joined = format!(
      "{}/{}",
      self.base.as_str().trim_end_matches('/'),
      endpoint.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| Error::Network(format!("bad request url: {}", e)))
  }

  async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
    let url = self.url(endpoint)?;
    debug!(%url, "GET");
    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| Error::Network(e.to_string()))?;

    let http_ok = response.status().is_success();
    let body = response
      .bytes()
      .await
      .map_err(|e| Error::Network(e.to_string()))?;
    ApiResponse::decode(http_ok, &body)?.into_result()
  }

  async fn post<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    body: Option<serde_json::Value>,
  ) -> Result<T, Error> {
    let url = self.url(endpoint)?;
    debug!(%url, "POST");
    let mut request = self.http.post(url);
    if let Some(body) = body {
      request = request.json(&body);
    }
    let response = request
      .send()
      .await
      .map_err(|e| Error::Network(e.to_string()))?;

    let http_ok = response.status().is_success();
    let body = response
      .bytes()
      .await
      .map_err(|e| Error::Network(e.to_string()))?;
    ApiResponse::decode(http_ok, &body)?.into_result()
  }

  // ==========================================================================
  // Reads
  // ==========================================================================

  pub async fn article_categories(&self) -> Result<Vec<ArticleCategory>, Error> {
    let categories: Vec<ApiArticleCategory> = self.get(endpoints::articles::categories()).await?;
    Ok(
      categories
        .into_iter()
        .map(ApiArticleCategory::into_category)
        .collect(),
    )
  }

  /// One page of articles in a category, optionally filtered by keyword.
  pub async fn article_page(
    &self,
    category_id: u64,
    page: PageQuery,
    keyword: Option<&str>,
  ) -> Result<Page<ArticleSummary>, Error> {
    let endpoint = endpoints::articles::list(category_id, page, keyword)?;
    let page: ApiArticlePage = self.get(&endpoint).await?;
    Ok(page.into_page())
  }

  /// One page of trending articles.
  pub async fn hot_article_page(
    &self,
    page: PageQuery,
    keyword: Option<&str>,
  ) -> Result<Page<ArticleSummary>, Error> {
    let endpoint = endpoints::articles::hot(page, keyword)?;
    let page: ApiArticlePage = self.get(&endpoint).await?;
    Ok(page.into_page())
  }

  /// One page of the signed-in user's articles.
  pub async fn my_article_page(&self, page: PageQuery) -> Result<Page<ArticleSummary>, Error> {
    let endpoint = endpoints::articles::mine(page)?;
    let page: ApiArticlePage = self.get(&endpoint).await?;
    Ok(page.into_page())
  }

  /// One page of recruiting posts.
  pub async fn recruit_page(
    &self,
    page: PageQuery,
    filter: &RecruitFilter,
  ) -> Result<Page<RecruitSummary>, Error> {
    let endpoint = endpoints::recruits::list(page, filter)?;
    let page: ApiRecruitPage = self.get(&endpoint).await?;
    Ok(page.into_page())
  }

  /// All comments on an article. Comment lists are not paginated.
  pub async fn article_comments(&self, article_id: u64) -> Result<Vec<CommentSummary>, Error> {
    let endpoint = endpoints::comments::of_article(article_id)?;
    let body: ApiCommentsBody = self.get(&endpoint).await?;
    Ok(
      body
        .comments
        .into_iter()
        .map(|c| c.into_summary())
        .collect(),
    )
  }

  /// All comments on a recruiting post.
  pub async fn recruit_comments(&self, recruit_id: u64) -> Result<Vec<CommentSummary>, Error> {
    let endpoint = endpoints::recruits::comments(recruit_id)?;
    let body: ApiCommentsBody = self.get(&endpoint).await?;
    Ok(
      body
        .comments
        .into_iter()
        .map(|c| c.into_summary())
        .collect(),
    )
  }

  /// Lunch menu candidates for one campus and date.
  pub async fn lunch_menus(
    &self,
    campus: &str,
    date: chrono::NaiveDate,
  ) -> Result<Vec<LunchMenuSummary>, Error> {
    let endpoint = endpoints::lunch::list(campus, date)?;
    let body: ApiLunchMenusBody = self.get(&endpoint).await?;
    Ok(body.menus.into_iter().map(|m| m.into_summary()).collect())
  }

  // ==========================================================================
  // Engagement mutations. Each returns the server-authoritative values for
  // the fields the action touches.
  // ==========================================================================

  pub async fn like_article(&self, article_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::articles::like(article_id)?;
    let result: ApiLikeResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement())
  }

  pub async fn scrap_article(&self, article_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::articles::scrap(article_id)?;
    let result: ApiScrapResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement())
  }

  pub async fn like_comment(&self, comment_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::comments::like(comment_id)?;
    let result: ApiLikeResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement())
  }

  pub async fn scrap_recruit(&self, recruit_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::recruits::scrap(recruit_id)?;
    let result: ApiScrapResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement())
  }

  pub async fn vote_lunch(&self, lunch_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::lunch::vote(lunch_id)?;
    let result: ApiPollResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement(true))
  }

  pub async fn revert_lunch_vote(&self, lunch_id: u64) -> Result<Engagement, Error> {
    let endpoint = endpoints::lunch::revert_vote(lunch_id)?;
    let result: ApiPollResult = self.post(&endpoint, None).await?;
    Ok(result.into_engagement(false))
  }
}

impl std::fmt::Debug for ApiClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ApiClient")
      .field("base", &self.base.as_str())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{ApiConfig, Config};

  fn test_config(base_url: &str) -> Config {
    Config {
      api: ApiConfig {
        base_url: base_url.to_string(),
      },
      default_campus: None,
      feed: Default::default(),
    }
  }

  #[test]
  fn test_url_joining_tolerates_slashes() {
    let client = ApiClient::new(&test_config("https://api.example.com/v1/")).unwrap();
    let url = client.url("/posts?size=10").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/posts?size=10");

    let url = client.url("posts/3/like").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/posts/3/like");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    assert!(matches!(
      ApiClient::new(&test_config("not a url")),
      Err(Error::InvalidParameter(_))
    ));
  }
}
