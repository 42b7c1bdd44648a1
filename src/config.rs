use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::endpoints::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Default campus for lunch menu queries
  pub default_campus: Option<String>,
  #[serde(default)]
  pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the platform API, e.g. "https://api.example.com/api"
  pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// Items per page for cursor-paginated feeds
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

fn default_page_size() -> u32 {
  DEFAULT_PAGE_SIZE
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./plaza.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/plaza/config.yaml
  /// 4. ~/.config/plaza/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/plaza/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("plaza.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("plaza").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks PLAZA_API_TOKEN first, then PLAZA_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("PLAZA_API_TOKEN")
      .or_else(|_| std::env::var("PLAZA_TOKEN"))
      .map_err(|_| eyre!("API token not found. Set the PLAZA_API_TOKEN environment variable."))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str(
      r#"
api:
  base_url: "https://api.example.com/api"
"#,
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://api.example.com/api");
    assert_eq!(config.feed.page_size, DEFAULT_PAGE_SIZE);
    assert!(config.default_campus.is_none());
  }

  #[test]
  fn test_parse_full_config() {
    let config: Config = serde_yaml::from_str(
      r#"
api:
  base_url: "https://api.example.com/api"
default_campus: "서울"
feed:
  page_size: 25
"#,
    )
    .unwrap();

    assert_eq!(config.default_campus.as_deref(), Some("서울"));
    assert_eq!(config.feed.page_size, 25);
  }
}
