//! Site configuration, read from `site.yaml` in the site root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, SiteError};
use crate::graph::{GraphOptions, OrphanPolicy, PageOrder};

pub const CONFIG_FILE: &str = "site.yaml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Social {
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

/// Initial color scheme of every rendered page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    pub title: Option<String>,
    /// Number of most recent posts in the feed.
    pub limit: usize,
    /// Relative to the output directory.
    pub path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            title: None,
            limit: 20,
            path: PathBuf::from("rss.xml"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub site_url: String,
    pub author: Author,
    pub social: Social,
    pub theme: Theme,
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub page_order: PageOrder,
    pub orphan_policy: OrphanPolicy,
    pub feed: FeedConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            site_url: "http://localhost:8000".to_string(),
            author: Author::default(),
            social: Social::default(),
            theme: Theme::default(),
            content_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("public"),
            templates_dir: PathBuf::from("templates"),
            page_order: PageOrder::default(),
            orphan_policy: OrphanPolicy::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| SiteError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    /// Relative directories are resolved against `root`.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let config = if path.exists() {
            let text = fs::read_to_string(path)?;
            Self::from_yaml(&text, path)?
        } else {
            info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        Ok(config.rooted_at(root))
    }

    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.content_dir = root.join(&self.content_dir);
        self.output_dir = root.join(&self.output_dir);
        self.templates_dir = root.join(&self.templates_dir);
        self
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            page_order: self.page_order,
            orphan_policy: self.orphan_policy,
        }
    }

    /// Absolute url of a route or output file.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SiteConfig::from_yaml("{}", Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.page_order, PageOrder::Descending);
        assert_eq!(config.orphan_policy, OrphanPolicy::Drop);
        assert_eq!(config.theme, Theme::Light);
        assert!(config.feed.enable);
        assert_eq!(config.feed.limit, 20);
    }

    #[test]
    fn reads_site_metadata_and_choices() {
        let yaml = r#"
title: Abstracted
site_url: https://example.org/
author:
  name: Jo
social:
  twitter: jo
theme: dark
page_order: ascending
orphan_policy: promote
feed:
  limit: 5
"#;
        let config = SiteConfig::from_yaml(yaml, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.title, "Abstracted");
        assert_eq!(config.author.name, "Jo");
        assert_eq!(config.social.twitter.as_deref(), Some("jo"));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.page_order, PageOrder::Ascending);
        assert_eq!(config.orphan_policy, OrphanPolicy::Promote);
        assert_eq!(config.feed.limit, 5);
        assert_eq!(config.feed.path, PathBuf::from("rss.xml"));
        assert_eq!(config.url_for("/hello/"), "https://example.org/hello/");
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let err = SiteConfig::from_yaml("orphan_policy: explode", Path::new(CONFIG_FILE))
            .unwrap_err();
        assert!(matches!(err, SiteError::Config { .. }));
    }

    #[test]
    fn missing_file_uses_defaults_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(&dir.path().join(CONFIG_FILE), dir.path()).unwrap();
        assert_eq!(config.content_dir, dir.path().join("content"));
        assert_eq!(config.output_dir, dir.path().join("public"));
    }
}
