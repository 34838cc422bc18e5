use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::date::format_date;

#[derive(Deserialize, Debug, Serialize, Default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub parent: Option<String>,
    pub github: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// The source collection a record was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blog,
    Page,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Blog, Collection::Page];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Blog => "blog",
            Collection::Page => "page",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A post or page as handed over by the content source.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    pub id: RecordId,
    pub collection: Collection,
    pub slug: String,
    pub title: String,
    pub date: Option<NaiveDateTime>,
    pub priority: Option<i64>,
    pub parent_slug: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub github: Option<String>,
    pub body_html: String,
    pub toc: Vec<TocEntry>,
    pub source: PathBuf,
}

impl ContentRecord {
    pub fn new(collection: Collection, id: impl Into<String>, slug: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            source: PathBuf::from(&id),
            id: RecordId::new(id),
            collection,
            slug: slug.into(),
            date: None,
            priority: None,
            parent_slug: None,
            description: None,
            excerpt: None,
            github: None,
            body_html: String::new(),
            toc: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_parent(mut self, parent_slug: impl Into<String>) -> Self {
        self.parent_slug = Some(parent_slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Explicit description, falling back to the generated excerpt.
    pub fn summary(&self) -> Option<&str> {
        self.description.as_deref().or(self.excerpt.as_deref())
    }
}

/// Records grouped by collection, each in source order.
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    pub blog: Vec<ContentRecord>,
    pub page: Vec<ContentRecord>,
}

impl ContentSet {
    pub fn push(&mut self, record: ContentRecord) {
        match record.collection {
            Collection::Blog => self.blog.push(record),
            Collection::Page => self.page.push(record),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        self.blog.iter().chain(self.page.iter())
    }

    pub fn len(&self) -> usize {
        self.blog.len() + self.page.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A heading listed in a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    /// Anchor id of the rendered heading.
    pub id: String,
    pub title: String,
}

/// Navigation adjacency of one record within its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub id: RecordId,
    pub slug: String,
    pub previous_id: Option<RecordId>,
    pub next_id: Option<RecordId>,
}

/// What templates see of a linked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub github: Option<String>,
}

impl From<&ContentRecord> for NavLink {
    fn from(record: &ContentRecord) -> Self {
        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.summary().map(str::to_string),
            date: record.date.map(format_date),
            github: record.github.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteContext {
    pub content_body: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub github: Option<String>,
    pub toc: Vec<TocEntry>,
    pub previous_link: Option<NavLink>,
    pub next_link: Option<NavLink>,
    pub child_links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub url: String,
    pub body_html: String,
}
