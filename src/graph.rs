//! Turns the flat content set into linked page sequences.
//!
//! Posts form one chronological sequence. Top-level pages form a sequence
//! ordered by priority, and every top-level page owns a sequence of its
//! children. All three are linked by the same [`link_sequence`] routine, so
//! adjacency is symmetric and never leaves its sequence.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{ContentRecord, ContentSet, PageLink, RecordId};
use crate::error::{Result, SiteError};
use crate::slug::same_slug;

/// Direction pages are ordered by priority. Pages without a priority always
/// come last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrder {
    #[default]
    Descending,
    Ascending,
}

impl PageOrder {
    fn compare(self, a: Option<i64>, b: Option<i64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => match self {
                PageOrder::Descending => b.cmp(&a),
                PageOrder::Ascending => a.cmp(&b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// What happens to a child whose parent is not a top-level page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave it out of every hierarchy.
    #[default]
    Drop,
    /// Render it as a top-level page.
    Promote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    pub page_order: PageOrder,
    pub orphan_policy: OrphanPolicy,
}

/// Non-fatal content problems found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    MissingDate {
        id: RecordId,
        source: PathBuf,
    },
    OrphanedChild {
        id: RecordId,
        source: PathBuf,
        parent_slug: String,
        policy: OrphanPolicy,
    },
}

impl BuildWarning {
    fn log(&self) {
        match self {
            BuildWarning::MissingDate { id, source } => {
                warn!(%id, source = %source.display(), "post has no date, sorting it last");
            }
            BuildWarning::OrphanedChild {
                id,
                source,
                parent_slug,
                policy,
            } => {
                warn!(
                    %id,
                    source = %source.display(),
                    parent = %parent_slug,
                    ?policy,
                    "parent is not a top-level page"
                );
            }
        }
    }
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::MissingDate { source, .. } => {
                write!(f, "{}: post has no date", source.display())
            }
            BuildWarning::OrphanedChild {
                source,
                parent_slug,
                ..
            } => write!(
                f,
                "{}: parent `{parent_slug}` is not a top-level page",
                source.display()
            ),
        }
    }
}

/// Links an already ordered sequence.
pub fn link_sequence<'a>(sorted: impl IntoIterator<Item = &'a ContentRecord>) -> Vec<PageLink> {
    let records: Vec<&ContentRecord> = sorted.into_iter().collect();
    records
        .iter()
        .enumerate()
        .map(|(i, record)| PageLink {
            id: record.id.clone(),
            slug: record.slug.clone(),
            previous_id: i.checked_sub(1).map(|p| records[p].id.clone()),
            next_id: records.get(i + 1).map(|n| n.id.clone()),
        })
        .collect()
}

/// Newest first. Undated posts sort after every dated one.
pub fn build_post_sequence(posts: &[ContentRecord]) -> Vec<PageLink> {
    let mut sorted: Vec<&ContentRecord> = posts.iter().collect();
    // `None < Some`, so comparing b to a also pushes undated posts to the end.
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    link_sequence(sorted)
}

pub fn build_top_level_page_sequence(pages: &[ContentRecord], order: PageOrder) -> Vec<PageLink> {
    let mut sorted: Vec<&ContentRecord> =
        pages.iter().filter(|p| p.parent_slug.is_none()).collect();
    sorted.sort_by(|a, b| order.compare(a.priority, b.priority));
    link_sequence(sorted)
}

/// Siblings under `parent_slug`. Filtering happens before linking, so no link
/// can point outside the group.
pub fn build_child_page_sequence(
    all_pages: &[ContentRecord],
    parent_slug: &str,
    order: PageOrder,
) -> Vec<PageLink> {
    let mut sorted: Vec<&ContentRecord> = all_pages
        .iter()
        .filter(|p| {
            p.parent_slug
                .as_deref()
                .is_some_and(|parent| same_slug(parent, parent_slug))
        })
        .collect();
    sorted.sort_by(|a, b| order.compare(a.priority, b.priority));
    link_sequence(sorted)
}

/// Every sequence the site renders, plus the warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteGraph {
    pub posts: Vec<PageLink>,
    pub pages: Vec<PageLink>,
    /// Keyed by the parent's slug. Parents without children have no entry.
    pub children: BTreeMap<String, Vec<PageLink>>,
    pub warnings: Vec<BuildWarning>,
}

impl SiteGraph {
    pub fn build(content: &ContentSet, options: &GraphOptions) -> Result<Self> {
        check_unique_slugs(content)?;

        let mut warnings = Vec::new();
        for post in content.blog.iter().filter(|p| p.date.is_none()) {
            warnings.push(BuildWarning::MissingDate {
                id: post.id.clone(),
                source: post.source.clone(),
            });
        }

        let pages = resolve_hierarchy(&content.page, options.orphan_policy, &mut warnings);
        let top_level = build_top_level_page_sequence(&pages, options.page_order);

        let mut children = BTreeMap::new();
        for parent in &top_level {
            let siblings = build_child_page_sequence(&pages, &parent.slug, options.page_order);
            if !siblings.is_empty() {
                children.insert(parent.slug.clone(), siblings);
            }
        }

        for warning in &warnings {
            warning.log();
        }

        let graph = Self {
            posts: build_post_sequence(&content.blog),
            pages: top_level,
            children,
            warnings,
        };
        debug!(
            posts = graph.posts.len(),
            pages = graph.pages.len(),
            parents = graph.children.len(),
            "page graph built"
        );
        Ok(graph)
    }

    /// Every link in the graph, posts first, then each top-level page followed
    /// by its children.
    pub fn links(&self) -> impl Iterator<Item = &PageLink> {
        self.posts.iter().chain(self.pages.iter().flat_map(|page| {
            std::iter::once(page).chain(self.children.get(&page.slug).into_iter().flatten())
        }))
    }
}

fn check_unique_slugs(content: &ContentSet) -> Result<()> {
    let mut seen: HashMap<String, &ContentRecord> = HashMap::with_capacity(content.len());
    for record in content.iter() {
        let key = record.slug.trim_matches('/').to_string();
        if key.is_empty() {
            return Err(SiteError::ReservedSlug {
                slug: record.slug.clone(),
                path: record.source.clone(),
            });
        }
        if let Some(first) = seen.insert(key, record) {
            return Err(SiteError::DuplicateSlug {
                slug: record.slug.clone(),
                first: first.source.clone(),
                second: record.source.clone(),
            });
        }
    }
    Ok(())
}

/// Keeps children whose parent is a top-level page and applies `policy` to
/// the rest. Only references resolved here reach the sequence builders.
fn resolve_hierarchy(
    pages: &[ContentRecord],
    policy: OrphanPolicy,
    warnings: &mut Vec<BuildWarning>,
) -> Vec<ContentRecord> {
    let top_level: Vec<&str> = pages
        .iter()
        .filter(|p| p.parent_slug.is_none())
        .map(|p| p.slug.as_str())
        .collect();

    let mut resolved = Vec::with_capacity(pages.len());
    for page in pages {
        let Some(parent) = page.parent_slug.as_deref() else {
            resolved.push(page.clone());
            continue;
        };
        if top_level.iter().any(|slug| same_slug(slug, parent)) {
            resolved.push(page.clone());
            continue;
        }

        warnings.push(BuildWarning::OrphanedChild {
            id: page.id.clone(),
            source: page.source.clone(),
            parent_slug: parent.to_string(),
            policy,
        });
        if policy == OrphanPolicy::Promote {
            let mut promoted = page.clone();
            promoted.parent_slug = None;
            resolved.push(promoted);
        }
    }
    resolved
}
