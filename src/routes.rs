//! Joins the page graph back to its records to produce one rendering context
//! per route.

use std::collections::HashMap;

use crate::date::format_date;
use crate::domain::{ContentRecord, ContentSet, NavLink, PageLink, RecordId, RouteContext};
use crate::graph::SiteGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Post,
    Page,
}

impl RouteKind {
    pub fn template(self) -> &'static str {
        match self {
            RouteKind::Post => "post.html",
            RouteKind::Page => "page.html",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub slug: String,
    pub kind: RouteKind,
    pub context: RouteContext,
}

struct Lookup<'a>(HashMap<&'a RecordId, &'a ContentRecord>);

impl<'a> Lookup<'a> {
    fn new(content: &'a ContentSet) -> Self {
        Self(content.iter().map(|r| (&r.id, r)).collect())
    }

    fn record(&self, id: &RecordId) -> Option<&'a ContentRecord> {
        self.0.get(id).copied()
    }

    fn nav(&self, id: Option<&RecordId>) -> Option<NavLink> {
        id.and_then(|id| self.record(id)).map(NavLink::from)
    }

    fn navs(&self, links: &[PageLink]) -> Vec<NavLink> {
        links
            .iter()
            .filter_map(|link| self.record(&link.id))
            .map(NavLink::from)
            .collect()
    }

    fn route(&self, link: &PageLink, kind: RouteKind, child_links: Vec<NavLink>) -> Option<Route> {
        let record = self.record(&link.id)?;
        Some(Route {
            slug: link.slug.clone(),
            kind,
            context: RouteContext {
                content_body: record.body_html.clone(),
                title: record.title.clone(),
                description: record.summary().map(str::to_string),
                date: record.date.map(format_date),
                github: record.github.clone(),
                toc: record.toc.clone(),
                previous_link: self.nav(link.previous_id.as_ref()),
                next_link: self.nav(link.next_id.as_ref()),
                child_links,
            },
        })
    }
}

/// One route per link in the graph. Dropped orphans have no link and so no
/// route.
pub fn build_routes(graph: &SiteGraph, content: &ContentSet) -> Vec<Route> {
    let lookup = Lookup::new(content);
    let mut routes = Vec::new();

    for link in &graph.posts {
        routes.extend(lookup.route(link, RouteKind::Post, Vec::new()));
    }

    for link in &graph.pages {
        let children = graph.children.get(&link.slug).map(Vec::as_slice).unwrap_or_default();
        routes.extend(lookup.route(link, RouteKind::Page, lookup.navs(children)));
        for child in children {
            routes.extend(lookup.route(child, RouteKind::Page, Vec::new()));
        }
    }

    routes
}

/// Posts in sequence order.
pub fn post_records<'a>(graph: &SiteGraph, content: &'a ContentSet) -> Vec<&'a ContentRecord> {
    let lookup = Lookup::new(content);
    graph.posts.iter().filter_map(|link| lookup.record(&link.id)).collect()
}

pub fn post_links(graph: &SiteGraph, content: &ContentSet) -> Vec<NavLink> {
    post_records(graph, content).into_iter().map(NavLink::from).collect()
}

/// Top-level pages in sequence order, for site navigation.
pub fn page_links(graph: &SiteGraph, content: &ContentSet) -> Vec<NavLink> {
    Lookup::new(content).navs(&graph.pages)
}
