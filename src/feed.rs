//! RSS feed of the most recent posts.

use rss::validation::Validate;
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::SiteConfig;
use crate::domain::{ContentSet, FeedItem};
use crate::error::{Result, SiteError};
use crate::graph::SiteGraph;
use crate::routes::post_records;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

/// The first `config.feed.limit` posts of the post sequence.
pub fn feed_items(graph: &SiteGraph, content: &ContentSet, config: &SiteConfig) -> Vec<FeedItem> {
    post_records(graph, content)
        .into_iter()
        .take(config.feed.limit)
        .map(|post| FeedItem {
            title: post.title.clone(),
            description: post.summary().map(str::to_string),
            date: post.date,
            url: config.url_for(&post.slug),
            body_html: post.body_html.clone(),
        })
        .collect()
}

fn to_rss_item(item: &FeedItem) -> Item {
    ItemBuilder::default()
        .title(item.title.clone())
        .link(item.url.clone())
        .guid(
            GuidBuilder::default()
                .permalink(true)
                .value(item.url.clone())
                .build(),
        )
        .description(item.description.clone())
        .pub_date(item.date.map(|date| date.and_utc().to_rfc2822()))
        .content(item.body_html.clone())
        .build()
}

pub fn render_feed(config: &SiteConfig, items: &[FeedItem]) -> Result<String> {
    let title = config
        .feed
        .title
        .clone()
        .unwrap_or_else(|| format!("{} RSS Feed", config.title));

    let channel = ChannelBuilder::default()
        .title(title)
        .link(config.site_url.clone())
        .description(config.description.clone())
        .generator("blogweave".to_string())
        .namespaces(BTreeMap::from([(
            "content".to_string(),
            CONTENT_NAMESPACE.to_string(),
        )]))
        .items(items.iter().map(to_rss_item).collect::<Vec<_>>())
        .build();

    channel
        .validate()
        .map_err(|e| SiteError::Feed(format!("validate: {e}")))?;

    Ok(channel.to_string())
}

pub fn write_feed(config: &SiteConfig, output_dir: &Path, items: &[FeedItem]) -> Result<()> {
    let xml = render_feed(config, items)?;
    let path = output_dir.join(&config.feed.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, xml)?;
    info!(path = %path.display(), items = items.len(), "rss feed written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date;
    use crate::domain::{Collection, ContentRecord};
    use crate::graph::GraphOptions;

    fn config(limit: usize) -> SiteConfig {
        let mut config = SiteConfig {
            title: "Abstracted".into(),
            description: "Life from the eyes of a dev.".into(),
            site_url: "https://example.org/".into(),
            ..SiteConfig::default()
        };
        config.feed.limit = limit;
        config
    }

    fn content() -> ContentSet {
        let mut content = ContentSet::default();
        for (id, date) in [("a", "2024-01-01"), ("b", "2024-03-01"), ("c", "2024-02-01")] {
            let mut post = ContentRecord::new(Collection::Blog, id, format!("/{id}/"))
                .with_title(format!("Post {id}"))
                .with_date(parse_date(date).unwrap());
            post.body_html = format!("<p>body {id}</p>");
            content.push(post);
        }
        content
    }

    #[test]
    fn takes_most_recent_posts_up_to_limit() {
        let content = content();
        let graph = SiteGraph::build(&content, &GraphOptions::default()).unwrap();

        let items = feed_items(&graph, &content, &config(2));

        let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.org/b/", "https://example.org/c/"]);
        assert_eq!(items[0].body_html, "<p>body b</p>");
    }

    #[test]
    fn feed_carries_body_and_dates() {
        let content = content();
        let graph = SiteGraph::build(&content, &GraphOptions::default()).unwrap();
        let config = config(10);

        let xml = render_feed(&config, &feed_items(&graph, &content, &config)).unwrap();

        assert!(xml.contains("<title>Abstracted RSS Feed</title>"));
        assert!(xml.contains("xmlns:content=\"http://purl.org/rss/1.0/modules/content/\""));
        assert!(xml.contains("<content:encoded>"));
        assert!(xml.contains("Mar 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("https://example.org/a/</guid>"));
    }

    #[test]
    fn empty_feed_is_still_valid() {
        let xml = render_feed(&config(5), &[]).unwrap();
        assert!(xml.contains("<channel>"));
    }
}
