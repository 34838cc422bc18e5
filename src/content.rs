use comrak::nodes::{AstNode, NodeValue};
use comrak::{
    Anchorizer, Arena, ComrakOptions, ComrakRenderOptions, ListStyleType, format_html,
    parse_document,
};
use gray_matter::Matter;
use gray_matter::engine::YAML;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::date::parse_date;
use crate::domain::{Collection, ContentRecord, ContentSet, Frontmatter, RecordId, TocEntry};
use crate::error::{Result, SiteError};
use crate::slug::{normalize, slug_from_relative};

const EXCERPT_LENGTH: usize = 160;
const TOC_LEVELS: [u8; 2] = [2, 3];

/// A non-content file found next to the content, copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source: PathBuf,
    /// Path under the output directory.
    pub relative: PathBuf,
}

#[derive(Debug, Default)]
pub struct SourceTree {
    pub content: ContentSet,
    pub assets: Vec<Asset>,
}

pub fn make_comrak_options() -> ComrakOptions {
    let mut comrak_options = ComrakOptions::default();
    comrak_options.extension.table = true;
    comrak_options.extension.autolink = true;
    comrak_options.extension.tagfilter = true;
    comrak_options.extension.strikethrough = true;
    comrak_options.extension.tasklist = true;
    comrak_options.extension.header_ids = Some(String::new());
    comrak_options.parse.smart = true;
    let mut render_options = ComrakRenderOptions::default();
    render_options.unsafe_ = true;
    render_options.list_style = ListStyleType::Plus;
    comrak_options.render = render_options;
    comrak_options
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("md") | Some("mdx")
    )
}

/// Loads `<content_dir>/blog` and `<content_dir>/page`. A missing collection
/// directory is an empty collection.
pub fn load_content(content_dir: &Path, comrak_options: &ComrakOptions) -> Result<SourceTree> {
    let mut tree = SourceTree::default();

    for collection in Collection::ALL {
        let root = content_dir.join(collection.as_str());
        if !root.is_dir() {
            info!(collection = %collection, path = %root.display(), "collection directory missing");
            continue;
        }

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = path.strip_prefix(&root).map_err(|_e| {
                std::io::Error::other(format!(
                    "failed to compute relative path for {}",
                    path.display()
                ))
            })?;

            if is_markdown(path) {
                debug!(path = %path.display(), "loading markdown");
                let text = fs::read_to_string(path)?;
                if let Some(record) =
                    parse_record(&text, path, relative, collection, comrak_options)?
                {
                    tree.content.push(record);
                }
            } else {
                tree.assets.push(Asset {
                    source: path.to_path_buf(),
                    relative: relative.to_path_buf(),
                });
            }
        }
    }

    info!(
        posts = tree.content.blog.len(),
        pages = tree.content.page.len(),
        assets = tree.assets.len(),
        "content loaded"
    );
    Ok(tree)
}

/// Builds a record from one markdown source. Drafts yield `None`.
pub fn parse_record(
    text: &str,
    source: &Path,
    relative: &Path,
    collection: Collection,
    comrak_options: &ComrakOptions,
) -> Result<Option<ContentRecord>> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(text);

    let frontmatter = match parsed.data {
        Some(data) => data
            .deserialize::<Frontmatter>()
            .map_err(|e| SiteError::FrontMatter {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?,
        None => Frontmatter::default(),
    };

    if frontmatter.draft {
        info!(path = %source.display(), "skipping draft");
        return Ok(None);
    }

    let date = frontmatter.date.as_deref().and_then(|raw| {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            warn!(path = %source.display(), date = raw, "unrecognised date format");
        }
        parsed
    });

    let rendered = render_markdown(&parsed.content, comrak_options)?;
    let fallback_title = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|stem| *stem != "index")
        .or_else(|| {
            source
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
        })
        .unwrap_or("untitled")
        .to_string();

    Ok(Some(ContentRecord {
        id: RecordId::new(format!(
            "{}:{}",
            collection,
            relative.to_string_lossy().replace('\\', "/")
        )),
        collection,
        slug: slug_from_relative(relative),
        title: frontmatter.title.unwrap_or(fallback_title),
        date,
        priority: frontmatter.priority,
        parent_slug: frontmatter.parent.as_deref().map(normalize),
        description: frontmatter.description,
        excerpt: excerpt(&rendered.text, EXCERPT_LENGTH),
        github: frontmatter.github,
        body_html: rendered.html,
        toc: rendered.toc,
        source: source.to_path_buf(),
    }))
}

/// One markdown document rendered to html, with its heading outline and
/// plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub text: String,
}

/// Parses once and renders from the AST, so heading ids in `toc` are the
/// ones comrak writes into the html.
pub fn render_markdown(markdown: &str, options: &ComrakOptions) -> Result<Rendered> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, options);

    let prefix = options.extension.header_ids.clone().unwrap_or_default();
    let mut anchorizer = Anchorizer::new();
    let mut toc = Vec::new();
    for node in root.descendants() {
        let level = match &node.data.borrow().value {
            NodeValue::Heading(heading) => heading.level,
            _ => continue,
        };
        let mut title = String::new();
        heading_text(node, &mut title);
        // Every heading advances the anchorizer, listed or not.
        let id = format!("{prefix}{}", anchorizer.anchorize(title.clone()));
        if TOC_LEVELS.contains(&level) {
            toc.push(TocEntry { level, id, title });
        }
    }

    let mut text = String::new();
    plain_text(root, &mut text);

    let mut html = Vec::new();
    format_html(root, options, &mut html)?;
    let html = String::from_utf8(html)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(Rendered { html, toc, text })
}

fn heading_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(literal) => out.push_str(literal),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::LineBreak | NodeValue::SoftBreak => out.push(' '),
        _ => {
            for child in node.children() {
                heading_text(child, out);
            }
        }
    }
}

/// Entity-decoded text of the document, without code blocks or raw html.
fn plain_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(literal) => out.push_str(literal),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::LineBreak | NodeValue::SoftBreak => out.push(' '),
        NodeValue::CodeBlock(_) | NodeValue::HtmlBlock(_) | NodeValue::HtmlInline(_) => {}
        value => {
            for child in node.children() {
                plain_text(child, out);
            }
            if value.block() {
                out.push(' ');
            }
        }
    }
}

/// `text` with whitespace collapsed, cut on a word boundary to at most
/// `max_chars`.
pub fn excerpt(text: &str, max_chars: usize) -> Option<String> {
    static SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

    let text = SPACE.replace_all(text, " ");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.chars().count() <= max_chars {
        return Some(text.to_string());
    }

    let cut: String = text.chars().take(max_chars).collect();
    let pruned = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    Some(format!("{}…", pruned.trim_end_matches([',', '.', ';', ':'])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, relative: &str, collection: Collection) -> Option<ContentRecord> {
        let source = Path::new("content")
            .join(collection.as_str())
            .join(relative);
        parse_record(
            text,
            &source,
            Path::new(relative),
            collection,
            &make_comrak_options(),
        )
        .unwrap()
    }

    #[test]
    fn reads_front_matter_fields() {
        let record = parse(
            "---\ntitle: Hello\ndate: 2024-02-01\ndescription: First post\n---\n\nSome *text*.\n",
            "hello/index.md",
            Collection::Blog,
        )
        .unwrap();

        assert_eq!(record.id.as_str(), "blog:hello/index.md");
        assert_eq!(record.slug, "/hello/");
        assert_eq!(record.title, "Hello");
        assert_eq!(record.date, parse_date("2024-02-01"));
        assert_eq!(record.summary(), Some("First post"));
        assert!(record.body_html.contains("<em>text</em>"));
    }

    #[test]
    fn page_parent_and_priority() {
        let record = parse(
            "---\ntitle: Sub\npriority: 3\nparent: projects\ngithub: me/repo\n---\nbody\n",
            "projects/sub.md",
            Collection::Page,
        )
        .unwrap();

        assert_eq!(record.slug, "/projects/sub/");
        assert_eq!(record.priority, Some(3));
        assert_eq!(record.parent_slug.as_deref(), Some("/projects/"));
        assert_eq!(record.github.as_deref(), Some("me/repo"));
    }

    #[test]
    fn title_falls_back_to_directory_for_index_files() {
        let record = parse("just text\n", "my-trip/index.md", Collection::Blog).unwrap();
        assert_eq!(record.title, "my-trip");
        assert_eq!(record.date, None);
        assert_eq!(record.excerpt.as_deref(), Some("just text"));
    }

    #[test]
    fn drafts_are_skipped() {
        assert!(parse("---\ntitle: Wip\ndraft: true\n---\n", "wip.md", Collection::Blog).is_none());
    }

    #[test]
    fn bad_date_is_treated_as_missing() {
        let record = parse("---\ndate: someday\n---\n", "x.md", Collection::Blog).unwrap();
        assert_eq!(record.date, None);
    }

    #[test]
    fn malformed_front_matter_is_an_error() {
        let err = parse_record(
            "---\npriority: high\n---\n",
            Path::new("content/page/bad.md"),
            Path::new("bad.md"),
            Collection::Page,
            &make_comrak_options(),
        )
        .unwrap_err();
        assert!(matches!(err, SiteError::FrontMatter { .. }));
    }

    #[test]
    fn excerpt_collapses_whitespace_and_prunes_on_words() {
        let text = "One & two \n three  four five six ";
        assert_eq!(excerpt(text, 100).as_deref(), Some("One & two three four five six"));
        assert_eq!(excerpt(text, 12).as_deref(), Some("One & two…"));
        assert_eq!(excerpt(" \n ", 10), None);
    }

    #[test]
    fn plain_text_decodes_entities_and_skips_code_blocks() {
        let markdown = "It's \"smart\" &amp; a&nbsp;b &#169; c\n\n```\nlet hidden = 1;\n```\n\n<div>raw</div>\n\nEnd `inline`.\n";
        let rendered = render_markdown(markdown, &make_comrak_options()).unwrap();
        let summary = excerpt(&rendered.text, 160).unwrap();

        assert_eq!(summary, "It\u{2019}s \u{201c}smart\u{201d} & a b \u{a9} c End inline.");
        assert!(!summary.contains("&nbsp;"));
        assert!(!summary.contains("hidden"));
        assert!(!summary.contains("raw"));
    }

    #[test]
    fn toc_lists_second_and_third_level_headings_with_rendered_ids() {
        let markdown = "# Title\n\n## Setup &amp; use\n\n### Step `one`\n\n#### Deep\n\n## Setup &amp; use\n";
        let rendered = render_markdown(markdown, &make_comrak_options()).unwrap();

        let toc: Vec<_> = rendered
            .toc
            .iter()
            .map(|e| (e.level, e.id.as_str(), e.title.as_str()))
            .collect();
        assert_eq!(
            toc,
            vec![
                (2, "setup--use", "Setup & use"),
                (3, "step-one", "Step one"),
                (2, "setup--use-1", "Setup & use"),
            ]
        );
        for entry in &rendered.toc {
            assert!(rendered.html.contains(&format!("id=\"{}\"", entry.id)));
        }
    }

    #[test]
    fn loads_collections_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let blog = dir.path().join("blog");
        fs::create_dir_all(blog.join("b-post")).unwrap();
        fs::write(blog.join("a-post.md"), "---\ndate: 2024-01-01\n---\nA").unwrap();
        fs::write(blog.join("b-post/index.md"), "---\ndate: 2024-01-02\n---\nB").unwrap();
        fs::write(blog.join("b-post/cover.png"), [0u8; 4]).unwrap();

        let tree = load_content(dir.path(), &make_comrak_options()).unwrap();

        let slugs: Vec<_> = tree.content.blog.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["/a-post/", "/b-post/"]);
        assert!(tree.content.page.is_empty());
        assert_eq!(
            tree.assets,
            vec![Asset {
                source: blog.join("b-post/cover.png"),
                relative: PathBuf::from("b-post/cover.png"),
            }]
        );
    }
}
