use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::debug;

use crate::config::{Author, SiteConfig, Social, Theme};
use crate::domain::NavLink;
use crate::error::{Result, SiteError};
use crate::routes::Route;
use crate::slug::output_file;

const DEFAULT_TEMPLATES: [(&str, &str); 8] = [
    ("base.html", include_str!("templates/base.html")),
    ("post.html", include_str!("templates/post.html")),
    ("page.html", include_str!("templates/page.html")),
    ("nav.html", include_str!("templates/nav.html")),
    ("bio.html", include_str!("templates/bio.html")),
    ("toc.html", include_str!("templates/toc.html")),
    ("index.html", include_str!("templates/index.html")),
    ("404.html", include_str!("templates/404.html")),
];

const DEFAULT_STYLESHEET: &str = include_str!("templates/style.css");

/// Built-in templates, overridden by name by any `*.html` in `templates_dir`.
pub fn init_tera(templates_dir: &Path) -> Result<Tera> {
    let mut defaults = Tera::default();
    defaults
        .add_raw_templates(DEFAULT_TEMPLATES)
        .map_err(SiteError::Templates)?;

    if !templates_dir.is_dir() {
        return Ok(defaults);
    }

    let glob = templates_dir.join("**").join("*.html");
    // `parse` defers inheritance checks until the defaults are merged in.
    let mut tera = Tera::parse(&glob.to_string_lossy()).map_err(SiteError::Templates)?;
    debug!(
        dir = %templates_dir.display(),
        overrides = tera.get_template_names().count(),
        "loaded template overrides"
    );
    tera.extend(&defaults).map_err(SiteError::Templates)?;
    Ok(tera)
}

/// Site-wide values every template sees as `site`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub site_url: String,
    pub author: Author,
    pub social: Social,
    pub theme: Theme,
    pub nav: Vec<NavLink>,
    pub feed_url: Option<String>,
}

impl SiteView {
    pub fn new(config: &SiteConfig, nav: Vec<NavLink>) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            site_url: config.site_url.clone(),
            author: config.author.clone(),
            social: config.social.clone(),
            theme: config.theme,
            nav,
            feed_url: config
                .feed
                .enable
                .then(|| format!("/{}", config.feed.path.to_string_lossy())),
        }
    }

    fn seo(&self, title: &str, description: Option<&str>) -> Seo {
        Seo {
            title: if self.title.is_empty() {
                title.to_string()
            } else {
                format!("{title} | {}", self.title)
            },
            og_title: title.to_string(),
            description: description
                .filter(|d| !d.is_empty())
                .unwrap_or(&self.description)
                .to_string(),
        }
    }

    fn context(&self, title: &str, description: Option<&str>) -> Context {
        let mut context = Context::new();
        context.insert("site", self);
        context.insert("seo", &self.seo(title, description));
        context
    }
}

#[derive(Debug, Serialize)]
struct Seo {
    title: String,
    og_title: String,
    description: String,
}

fn render(tera: &Tera, template: &str, context: &Context, path: &Path) -> Result<()> {
    let html = tera
        .render(template, context)
        .map_err(|source| SiteError::Render {
            template: template.to_string(),
            source,
        })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    debug!(path = %path.display(), "wrote html");
    Ok(())
}

pub fn render_route(tera: &Tera, output_dir: &Path, site: &SiteView, route: &Route) -> Result<PathBuf> {
    let ctx = &route.context;
    let mut context = site.context(&ctx.title, ctx.description.as_deref());
    context.extend(Context::from_serialize(ctx).map_err(|source| SiteError::Render {
        template: route.kind.template().to_string(),
        source,
    })?);

    let path = output_file(output_dir, &route.slug);
    render(tera, route.kind.template(), &context, &path)?;
    Ok(path)
}

pub fn render_index(tera: &Tera, output_dir: &Path, site: &SiteView, posts: &[NavLink]) -> Result<()> {
    let mut context = site.context("All posts", None);
    context.insert("posts", posts);
    render(tera, "index.html", &context, &output_dir.join("index.html"))
}

pub fn render_not_found(tera: &Tera, output_dir: &Path, site: &SiteView) -> Result<()> {
    let context = site.context("404: Not Found", None);
    render(tera, "404.html", &context, &output_dir.join("404.html"))
}

/// Writes the bundled stylesheet unless `templates_dir` ships its own.
pub fn write_stylesheet(templates_dir: &Path, output_dir: &Path) -> Result<()> {
    let custom = templates_dir.join("style.css");
    let target = output_dir.join("style.css");
    if custom.is_file() {
        fs::copy(&custom, &target)?;
    } else {
        fs::write(&target, DEFAULT_STYLESHEET)?;
    }
    Ok(())
}
