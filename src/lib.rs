use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{CONFIG_FILE, SiteConfig};
use crate::content::{load_content, make_comrak_options};
use crate::error::Result;
use crate::feed::{feed_items, write_feed};
use crate::fs::{prepare_output_dir, process_asset};
use crate::graph::SiteGraph;
use crate::routes::{build_routes, page_links, post_links};
use crate::template::{
    SiteView, init_tera, render_index, render_not_found, render_route, write_stylesheet,
};

pub mod config;
pub mod content;
pub mod date;
pub mod domain;
pub mod error;
pub mod feed;
pub mod fs;
pub mod graph;
pub mod routes;
pub mod serve;
pub mod slug;
pub mod template;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the site into the output directory
    Build(BuildArgs),
    /// Build, serve the output and rebuild on changes
    Serve {
        #[command(flatten)]
        build: BuildArgs,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Site root holding site.yaml, content/ and templates/
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file, defaults to <root>/site.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory, overrides the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl BuildArgs {
    pub fn load_config(&self) -> Result<SiteConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE));
        let mut config = SiteConfig::load(&path, &self.root)?;
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        Ok(config)
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub routes: usize,
    pub warnings: usize,
}

/// Loads content, links it and renders every route. The output directory is
/// only touched once the page graph is known to be valid.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    info!(content = %config.content_dir.display(), "building site");

    let tera = init_tera(&config.templates_dir)?;
    let comrak_options = make_comrak_options();
    let source = load_content(&config.content_dir, &comrak_options)?;
    let graph = SiteGraph::build(&source.content, &config.graph_options())?;

    let output_dir = &config.output_dir;
    prepare_output_dir(output_dir)?;
    for asset in &source.assets {
        process_asset(asset, output_dir)?;
    }

    let site = SiteView::new(config, page_links(&graph, &source.content));
    let routes = build_routes(&graph, &source.content);
    for route in &routes {
        render_route(&tera, output_dir, &site, route)?;
    }
    render_index(&tera, output_dir, &site, &post_links(&graph, &source.content))?;
    render_not_found(&tera, output_dir, &site)?;
    write_stylesheet(&config.templates_dir, output_dir)?;

    if config.feed.enable {
        let items = feed_items(&graph, &source.content, config);
        write_feed(config, output_dir, &items)?;
    }

    let report = BuildReport {
        routes: routes.len(),
        warnings: graph.warnings.len(),
    };
    info!(
        routes = report.routes,
        warnings = report.warnings,
        output = %output_dir.display(),
        "site built successfully"
    );
    Ok(report)
}
