//! Local preview: serves the output directory and rebuilds when content or
//! templates change.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use warp::Filter;
use warp::http::StatusCode;

use crate::build_site;
use crate::config::SiteConfig;
use crate::error::Result;

/// Quiet period after a change before rebuilding, so editor saves that touch
/// several files trigger one build.
const DEBOUNCE: Duration = Duration::from_millis(200);

pub fn serve(config: SiteConfig, port: u16) -> Result<()> {
    build_site(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config, port))
}

fn is_relevant(event: &Event, output_dir: &Path) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event.paths.iter().any(|p| !p.starts_with(output_dir))
}

async fn run(config: SiteConfig, port: u16) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let output_dir = config.output_dir.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_relevant(&event, &output_dir) => {
            let _ = tx.send(());
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "watch error"),
    })?;
    watcher.watch(&config.content_dir, RecursiveMode::Recursive)?;
    if config.templates_dir.is_dir() {
        watcher.watch(&config.templates_dir, RecursiveMode::Recursive)?;
    }

    let not_found = warp::fs::file(config.output_dir.join("404.html"))
        .map(|reply| warp::reply::with_status(reply, StatusCode::NOT_FOUND));
    let routes = warp::fs::dir(config.output_dir.clone()).or(not_found);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("serving on http://{addr}");
    let server = tokio::spawn(warp::serve(routes).run(addr));

    loop {
        tokio::select! {
            changed = rx.recv() => {
                if changed.is_none() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
        tokio::time::sleep(DEBOUNCE).await;
        while rx.try_recv().is_ok() {}

        info!("change detected, rebuilding");
        let config = config.clone();
        match tokio::task::spawn_blocking(move || build_site(&config)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(error = %e, "rebuild failed"),
            Err(e) => error!(error = %e, "rebuild task panicked"),
        }
    }

    server.abort();
    Ok(())
}
