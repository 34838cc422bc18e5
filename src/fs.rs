use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::content::Asset;
use crate::error::Result;

pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    // Remove old output and recreate
    if output_dir.exists() {
        info!(path = %output_dir.display(), "cleaning output directory");
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;
    Ok(())
}

/// Copies `asset` to the same relative location under `output_dir`.
pub fn process_asset(asset: &Asset, output_dir: &Path) -> Result<()> {
    let output_path = output_dir.join(&asset.relative);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!(
        from = %asset.source.display(),
        to = %output_path.display(),
        "copying asset"
    );
    fs::copy(&asset.source, &output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn prepare_clears_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("stale/index.html"), "old").unwrap();

        prepare_output_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn assets_keep_their_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cover.png");
        fs::write(&source, b"png").unwrap();
        let asset = Asset {
            source,
            relative: PathBuf::from("trip/cover.png"),
        };
        let out = dir.path().join("public");

        process_asset(&asset, &out).unwrap();

        assert_eq!(fs::read(out.join("trip/cover.png")).unwrap(), b"png");
    }
}
