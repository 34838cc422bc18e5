//! Route slugs derived from content file locations.

use std::path::{Component, Path, PathBuf};

/// `hello/index.md` -> `/hello/`, `about.md` -> `/about/`, `index.md` -> `/`.
pub fn slug_from_relative(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(stem) = relative.file_stem().and_then(|s| s.to_str()) {
        if stem != "index" {
            parts.push(stem.to_string());
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

/// Canonical `/a/b/` form for hand-written slug references.
pub fn normalize(slug: &str) -> String {
    let trimmed = slug.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

pub fn same_slug(a: &str, b: &str) -> bool {
    a.trim().trim_matches('/') == b.trim().trim_matches('/')
}

/// Where the rendered html for `slug` lives under `output_dir`.
pub fn output_file(output_dir: &Path, slug: &str) -> PathBuf {
    let trimmed = slug.trim_matches('/');
    if trimmed.is_empty() {
        output_dir.join("index.html")
    } else {
        output_dir.join(trimmed).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_extension_and_wraps_in_slashes() {
        assert_eq!(slug_from_relative(Path::new("about.md")), "/about/");
        assert_eq!(slug_from_relative(Path::new("notes/rust.mdx")), "/notes/rust/");
    }

    #[test]
    fn index_file_maps_to_its_directory() {
        assert_eq!(slug_from_relative(Path::new("hello-world/index.md")), "/hello-world/");
        assert_eq!(slug_from_relative(Path::new("index.md")), "/");
    }

    #[test]
    fn normalize_accepts_any_slash_style() {
        assert_eq!(normalize("about"), "/about/");
        assert_eq!(normalize("/about"), "/about/");
        assert_eq!(normalize("/about/"), "/about/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn same_slug_ignores_surrounding_slashes() {
        assert!(same_slug("/projects/", "projects"));
        assert!(!same_slug("/projects/", "/projects/old/"));
    }

    #[test]
    fn output_file_nests_under_slug() {
        let out = Path::new("public");
        assert_eq!(output_file(out, "/"), Path::new("public/index.html"));
        assert_eq!(output_file(out, "/a/b/"), Path::new("public/a/b/index.html"));
    }
}
