//! Local path to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a site-local path under `serve_root`.
///
/// Directories resolve to their `index.html`, extensionless paths may
/// resolve to a sibling `.html` file.
pub fn resolve_path(local_path: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_local_path(local_path);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let root_canonical = serve_root.canonicalize().ok()?;
    let local = serve_root.join(&clean);

    let candidates = [
        Some(local.clone()),
        (!clean.is_empty()).then(|| local.with_extension("html")),
    ];

    for candidate in candidates.into_iter().flatten() {
        // Canonicalize to resolve symlinks and verify path is under serve_root
        let Ok(canonical) = candidate.canonicalize() else {
            continue;
        };
        if !canonical.starts_with(&root_canonical) {
            return None;
        }

        if canonical.is_file() {
            return Some(canonical);
        }

        if canonical.is_dir() {
            let index = canonical.join("index.html");
            if index.is_file() {
                return Some(index);
            }
        }
    }

    None
}

/// Strip query and fragment, trim slashes.
fn normalize_local_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("service/noaccess")).unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("service/noaccess/index.html"), "denied").unwrap();
        fs::write(dir.path().join("layouts/main.html"), "main").unwrap();
        dir
    }

    #[test]
    fn test_resolve_root_index() {
        let dir = site();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_resolve_directory_and_extension() {
        let dir = site();
        let denied = resolve_path("/service/noaccess", dir.path()).unwrap();
        assert!(denied.ends_with("service/noaccess/index.html"));

        let layout = resolve_path("/layouts/main", dir.path()).unwrap();
        assert!(layout.ends_with("layouts/main.html"));

        let exact = resolve_path("/layouts/main.html?x=1", dir.path()).unwrap();
        assert_eq!(exact, layout);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/layouts/../../secret", dir.path()).is_none());
    }

    #[test]
    fn test_resolve_missing() {
        let dir = site();
        assert!(resolve_path("/nothing/here", dir.path()).is_none());
    }
}
