//! Path confinement for the evidence toolkit.
//!
//! Every path argument resolves relative to one fixed repository root
//! and must stay under it. Resolution descends component by component,
//! re-verifying containment after following any symlink, instead of a
//! single realpath-then-open check.

use conclave_domain::ToolError;
use std::path::{Component, Path, PathBuf};

/// Resolve `rel` under `root` (already canonicalized), enforcing
/// confinement. The returned path exists.
pub fn resolve(root: &Path, rel: &str) -> Result<PathBuf, ToolError> {
    if rel.is_empty() {
        return Err(ToolError::invalid_argument("path must not be empty"));
    }
    let requested = Path::new(rel);
    if requested.is_absolute() {
        return Err(ToolError::access_denied(rel).with_details("absolute paths are not allowed"));
    }
    for component in requested.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(
                    ToolError::access_denied(rel).with_details("path contains a '..' segment")
                );
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ToolError::access_denied(rel));
            }
        }
    }

    let mut current = root.to_path_buf();
    for component in requested.components() {
        let name = match component {
            Component::Normal(name) => name,
            _ => continue,
        };
        current.push(name);

        let meta = match std::fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::not_found(rel));
            }
            Err(e) => {
                return Err(ToolError::execution_failed(format!(
                    "Failed to stat {}: {}",
                    rel, e
                )));
            }
        };

        // A symlink may point anywhere; canonicalize and re-verify
        // before descending through it.
        if meta.file_type().is_symlink() {
            let canonical = current.canonicalize().map_err(|e| {
                ToolError::execution_failed(format!("Failed to resolve symlink {}: {}", rel, e))
            })?;
            if !canonical.starts_with(root) {
                return Err(
                    ToolError::access_denied(rel).with_details("symlink escapes repository root")
                );
            }
            current = canonical;
        }
    }
    Ok(current)
}

/// Resolve `rel` and require a regular file.
pub fn resolve_file(root: &Path, rel: &str) -> Result<PathBuf, ToolError> {
    let path = resolve(root, rel)?;
    let meta = std::fs::metadata(&path)
        .map_err(|e| ToolError::execution_failed(format!("Failed to stat {}: {}", rel, e)))?;
    if !meta.is_file() {
        return Err(ToolError::not_found(rel));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        (dir, canonical)
    }

    #[test]
    fn resolves_nested_relative_path() {
        let (_dir, root) = root();
        let path = resolve_file(&root, "src/main.rs").unwrap();
        assert!(path.starts_with(&root));
    }

    #[test]
    fn rejects_parent_traversal() {
        let (_dir, root) = root();
        let err = resolve(&root, "../outside.txt").unwrap_err();
        assert_eq!(err.code, "ACCESS_DENIED");
        let err = resolve(&root, "src/../../outside.txt").unwrap_err();
        assert_eq!(err.code, "ACCESS_DENIED");
    }

    #[test]
    fn rejects_absolute_path() {
        let (_dir, root) = root();
        let err = resolve(&root, "/etc/passwd").unwrap_err();
        assert_eq!(err.code, "ACCESS_DENIED");
    }

    #[test]
    fn missing_path_is_not_found() {
        let (_dir, root) = root();
        let err = resolve(&root, "src/missing.rs").unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[test]
    fn directory_is_not_a_file() {
        let (_dir, root) = root();
        let err = resolve_file(&root, "src").unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_denied() {
        let (_dir, root) = root();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.join("link.txt"))
            .unwrap();

        let err = resolve(&root, "link.txt").unwrap_err();
        assert_eq!(err.code, "ACCESS_DENIED");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_root_is_followed() {
        let (_dir, root) = root();
        std::os::unix::fs::symlink(root.join("src/main.rs"), root.join("main_link.rs")).unwrap();

        let path = resolve_file(&root, "main_link.rs").unwrap();
        assert!(path.starts_with(&root));
        assert!(path.ends_with("src/main.rs"));
    }
}
