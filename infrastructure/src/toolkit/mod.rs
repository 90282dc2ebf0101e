//! The evidence toolkit — the concrete implementation of
//! [`ToolExecutorPort`].
//!
//! Four read-only operations against one confined repository root:
//! `find_files`, `search_content`, `read_file`, `diff_changes`. Tool
//! failures are recovered into failed [`ToolResult`]s; nothing here
//! ever mutates the tree.

pub mod confine;
pub mod diff;
pub mod glob;
pub mod grep;
pub mod read;

use async_trait::async_trait;
use conclave_application::ToolExecutorPort;
use conclave_domain::{
    ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult, DIFF_CHANGES, FIND_FILES,
    READ_FILE, SEARCH_CONTENT,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("repository root is not a readable directory: {0}")]
    BadRoot(String),
}

/// Sensitive-path denylist, applied during walks and to direct path
/// arguments alike.
pub(crate) mod deny {
    use std::path::Path;

    const DENIED_DIRS: &[&str] = &[
        ".git",
        ".svn",
        ".hg",
        "node_modules",
        "target",
        ".venv",
        "__pycache__",
    ];

    const DENIED_BASENAMES: &[&str] = &[
        ".env",
        ".netrc",
        ".htpasswd",
        ".npmrc",
        "credentials",
        "credentials.json",
        "id_rsa",
        "id_dsa",
        "id_ecdsa",
        "id_ed25519",
    ];

    const DENIED_EXTENSIONS: &[&str] = &["pem", "key", "p12", "pfx", "keystore"];

    pub(crate) fn denied_dir(name: &str) -> bool {
        DENIED_DIRS.contains(&name)
    }

    pub(crate) fn denied_file(name: &str) -> bool {
        if DENIED_BASENAMES.contains(&name) || name.starts_with(".env.") {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DENIED_EXTENSIONS.contains(&e))
    }

    /// Check every component of a relative path argument.
    pub(crate) fn denied_path(rel: &str) -> bool {
        rel.split('/').any(|part| denied_dir(part) || denied_file(part))
    }

    /// `:(exclude)` pathspecs keeping denied files out of git diffs,
    /// matching the same basenames and extensions the walk filter prunes.
    pub(crate) fn git_exclude_pathspecs() -> Vec<String> {
        let mut specs: Vec<String> = DENIED_BASENAMES
            .iter()
            .map(|n| format!(":(exclude,glob)**/{n}"))
            .collect();
        specs.push(":(exclude,glob)**/.env.*".to_string());
        specs.extend(
            DENIED_EXTENSIONS
                .iter()
                .map(|e| format!(":(exclude,glob)**/*.{e}")),
        );
        specs
    }

    /// walkdir filter: pruned entries are never yielded, so denied
    /// content cannot match any pattern or query.
    pub(crate) fn walk_filter(entry: &walkdir::DirEntry) -> bool {
        let name = entry.file_name().to_str().unwrap_or("");
        if entry.file_type().is_dir() {
            !denied_dir(name)
        } else {
            !denied_file(name)
        }
    }
}

/// Read-only tool executor confined to one repository root.
#[derive(Debug, Clone)]
pub struct EvidenceToolkit {
    root: PathBuf,
    definitions: Vec<ToolDefinition>,
}

impl EvidenceToolkit {
    /// Create a toolkit for `root`. The root is canonicalized once and
    /// every operation resolves against that fixed base.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ToolkitError> {
        let root = root
            .as_ref()
            .canonicalize()
            .map_err(|e| ToolkitError::BadRoot(format!("{}: {}", root.as_ref().display(), e)))?;
        if !root.is_dir() {
            return Err(ToolkitError::BadRoot(root.display().to_string()));
        }
        Ok(Self {
            root,
            definitions: default_definitions(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn execute_internal(&self, call: &ToolCall) -> ToolResult {
        match call.tool_name.as_str() {
            FIND_FILES => glob::execute(self, call),
            SEARCH_CONTENT => grep::execute(self, call),
            READ_FILE => read::execute(self, call),
            _ => ToolResult::failure(
                &call.tool_name,
                ToolError::not_found(format!("Unknown tool: {}", call.tool_name)),
            ),
        }
    }

    /// Synchronous execution. `diff_changes` needs the async runtime
    /// for its timeout and is bridged via `block_in_place`, which only
    /// a multi-thread runtime supports.
    pub fn execute_sync(&self, call: &ToolCall) -> ToolResult {
        if call.tool_name == DIFF_CHANGES {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::CurrentThread {
                    return ToolResult::failure(
                        &call.tool_name,
                        ToolError::execution_failed(
                            "diff_changes requires a multi-thread async runtime",
                        ),
                    );
                }
                return tokio::task::block_in_place(|| handle.block_on(diff::execute(self, call)));
            }
            return ToolResult::failure(
                &call.tool_name,
                ToolError::execution_failed("diff_changes requires an async runtime"),
            );
        }
        self.execute_internal(call)
    }
}

#[async_trait]
impl ToolExecutorPort for EvidenceToolkit {
    fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.tool_name == DIFF_CHANGES {
            return diff::execute(self, call).await;
        }
        self.execute_internal(call)
    }
}

fn default_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            FIND_FILES,
            "Locate files by glob pattern relative to the repository root. \
             Supports *, ?, [...] and ** across directories.",
        )
        .with_parameter(ToolParameter::new(
            "pattern",
            "Glob pattern, e.g. 'src/**/*.rs'",
            true,
        ))
        .with_parameter(
            ToolParameter::new("max_results", "Maximum number of paths (default 200)", false)
                .with_type("integer"),
        ),
        ToolDefinition::new(
            SEARCH_CONTENT,
            "Search file contents by regular expression. Invalid regexes \
             fall back to literal substring matching.",
        )
        .with_parameter(ToolParameter::new("query", "Regular expression to search for", true))
        .with_parameter(ToolParameter::new(
            "glob",
            "Optional glob restricting which files are searched",
            false,
        ))
        .with_parameter(
            ToolParameter::new("max_results", "Maximum number of hits (default 200)", false)
                .with_type("integer"),
        ),
        ToolDefinition::new(
            READ_FILE,
            "Read a file snippet by 1-indexed line range (at most 400 lines).",
        )
        .with_parameter(ToolParameter::new("path", "Path relative to the repository root", true))
        .with_parameter(
            ToolParameter::new("start_line", "First line to read (default 1)", false)
                .with_type("integer"),
        )
        .with_parameter(
            ToolParameter::new("end_line", "Last line to read (inclusive)", false)
                .with_type("integer"),
        ),
        ToolDefinition::new(
            DIFF_CHANGES,
            "Show the git diff of the repository against a base ref.",
        )
        .with_parameter(ToolParameter::new(
            "base",
            "Base ref to diff against (default 'main')",
            false,
        ))
        .with_parameter(ToolParameter::new(
            "path",
            "Optional path restricting the diff",
            false,
        )),
    ]
}

#[cfg(test)]
pub(crate) mod testfs {
    use super::EvidenceToolkit;
    use std::fs;

    /// A small repository tree with a denied directory and file mixed in.
    pub(crate) fn fixture_toolkit() -> (tempfile::TempDir, EvidenceToolkit) {
        let dir = tempfile::tempdir().expect("create tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src/util")).expect("mkdir");
        fs::create_dir_all(root.join(".git")).expect("mkdir");
        fs::write(root.join("src/main.rs"), "fn main() {\n    run();\n}\n").expect("write");
        fs::write(
            root.join("src/util/helpers.rs"),
            "pub fn helpers() {}\n",
        )
        .expect("write");
        fs::write(
            root.join("notes.txt"),
            "some weird (unbalanced text\nanother line\n",
        )
        .expect("write");
        fs::write(
            root.join("numbers.txt"),
            "line 1\nline 2\nline 3\nline 4\nline 5\n",
        )
        .expect("write");
        let big: String = (1..=1000).map(|i| format!("row {}\n", i)).collect();
        fs::write(root.join("big.txt"), big).expect("write");
        fs::write(root.join(".env"), "SECRET_TOKEN=hunter2\n").expect("write");
        fs::write(root.join(".git/config"), "[core]\n").expect("write");

        let toolkit = EvidenceToolkit::new(root).expect("toolkit");
        (dir, toolkit)
    }

    #[test]
    fn toolkit_offers_exactly_four_tools() {
        use conclave_application::ToolExecutorPort;
        let (_dir, toolkit) = fixture_toolkit();
        let names: Vec<&str> = toolkit
            .tool_definitions()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["find_files", "search_content", "read_file", "diff_changes"]
        );
        assert!(toolkit.has_tool("read_file"));
        assert!(!toolkit.has_tool("write_file"));
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = conclave_domain::ToolCall::new("run_command");
        let result = toolkit.execute_sync(&call);
        assert_eq!(result.error().unwrap().code, "NOT_FOUND");
    }

    // tokio::test defaults to the current-thread flavor, where
    // block_in_place would panic.
    #[tokio::test]
    async fn sync_diff_on_current_thread_runtime_fails_instead_of_panicking() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = conclave_domain::ToolCall::new(conclave_domain::DIFF_CHANGES)
            .with_arg("base", "main");
        let result = toolkit.execute_sync(&call);
        assert_eq!(result.error().unwrap().code, "EXECUTION_FAILED");
    }
}
