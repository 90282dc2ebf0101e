//! diff_changes: version-control diff against a base ref.
//!
//! The git invocation is argument-injection-hardened: the base ref must
//! match a conservative charset and must not look like a flag, and any
//! path filter goes after `--`. Output is streamed with a hard line
//! ceiling; the child is killed as soon as the ceiling trips.

use super::{deny, EvidenceToolkit};
use conclave_domain::{ToolCall, ToolError, ToolResult, ToolResultMetadata, DIFF_CHANGES};
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::Instant;
use tokio::time::{timeout, Duration};

pub const MAX_DIFF_LINES: usize = 10_000;
const DIFF_TIMEOUT_SECS: u64 = 60;

fn safe_ref_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^[A-Za-z0-9._/-]+$").expect("hard-coded ref pattern compiles")
    })
}

fn valid_ref(base: &str) -> bool {
    !base.starts_with('-') && safe_ref_pattern().is_match(base)
}

fn valid_path_filter(path: &str) -> bool {
    let p = Path::new(path);
    !path.starts_with('-')
        && !p.is_absolute()
        && p.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub(super) async fn execute(toolkit: &EvidenceToolkit, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let base = call.get_string("base").unwrap_or("main").to_string();
    if !valid_ref(&base) {
        return ToolResult::failure(DIFF_CHANGES, ToolError::invalid_ref(&base));
    }
    let path_filter = match call.get_string("path") {
        Some(p) if !p.is_empty() => {
            if !valid_path_filter(p) || deny::denied_path(p) {
                return ToolResult::failure(DIFF_CHANGES, ToolError::access_denied(p));
            }
            Some(p.to_string())
        }
        _ => None,
    };
    let root = toolkit.root().to_path_buf();

    // Three-dot diff first (merge-base comparison), then a plain
    // two-way diff for repositories where the first form errors.
    let three_dot = diff_args(format!("{}...HEAD", base), path_filter.as_deref());
    let streamed = match run_streaming(root.clone(), three_dot).await {
        Ok(out) => Ok(out),
        Err(_) => run_streaming(root, diff_args(base.clone(), path_filter.as_deref())).await,
    };

    match streamed {
        Ok((content, truncated)) => {
            let output = if content.is_empty() {
                "No changes found.".to_string()
            } else if truncated {
                format!(
                    "{}\n... (diff truncated at {} lines)",
                    content, MAX_DIFF_LINES
                )
            } else {
                content
            };
            ToolResult::success(DIFF_CHANGES, output).with_metadata(ToolResultMetadata {
                duration_ms: Some(start.elapsed().as_millis() as u64),
                path: path_filter,
                truncated: if truncated { Some(true) } else { None },
                ..Default::default()
            })
        }
        Err(e) => ToolResult::failure(DIFF_CHANGES, ToolError::execution_failed(e)),
    }
}

fn diff_args(range: String, path_filter: Option<&str>) -> Vec<String> {
    let mut args = vec!["diff".to_string(), range, "--".to_string()];
    if let Some(p) = path_filter {
        args.push(p.to_string());
    }
    // Tracked sensitive files stay out of the diff even when no path
    // filter narrows it.
    args.extend(deny::git_exclude_pathspecs());
    args
}

async fn run_streaming(root: PathBuf, args: Vec<String>) -> Result<(String, bool), String> {
    let task = tokio::task::spawn_blocking(move || run_sync(&root, &args));
    timeout(Duration::from_secs(DIFF_TIMEOUT_SECS), task)
        .await
        .map_err(|_| format!("git diff timed out after {}s", DIFF_TIMEOUT_SECS))?
        .map_err(|e| format!("git diff task error: {}", e))?
}

fn run_sync(root: &Path, args: &[String]) -> Result<(String, bool), String> {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(root)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to start git diff: {}", e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "Failed to capture git diff stdout".to_string())?;

    let mut output = String::new();
    let mut line_count = 0usize;
    let mut truncated = false;
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        line_count += 1;
        if line_count > MAX_DIFF_LINES {
            truncated = true;
            break;
        }
        output.push_str(&line);
        output.push('\n');
    }
    if truncated {
        let _ = child.kill();
    }
    let status = child.wait();

    let content = output.trim_end_matches('\n').to_string();
    if !truncated && content.is_empty() {
        if let Ok(s) = status {
            if !s.success() {
                return Err("git diff returned non-zero with no output".to_string());
            }
        }
    }
    Ok((content, truncated))
}
