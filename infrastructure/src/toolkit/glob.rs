//! find_files: anchored glob matching over a repository walk.

use super::{deny, EvidenceToolkit};
use conclave_domain::{
    ToolCall, ToolError, ToolResult, ToolResultMetadata, FIND_FILES,
};
use regex::Regex;
use std::time::Instant;
use walkdir::WalkDir;

/// Hard cap on results; caller-supplied max_results is clamped to it.
pub const MAX_FIND_RESULTS: usize = 200;

/// Compile a glob into an anchored regex over the full relative path.
///
/// `*` matches within one segment, `?` one character, `[...]` a class,
/// `**` zero or more whole segments. Matching is done against the
/// relative path with a trailing `/` appended, which lets `**` compile
/// to an optional `dirs/` prefix uniformly.
pub fn compile_glob(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    let pattern = pattern.replace('\\', "/");
    let mut re = String::from("^");
    for part in pattern.split('/') {
        if part == "**" {
            re.push_str("(?:.+/)?");
        } else {
            re.push_str(&segment_to_regex(part));
            re.push('/');
        }
    }
    // ** followed by a literal segment leaves a doubled slash behind.
    let re = re.replace("(?:.+/)?/", "(?:.+/)?");
    Regex::new(&format!("{}$", re)).ok()
}

fn segment_to_regex(segment: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = segment.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                // Pass a balanced character class through untouched.
                if let Some(close) = chars[i..].iter().position(|&c| c == ']') {
                    let class: String = chars[i..=i + close].iter().collect();
                    out.push_str(&class);
                    i += close;
                } else {
                    out.push_str(&regex::escape("["));
                }
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out
}

pub(super) fn execute(toolkit: &EvidenceToolkit, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let pattern = match call.require_string("pattern") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(FIND_FILES, ToolError::invalid_argument(e)),
    };
    let matcher = match compile_glob(pattern) {
        Some(m) => m,
        None => return ToolResult::failure(FIND_FILES, ToolError::invalid_pattern(pattern)),
    };
    let max = call
        .get_usize("max_results")
        .unwrap_or(MAX_FIND_RESULTS)
        .min(MAX_FIND_RESULTS)
        .max(1);

    let mut results = Vec::new();
    let walker = WalkDir::new(toolkit.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(deny::walk_filter);

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if results.len() >= max {
            break;
        }
        let rel = match entry.path().strip_prefix(toolkit.root()) {
            Ok(p) => p.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        // Trailing / so the ** prefix alternative lines up (see compile_glob).
        if matcher.is_match(&format!("{}/", rel)) {
            results.push(rel);
        }
    }

    let count = results.len();
    ToolResult::success(FIND_FILES, results.join("\n")).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        match_count: Some(count),
        truncated: if count >= max { Some(true) } else { None },
        ..Default::default()
    })
}
