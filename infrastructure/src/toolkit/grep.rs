//! search_content: regex content search with a literal fallback.

use super::{deny, glob::compile_glob, EvidenceToolkit};
use conclave_domain::{
    ToolCall, ToolError, ToolResult, ToolResultMetadata, SEARCH_CONTENT,
};
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::time::Instant;
use walkdir::WalkDir;

pub const MAX_SEARCH_RESULTS: usize = 200;

/// Files larger than this are skipped, never partially scanned.
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

pub(super) fn execute(toolkit: &EvidenceToolkit, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let query = match call.require_string("query") {
        Ok(q) => q,
        Err(e) => return ToolResult::failure(SEARCH_CONTENT, ToolError::invalid_argument(e)),
    };
    if query.is_empty() {
        return ToolResult::failure(
            SEARCH_CONTENT,
            ToolError::invalid_argument("query must not be empty"),
        );
    }
    // An unparsable regex degrades to a literal substring search.
    let matcher = match Regex::new(query).or_else(|_| Regex::new(&regex::escape(query))) {
        Ok(m) => m,
        Err(e) => {
            return ToolResult::failure(
                SEARCH_CONTENT,
                ToolError::execution_failed(format!("Failed to compile query: {}", e)),
            );
        }
    };
    let glob_filter = match call.get_string("glob") {
        Some(g) if !g.is_empty() => match compile_glob(g) {
            Some(m) => Some(m),
            None => return ToolResult::failure(SEARCH_CONTENT, ToolError::invalid_pattern(g)),
        },
        _ => None,
    };
    let max = call
        .get_usize("max_results")
        .unwrap_or(MAX_SEARCH_RESULTS)
        .min(MAX_SEARCH_RESULTS)
        .max(1);

    let mut hits: Vec<String> = Vec::new();
    let walker = WalkDir::new(toolkit.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(deny::walk_filter);

    'walk: for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if hits.len() >= max {
            break;
        }
        let rel = match entry.path().strip_prefix(toolkit.root()) {
            Ok(p) => p.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        if let Some(ref gf) = glob_filter {
            if !gf.is_match(&format!("{}/", rel)) {
                continue;
            }
        }
        match entry.metadata() {
            Ok(m) if m.len() > MAX_FILE_SIZE => continue,
            Ok(_) => {}
            Err(_) => continue,
        }
        let file = match std::fs::File::open(entry.path()) {
            Ok(f) => f,
            Err(_) => continue,
        };
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            // Binary or otherwise unreadable content: skip the file.
            let line = match line {
                Ok(l) => l,
                Err(_) => continue 'walk,
            };
            if matcher.is_match(&line) {
                hits.push(format!("{}:{}:{}", rel, idx + 1, line));
                if hits.len() >= max {
                    continue 'walk;
                }
            }
        }
    }

    let count = hits.len();
    ToolResult::success(SEARCH_CONTENT, hits.join("\n")).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        match_count: Some(count),
        truncated: if count >= max { Some(true) } else { None },
        ..Default::default()
    })
}
