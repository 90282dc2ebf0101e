//! read_file: ranged, line-numbered file reads.

use super::{confine, deny, EvidenceToolkit};
use conclave_domain::{ToolCall, ToolError, ToolResult, ToolResultMetadata, READ_FILE};
use std::io::{BufRead, BufReader};
use std::time::Instant;

/// The window never exceeds this many lines, whatever the caller asks.
pub const MAX_READ_LINES: usize = 400;

pub(super) fn execute(toolkit: &EvidenceToolkit, call: &ToolCall) -> ToolResult {
    let start = Instant::now();
    let rel = match call.require_string("path") {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, ToolError::invalid_argument(e)),
    };
    if deny::denied_path(rel) {
        return ToolResult::failure(READ_FILE, ToolError::access_denied(rel));
    }
    let path = match confine::resolve_file(toolkit.root(), rel) {
        Ok(p) => p,
        Err(e) => return ToolResult::failure(READ_FILE, e),
    };

    // 1-indexed, inclusive window, clamped to MAX_READ_LINES.
    let start_line = call.get_usize("start_line").unwrap_or(1).max(1);
    let end_line = call
        .get_usize("end_line")
        .unwrap_or(start_line + MAX_READ_LINES - 1)
        .min(start_line + MAX_READ_LINES - 1);

    let file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            return ToolResult::failure(
                READ_FILE,
                ToolError::execution_failed(format!("Failed to open {}: {}", rel, e)),
            );
        }
    };

    let mut lines = Vec::new();
    let mut truncated_by_eof = true;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let number = idx + 1;
        if number < start_line {
            continue;
        }
        if number > end_line {
            truncated_by_eof = false;
            break;
        }
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                return ToolResult::failure(
                    READ_FILE,
                    ToolError::execution_failed(format!("Failed to read {}: {}", rel, e)),
                );
            }
        };
        lines.push(format!("{:>6}|{}", number, line));
    }

    let count = lines.len();
    let mut output = lines.join("\n");
    if !truncated_by_eof {
        output.push_str(&format!("\n... (window ends at line {})", end_line));
    }

    ToolResult::success(READ_FILE, output).with_metadata(ToolResultMetadata {
        duration_ms: Some(start.elapsed().as_millis() as u64),
        match_count: Some(count),
        path: Some(rel.to_string()),
        truncated: if truncated_by_eof { None } else { Some(true) },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::testfs::fixture_toolkit;

    #[test]
    fn reads_a_window_with_line_numbers() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "numbers.txt")
            .with_arg("start_line", 2)
            .with_arg("end_line", 3);
        let result = toolkit.execute_sync(&call);

        assert!(result.is_success());
        let output = result.output().unwrap();
        assert!(output.contains("2|line 2"));
        assert!(output.contains("3|line 3"));
        assert!(!output.contains("1|line 1"));
        assert!(!output.contains("4|line 4"));
    }

    #[test]
    fn window_never_exceeds_max_lines() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "big.txt")
            .with_arg("start_line", 1)
            .with_arg("end_line", 100_000);
        let result = toolkit.execute_sync(&call);

        assert!(result.is_success());
        assert_eq!(result.metadata.match_count, Some(MAX_READ_LINES));
        assert_eq!(result.metadata.truncated, Some(true));
    }

    #[test]
    fn end_before_start_yields_empty_window() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "numbers.txt")
            .with_arg("start_line", 4)
            .with_arg("end_line", 2);
        let result = toolkit.execute_sync(&call);

        assert!(result.is_success());
        assert_eq!(result.metadata.match_count, Some(0));
    }

    #[test]
    fn end_beyond_eof_is_fine() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "numbers.txt")
            .with_arg("end_line", 50);
        let result = toolkit.execute_sync(&call);

        assert!(result.is_success());
        assert_eq!(result.metadata.match_count, Some(5));
        assert!(result.metadata.truncated.is_none());
    }

    #[test]
    fn directory_path_is_not_found() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE).with_arg("path", "src");
        let result = toolkit.execute_sync(&call);
        assert_eq!(result.error().unwrap().code, "NOT_FOUND");
    }

    #[test]
    fn escaping_path_is_denied() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE).with_arg("path", "../etc/passwd");
        let result = toolkit.execute_sync(&call);
        assert_eq!(result.error().unwrap().code, "ACCESS_DENIED");
    }

    #[test]
    fn denylisted_file_is_denied_even_by_direct_path() {
        let (_dir, toolkit) = fixture_toolkit();
        let call = ToolCall::new(READ_FILE).with_arg("path", ".env");
        let result = toolkit.execute_sync(&call);
        assert_eq!(result.error().unwrap().code, "ACCESS_DENIED");
    }
}
