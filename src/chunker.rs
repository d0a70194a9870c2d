//! Line-aligned chunking
//!
//! Splits file content into bounded, contiguous line ranges. Boundaries depend
//! only on the input text and the two limits, so rescanning an unchanged file
//! always reproduces the same chunks (and therefore the same scan hash).

use serde::{Deserialize, Serialize};

/// A bounded slice of a file's lines, 1-based and inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// Split `content` into chunks of at most `max_lines` lines and `max_bytes` bytes
///
/// Byte accounting counts the `\n` joining consecutive lines but not a trailing
/// one. A line longer than `max_bytes` is never split; it becomes its own chunk.
/// Limits of zero are treated as one.
pub fn chunk(content: &str, max_lines: usize, max_bytes: usize) -> Vec<ChunkSpan> {
    let max_lines = max_lines.max(1);
    let max_bytes = max_bytes.max(1);

    let lines = split_lines(content);
    let mut chunks = Vec::new();

    let mut current: Vec<&str> = Vec::new();
    let mut current_bytes = 0usize;
    let mut start_line = 1usize;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        if !current.is_empty() {
            let would_be_lines = current.len() + 1;
            let would_be_bytes = current_bytes + 1 + line.len();
            if would_be_lines > max_lines || would_be_bytes > max_bytes {
                chunks.push(ChunkSpan {
                    chunk_index: chunks.len(),
                    start_line,
                    end_line: line_no - 1,
                    content: current.join("\n"),
                });
                current.clear();
                current_bytes = 0;
                start_line = line_no;
            }
        }

        if current.is_empty() {
            current_bytes = line.len();
        } else {
            current_bytes += 1 + line.len();
        }
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(ChunkSpan {
            chunk_index: chunks.len(),
            start_line,
            end_line: lines.len(),
            content: current.join("\n"),
        });
    }

    chunks
}

/// Lines of `content` split on `\n`; a trailing newline does not open a new line.
/// Carriage returns stay attached to their line so content round-trips exactly.
pub fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n').collect()
}
