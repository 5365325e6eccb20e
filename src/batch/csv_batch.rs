//! Line-oriented sizing for delimited files.
//!
//! Sizing counts raw `\n`-separated lines, header included. Writing copies
//! the same lines verbatim, cut back to the last record boundary so a quoted
//! field spanning the end of the prefix is never written.

use std::fs;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};

use super::BatchStrategy;
use crate::context::budget::{BatchResult, GreedyScan, TokenBudget};
use crate::context::format::RecordFormat;
use crate::context::tokens::count_tokens;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvBatch;

impl BatchStrategy for CsvBatch {
    fn format(&self) -> RecordFormat {
        RecordFormat::Csv
    }

    fn size(&self, content: &str, prompt_tokens: u32, budget: TokenBudget) -> Result<BatchResult> {
        let mut scan = GreedyScan::new(budget, prompt_tokens);
        let mut total = 0usize;

        // A trailing newline yields a final empty line, which costs nothing.
        for line in content.split('\n') {
            total += 1;
            if !scan.is_closed() {
                scan.offer(count_tokens(line));
            }
        }

        Ok(scan.finish(total, 0))
    }

    fn write_prefix(&self, source: &Path, units: usize, dest: &Path) -> Result<usize> {
        let content = fs::read_to_string(source)?;
        let (mut end, mut kept) = line_prefix(&content, units);

        if let Some(start) = straddling_record(&content, end)? {
            end = start;
            kept = content[..end].matches('\n').count();
        }

        fs::write(dest, &content[..end])?;
        Ok(kept)
    }
}

/// Byte length and line count of the first `units` lines, terminators included.
fn line_prefix(content: &str, units: usize) -> (usize, usize) {
    let mut end = 0usize;
    let mut kept = 0usize;
    for line in content.split('\n').take(units) {
        end += line.len();
        if end < content.len() {
            end += 1;
        }
        kept += 1;
    }
    (end, kept)
}

/// Start offset of the record that begins before `end` but finishes after it.
///
/// The reader skips blank lines before a record, so the start is moved past
/// them; those lines stay in the prefix.
fn straddling_record(content: &str, end: usize) -> Result<Option<usize>> {
    if end >= content.len() {
        return Ok(None);
    }

    let bytes = content.as_bytes();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut record = ByteRecord::new();

    loop {
        let from = reader.position().byte() as usize;
        if !reader.read_byte_record(&mut record)? {
            return Ok(None);
        }
        let start = from
            + bytes[from..]
                .iter()
                .take_while(|&&b| b == b'\r' || b == b'\n')
                .count();
        if start >= end {
            return Ok(None);
        }
        if reader.position().byte() as usize > end {
            return Ok(Some(start));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn size(content: &str, prompt_tokens: u32, ceiling: u32) -> BatchResult {
        CsvBatch.size(content, prompt_tokens, TokenBudget::new(ceiling)).unwrap()
    }

    /// Line with exactly `n` whitespace tokens
    fn line_of(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn test_scenario_prompt_10_ceiling_100() {
        let content = [line_of(20), line_of(30), line_of(50)].join("\n");
        let result = size(&content, 10, 100);

        assert_eq!(result.units_selected, 2);
        assert_eq!(result.units_remaining, 1);
        assert_eq!(result.projected_total_tokens, 65.0);
    }

    #[test]
    fn test_largest_fitting_prefix() {
        let content = [line_of(5), line_of(5), line_of(5), line_of(5)].join("\n");
        // 3 + 5 + 5 = 13 fits, a third line would reach 18
        let result = size(&content, 2, 17);
        assert_eq!(result.units_selected, 2);
        assert_eq!(result.units_remaining, 2);
        assert_eq!(result.total_units(), 4);
    }

    #[test]
    fn test_exact_ceiling_is_admitted() {
        let content = [line_of(4), line_of(6)].join("\n");
        let result = size(&content, 0, 10);
        assert_eq!(result.units_selected, 2);
        assert_eq!(result.projected_total_tokens, 10.0);
    }

    #[test]
    fn test_ceiling_equal_to_inflated_prompt() {
        let content = [line_of(1), line_of(1)].join("\n");
        let result = size(&content, 10, 15);
        assert_eq!(result.units_selected, 0);
        assert_eq!(result.units_remaining, 2);
        assert_eq!(result.projected_total_tokens, 15.0);
    }

    #[test]
    fn test_no_backfill_after_stop() {
        let content = [line_of(2), line_of(50), line_of(1)].join("\n");
        let result = size(&content, 0, 10);
        assert_eq!(result.units_selected, 1);
        assert_eq!(result.units_remaining, 2);
        assert_eq!(result.projected_total_tokens, 2.0);
    }

    #[test]
    fn test_blank_lines_are_free_units() {
        let result = size("name,age\n\nana,30\n", 0, 100);
        // header, blank, row, trailing empty line
        assert_eq!(result.units_selected, 4);
        assert_eq!(result.units_remaining, 0);
        assert_eq!(result.projected_total_tokens, 2.0);
    }

    #[test]
    fn test_write_prefix_keeps_header_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "name,notes\nana,\"likes, chess\"\nbia,go\ncris,poker\n").unwrap();

        let written = CsvBatch.write_prefix(&source, 3, &dest).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "name,notes\nana,\"likes, chess\"\nbia,go\n"
        );
    }

    #[test]
    fn test_write_prefix_zero_units_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "name\nana\n").unwrap();

        assert_eq!(CsvBatch.write_prefix(&source, 0, &dest).unwrap(), 0);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "");
    }

    #[test]
    fn test_write_prefix_more_units_than_lines() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "name\nana\n").unwrap();

        // Three lines, the last one empty
        assert_eq!(CsvBatch.write_prefix(&source, 5, &dest).unwrap(), 3);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "name\nana\n");
    }

    #[test]
    fn test_blank_line_prefix_stops_before_rejected_row() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        let content = "name\n\nana\nbia\n";
        fs::write(&source, content).unwrap();

        let result = size(content, 0, 1);
        assert_eq!(result.units_selected, 2);

        let written = CsvBatch.write_prefix(&source, result.units_selected, &dest).unwrap();
        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "name\n\n");
    }

    #[test]
    fn test_multiline_field_past_prefix_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        let content = "name,notes\nana,\"line one\nline two\"\nbia,x\n";
        fs::write(&source, content).unwrap();

        let result = size(content, 0, 3);
        assert_eq!(result.units_selected, 2);

        let written = CsvBatch.write_prefix(&source, result.units_selected, &dest).unwrap();
        assert_eq!(written, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "name,notes\n");
    }

    #[test]
    fn test_multiline_field_inside_prefix_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("people.csv");
        let dest = dir.path().join("out.csv");
        fs::write(&source, "name,notes\nana,\"line one\nline two\"\nbia,x\n").unwrap();

        assert_eq!(CsvBatch.write_prefix(&source, 3, &dest).unwrap(), 3);
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "name,notes\nana,\"line one\nline two\"\n"
        );
    }
}
