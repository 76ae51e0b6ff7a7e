//! Terminal and JSON rendering of search results

use anyhow::{Context, Result};
use colored::Colorize;
use fathom_core::MatchRecord;
use serde::Serialize;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `path:line:text`, colored when stdout is a terminal
    Text,
    /// One pretty-printed JSON document
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", rendered);
    Ok(())
}

pub fn print_matches(records: &[MatchRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(records),
        OutputFormat::Text => {
            for record in records {
                println!("{}", format_match(record));
            }
            Ok(())
        }
    }
}

pub fn print_paths(paths: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(paths),
        OutputFormat::Text => {
            for path in paths {
                println!("{}", path);
            }
            Ok(())
        }
    }
}

/// `path:line:text` with the matched spans emphasized
pub fn format_match(record: &MatchRecord) -> String {
    let line = record
        .line_number
        .map(|n| n.to_string())
        .unwrap_or_default();

    format!(
        "{}:{}:{}",
        record.file_path.magenta(),
        line.green(),
        highlight_submatches(record)
    )
}

/// Emphasize submatch byte ranges; spans that do not fall on character
/// boundaries of the stored line are left plain
fn highlight_submatches(record: &MatchRecord) -> String {
    let text = record.matched_text.as_str();
    let mut rendered = String::with_capacity(text.len());
    let mut cursor = 0;

    for submatch in &record.submatches {
        if submatch.start < cursor {
            continue;
        }
        let (Some(before), Some(span)) = (
            text.get(cursor..submatch.start),
            text.get(submatch.start..submatch.end),
        ) else {
            continue;
        };
        rendered.push_str(before);
        rendered.push_str(&span.red().bold().to_string());
        cursor = submatch.end;
    }

    rendered.push_str(text.get(cursor..).unwrap_or_default());
    rendered
}
