// src/infrastructure/card_file.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::FRONT_PREVIEW_CHARS;
use crate::domain::{CardDraft, FactRecord};
use crate::util::text::preview;

/// Result of loading a card file: the usable drafts plus how many entries
/// were skipped as malformed.
#[derive(Debug)]
pub struct LoadedCards {
    pub drafts: Vec<CardDraft>,
    pub skipped: usize,
}

/// Result of loading the fact inbox.
#[derive(Debug)]
pub struct LoadedFacts {
    pub records: Vec<FactRecord>,
    pub skipped: usize,
}

/// Load a JSON card file.
///
/// The payload may be wrapped in markdown code fences or surrounded by
/// prose; the first balanced JSON array is extracted. Entries that do not
/// form a complete card are skipped with a warning, never fatal.
pub fn read_card_file(path: impl AsRef<Path>) -> Result<LoadedCards> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read card file {}", path.display()))?;
    parse_card_json(&content).with_context(|| format!("No usable cards in {}", path.display()))
}

pub fn parse_card_json(text: &str) -> Result<LoadedCards> {
    let array_text =
        extract_json_array(text).ok_or_else(|| anyhow::anyhow!("No JSON array found"))?;
    let items: Vec<Value> =
        serde_json::from_str(array_text).context("Failed to parse JSON array")?;

    let mut drafts = Vec::new();
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<CardDraft>(item) {
            Ok(draft) => drafts.push(draft),
            Err(e) => {
                warn!(entry = index + 1, error = %e, "Skipping malformed card entry");
                skipped += 1;
            }
        }
    }
    debug!(cards = drafts.len(), skipped, "Parsed card file");
    Ok(LoadedCards { drafts, skipped })
}

/// Extract the first balanced top-level JSON array from free-form text.
///
/// When the text carries a fenced code block the search is narrowed to the
/// block's body, so stray brackets in surrounding prose cannot hijack the
/// scan. Brackets inside string literals are ignored.
fn extract_json_array(text: &str) -> Option<&str> {
    let fence_re = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap();
    let region = fence_re
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);
    balanced_array(region)
}

fn balanced_array(region: &str) -> Option<&str> {
    let start = region.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, byte) in region.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&region[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Load the plain-text fact inbox: records separated by blank lines, each
/// `fact` or `fact | source-url`. Out-of-bounds facts are skipped with a
/// warning.
pub fn read_fact_file(path: impl AsRef<Path>) -> Result<LoadedFacts> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fact file {}", path.display()))?;
    Ok(parse_fact_text(&content))
}

pub fn parse_fact_text(text: &str) -> LoadedFacts {
    let mut records = Vec::new();
    let mut skipped = 0;
    for chunk in text.split("\n\n") {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        match FactRecord::parse(chunk) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(
                    %reason,
                    record = %preview(chunk, FRONT_PREVIEW_CHARS),
                    "Skipping inbox record"
                );
                skipped += 1;
            }
        }
    }
    LoadedFacts { records, skipped }
}

/// Keep-first deduplication of drafts by normalized front text. Returns the
/// kept drafts in their original order and the dropped duplicates.
pub fn dedup_drafts(drafts: Vec<CardDraft>) -> (Vec<CardDraft>, Vec<CardDraft>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for draft in drafts {
        if seen.insert(draft.normalized_front().to_string()) {
            kept.push(draft);
        } else {
            dropped.push(draft);
        }
    }
    (kept, dropped)
}

/// Write drafts as a pretty-printed JSON card file.
pub fn write_card_file(path: impl AsRef<Path>, drafts: &[CardDraft]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(drafts).context("Failed to serialize cards")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write card file {}", path.display()))
}

/// Move the original card file aside before it gets overwritten in place.
/// Returns the backup location.
pub fn backup_original(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let backup = backup_path(path);
    std::fs::rename(path, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    Ok(backup)
}

fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cards");
    path.with_file_name(format!("{}_backup.json", stem))
}
