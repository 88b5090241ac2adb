// src/application/deck_deduper.rs
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::application::RunMode;
use crate::domain::{ConnectError, NoteId, NoteRecord};
use crate::infrastructure::connect::{deck_query, AnkiConnectClient};
use crate::infrastructure::transport::Transport;

/// Scans a whole deck for notes sharing the same front text and removes
/// all but the most recent copy of each.
///
/// The deck is re-read from scratch on every run; nothing is cached across
/// passes, so a dry run followed by a live run always works on fresh
/// ground truth.
pub struct DeckDeduper<T: Transport> {
    client: AnkiConnectClient<T>,
    deck: String,
    front_field: String,
}

/// Notes sharing one normalized front text, already split into the copy
/// to keep and the copies to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub front: String,
    pub keep: NoteId,
    pub delete: Vec<NoteId>,
}

/// Outcome of one dedup pass.
#[derive(Debug, Default)]
pub struct DedupReport {
    pub total_notes: usize,
    pub unique_fronts: usize,
    pub groups: Vec<DuplicateGroup>,
    pub notes_deleted: usize,
}

impl DedupReport {
    pub fn duplicates_found(&self) -> usize {
        self.groups.iter().map(|group| group.delete.len()).sum()
    }
}

impl<T: Transport> DeckDeduper<T> {
    pub fn new(
        client: AnkiConnectClient<T>,
        deck: impl Into<String>,
        front_field: impl Into<String>,
    ) -> Self {
        Self {
            client,
            deck: deck.into(),
            front_field: front_field.into(),
        }
    }

    pub fn client(&self) -> &AnkiConnectClient<T> {
        &self.client
    }

    /// One linear pass: fetch ids, fetch records, group, decide, and in
    /// live mode delete everything marked in a single call.
    pub fn dedup(&self, mode: RunMode) -> Result<DedupReport, ConnectError> {
        let ids = self.client.find_notes(&deck_query(&self.deck))?;
        debug!(deck = %self.deck, notes = ids.len(), "Fetched deck note ids");
        if ids.is_empty() {
            return Ok(DedupReport::default());
        }

        let records = self.client.notes_info(&ids)?;
        let grouped = self.group_by_front(&records);
        let unique_fronts = grouped.len();
        let groups: Vec<DuplicateGroup> = grouped
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(front, members)| split_group(front, members))
            .collect();

        let mut report = DedupReport {
            total_notes: records.len(),
            unique_fronts,
            groups,
            notes_deleted: 0,
        };

        let pending: Vec<NoteId> = report
            .groups
            .iter()
            .flat_map(|group| group.delete.iter().copied())
            .collect();
        info!(
            deck = %self.deck,
            notes = report.total_notes,
            groups = report.groups.len(),
            duplicates = pending.len(),
            "Dedup scan finished"
        );

        if mode.is_live() && !pending.is_empty() {
            warn!(deck = %self.deck, count = pending.len(), "Deleting duplicate notes");
            self.client.delete_notes(&pending)?;
            report.notes_deleted = pending.len();
        }
        Ok(report)
    }

    /// Group records by trimmed front text. Records without an id or with
    /// an empty front are left out and untouched.
    fn group_by_front<'a>(
        &self,
        records: &'a [NoteRecord],
    ) -> BTreeMap<String, Vec<&'a NoteRecord>> {
        let mut grouped: BTreeMap<String, Vec<&NoteRecord>> = BTreeMap::new();
        for record in records {
            if record.note_id.is_none() {
                continue;
            }
            let front = record.field_value(&self.front_field).trim();
            if front.is_empty() {
                continue;
            }
            grouped.entry(front.to_string()).or_default().push(record);
        }
        grouped
    }
}

/// Most recent modification wins; ties go to the lowest note id so the
/// choice is deterministic. Everything after the winner is deleted.
fn split_group(front: String, mut members: Vec<&NoteRecord>) -> DuplicateGroup {
    members.sort_by(|a, b| {
        b.mod_time
            .cmp(&a.mod_time)
            .then(a.note_id.cmp(&b.note_id))
    });
    let keep = members[0].note_id.unwrap_or_default();
    let delete = members[1..]
        .iter()
        .filter_map(|record| record.note_id)
        .collect();
    DuplicateGroup { front, keep, delete }
}
