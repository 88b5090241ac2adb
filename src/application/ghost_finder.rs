// src/application/ghost_finder.rs
use tracing::{debug, info, warn};

use crate::application::RunMode;
use crate::domain::{CardDraft, ConnectError, NoteId};
use crate::infrastructure::connect::{field_query, AnkiConnectClient};
use crate::infrastructure::transport::Transport;

/// Finds notes that block re-submission of a local card list.
///
/// A ghost is a server-side note whose front field matches one of the
/// drafts: Anki's duplicate check rejects the add, yet the note on the
/// server is not the one the caller has on file. Ghosts are located by a
/// deck- and field-scoped server search, never by pulling the whole deck.
pub struct GhostFinder<T: Transport> {
    client: AnkiConnectClient<T>,
    deck: String,
    front_field: String,
}

/// One blocking note as found on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostNote {
    pub note_id: NoteId,
    pub front: String,
    pub back: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct GhostReport {
    pub ghosts: Vec<GhostNote>,
    pub notes_deleted: usize,
}

impl<T: Transport> GhostFinder<T> {
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

    /// Search the deck for every draft's front text and collect the notes
    /// that are already there.
    ///
    /// A failed search or info call aborts the scan: a partial result would
    /// read as "no ghosts" for the drafts never looked at.
    pub fn find_ghosts(&self, drafts: &[CardDraft]) -> Result<Vec<GhostNote>, ConnectError> {
        let mut ghosts = Vec::new();
        for draft in drafts {
            let query = field_query(&self.deck, &self.front_field, draft.normalized_front());
            let ids = self.client.find_notes(&query)?;
            if ids.is_empty() {
                continue;
            }

            debug!(front = draft.normalized_front(), matches = ids.len(), "Ghost candidates");
            for record in self.client.notes_info(&ids)? {
                let Some(note_id) = record.note_id else {
                    continue;
                };
                ghosts.push(GhostNote {
                    note_id,
                    front: record.field_value(&self.front_field).to_string(),
                    back: record.field_value("Back").to_string(),
                });
            }
        }
        info!(deck = %self.deck, ghosts = ghosts.len(), "Ghost scan finished");
        Ok(ghosts)
    }

    /// Find ghosts and, in live mode, delete them all in one call.
    ///
    /// The delete is all-or-nothing: when the single deleteNotes call
    /// fails, nothing is counted as deleted and the whole pass fails.
    pub fn reconcile(
        &self,
        drafts: &[CardDraft],
        mode: RunMode,
    ) -> Result<GhostReport, ConnectError> {
        let ghosts = self.find_ghosts(drafts)?;

        if !mode.is_live() || ghosts.is_empty() {
            return Ok(GhostReport {
                ghosts,
                notes_deleted: 0,
            });
        }

        let ids: Vec<NoteId> = ghosts.iter().map(|ghost| ghost.note_id).collect();
        warn!(deck = %self.deck, count = ids.len(), "Deleting ghost notes");
        self.client.delete_notes(&ids)?;
        let notes_deleted = ids.len();
        Ok(GhostReport {
            ghosts,
            notes_deleted,
        })
    }
}
