// src/application/submitter.rs
use tracing::{debug, info, warn};

use crate::constants::FRONT_PREVIEW_CHARS;
use crate::domain::{CardDraft, NoteBuilder, NoteId, NotePayload, SubmissionOutcome};
use crate::infrastructure::connect::AnkiConnectClient;
use crate::infrastructure::media;
use crate::infrastructure::transport::Transport;
use crate::util::text::preview;

/// Submits cards through AnkiConnect and verifies every write with an
/// independent read-back.
///
/// A local Anki with its plugin surface is not a trustworthy writer: adds
/// have been observed to report success without persisting. Submission is
/// therefore a two-phase protocol, and the add response alone never counts.
pub struct CardSubmitter<T: Transport> {
    client: AnkiConnectClient<T>,
    builder: NoteBuilder,
}

/// Per-item accounting of a batch submission.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub front: String,
    pub reason: String,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T: Transport> CardSubmitter<T> {
    pub fn new(client: AnkiConnectClient<T>, builder: NoteBuilder) -> Self {
        Self { client, builder }
    }

    pub fn client(&self) -> &AnkiConnectClient<T> {
        &self.client
    }

    /// Full flow for one draft: upload the image when present, build the
    /// payload, submit, verify.
    pub fn submit_draft(&self, draft: &CardDraft) -> SubmissionOutcome {
        let image_filename = match &draft.image {
            Some(path) => match media::attach_image(&self.client, path) {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!(image = %path.display(), error = %e, "Media upload failed");
                    return e.into();
                }
            },
            None => None,
        };

        let payload = self.builder.build(
            &draft.front,
            &draft.back,
            draft.source.as_deref(),
            image_filename.as_deref(),
        );
        self.submit(&payload)
    }

    /// Phase one: add the note. Phase two: confirm it exists with a fresh
    /// notes-info query. A rejected add short-circuits; nothing is read
    /// back for it.
    pub fn submit(&self, payload: &NotePayload) -> SubmissionOutcome {
        let note_id = match self.client.add_note(payload) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Add-note failed");
                return e.into();
            }
        };

        debug!(note_id, "Add-note accepted, verifying");
        self.verify(note_id)
    }

    fn verify(&self, note_id: NoteId) -> SubmissionOutcome {
        let records = match self.client.notes_info(&[note_id]) {
            Ok(records) => records,
            Err(e) => {
                warn!(note_id, error = %e, "Read-back failed, write state unknown");
                return SubmissionOutcome::VerificationFailed(note_id);
            }
        };

        match records.first() {
            Some(record) if record.note_id == Some(note_id) => {
                info!(note_id, "Note confirmed");
                SubmissionOutcome::Success(note_id)
            }
            // Schema variance fallback: the record carries no usable id but
            // its content references the one we submitted.
            Some(record) if record.contains_text(&note_id.to_string()) => {
                debug!(note_id, "Note confirmed via field-content fallback");
                SubmissionOutcome::Success(note_id)
            }
            _ => {
                warn!(note_id, "Read-back does not show the note");
                SubmissionOutcome::VerificationFailed(note_id)
            }
        }
    }

    /// Submit a batch strictly in input order, one card at a time, with
    /// per-card progress and accounting. One bad card never aborts the
    /// rest.
    pub fn submit_all(&self, drafts: &[CardDraft]) -> BatchReport {
        let total = drafts.len();
        let mut report = BatchReport::default();

        for (index, draft) in drafts.iter().enumerate() {
            println!(
                "Adding card {}/{}: {}",
                index + 1,
                total,
                preview(&draft.front, FRONT_PREVIEW_CHARS)
            );

            let outcome = self.submit_draft(draft);
            if outcome.is_success() {
                report.succeeded += 1;
            } else {
                println!("  failed: {}", outcome);
                report.failures.push(BatchFailure {
                    front: draft.front.clone(),
                    reason: outcome.to_string(),
                });
            }
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Batch submission finished"
        );
        report
    }
}
