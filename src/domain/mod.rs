// src/domain/mod.rs
pub mod card;
pub mod error;
pub mod note;
pub mod submission;

pub use card::{CardDraft, FactRecord};
pub use error::ConnectError;
pub use note::{NoteBuilder, NoteField, NoteId, NotePayload, NoteRecord};
pub use submission::SubmissionOutcome;
