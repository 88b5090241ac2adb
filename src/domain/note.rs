// src/domain/note.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Anki note identifier as reported by AnkiConnect.
pub type NoteId = i64;

/// The `note` object sent with an add-note request.
///
/// Serializes to the AnkiConnect shape: `deckName`, `modelName`, `fields`
/// keyed by template field name, `options.allowDuplicate`, `tags`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub options: NoteOptions,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

impl NotePayload {
    pub fn field_value(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// One entry of a notes-info response.
///
/// Every member is defaulted: AnkiConnect answers queries for missing notes
/// with empty objects, and those must deserialize rather than abort the
/// whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    #[serde(rename = "noteId", default)]
    pub note_id: Option<NoteId>,
    #[serde(default)]
    pub fields: BTreeMap<String, NoteField>,
    #[serde(rename = "mod", default)]
    pub mod_time: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteField {
    #[serde(default)]
    pub value: String,
}

impl NoteRecord {
    /// Value of the named field, empty if the field is absent.
    pub fn field_value(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Whether any field value contains the needle. Verification falls back
    /// to this when the record schema does not line up.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.fields.values().any(|f| f.value.contains(needle))
    }
}

/// Assembles submittable note payloads from card drafts.
///
/// Deck, model, field names, duplicate policy and tags are fixed at
/// construction; `build` only varies the card content. The back field is
/// composed in a fixed order: back text, then the image tag when media was
/// attached, then the source citation when a source is present.
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    deck: String,
    model: String,
    front_field: String,
    back_field: String,
    allow_duplicate: bool,
    tags: Vec<String>,
}

impl NoteBuilder {
    pub fn new(deck: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            deck: deck.into(),
            model: model.into(),
            front_field: "Front".to_string(),
            back_field: "Back".to_string(),
            allow_duplicate: false,
            tags: Vec::new(),
        }
    }

    pub fn with_fields(mut self, front: impl Into<String>, back: impl Into<String>) -> Self {
        self.front_field = front.into();
        self.back_field = back.into();
        self
    }

    pub fn with_allow_duplicate(mut self, allow: bool) -> Self {
        self.allow_duplicate = allow;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn front_field(&self) -> &str {
        &self.front_field
    }

    pub fn build(
        &self,
        front: &str,
        back: &str,
        source: Option<&str>,
        image_filename: Option<&str>,
    ) -> NotePayload {
        let mut fields = BTreeMap::new();
        fields.insert(self.front_field.clone(), front.to_string());
        fields.insert(
            self.back_field.clone(),
            compose_back(back, source, image_filename),
        );
        NotePayload {
            deck_name: self.deck.clone(),
            model_name: self.model.clone(),
            fields,
            options: NoteOptions {
                allow_duplicate: self.allow_duplicate,
            },
            tags: self.tags.clone(),
        }
    }
}

fn compose_back(back: &str, source: Option<&str>, image_filename: Option<&str>) -> String {
    let mut html = back.to_string();
    if let Some(name) = image_filename {
        html.push_str(&format!(
            r#"<br><img src="{}">"#,
            html_escape::encode_double_quoted_attribute(name)
        ));
    }
    if let Some(url) = source.map(str::trim).filter(|s| !s.is_empty()) {
        html.push_str(&format!(
            r#"<br><br>source: <a href="{}">{}</a>"#,
            html_escape::encode_double_quoted_attribute(url),
            html_escape::encode_text(url)
        ));
    }
    html
}
