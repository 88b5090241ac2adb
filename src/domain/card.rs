// src/domain/card.rs
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{FACT_MAX_CHARS, FACT_MIN_CHARS};

/// A card waiting to be submitted: the two field texts plus optional
/// provenance (source URL) and an optional local image to attach.
///
/// The image path is runtime-only state; card files on disk never carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip)]
    pub image: Option<PathBuf>,
}

impl CardDraft {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            source: None,
            image: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Front text as used for duplicate comparison: surrounding whitespace
    /// ignored, case preserved.
    pub fn normalized_front(&self) -> &str {
        self.front.trim()
    }
}

/// One record from the plain-text fact inbox: the fact itself and an
/// optional source URL separated from it by `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    pub fact: String,
    pub source: Option<String>,
}

impl FactRecord {
    /// Parse a single blank-line-delimited inbox record.
    ///
    /// Splits on the first `|` into fact and source, trims both, and
    /// rejects facts outside the length bounds with a reason suitable for
    /// a skip warning.
    pub fn parse(chunk: &str) -> Result<Self, String> {
        let (fact_part, source_part) = match chunk.split_once('|') {
            Some((fact, source)) => (fact, Some(source)),
            None => (chunk, None),
        };
        let fact = fact_part.trim().to_string();
        let chars = fact.chars().count();
        if chars <= FACT_MIN_CHARS {
            return Err(format!("fact too short ({} chars)", chars));
        }
        if chars >= FACT_MAX_CHARS {
            return Err(format!("fact too long ({} chars)", chars));
        }
        let source = source_part
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Ok(Self { fact, source })
    }

    /// Source URL with a scheme guaranteed: bare hosts get `http://`
    /// prefixed so the citation link is clickable.
    pub fn normalized_source(&self) -> Option<String> {
        self.source.as_ref().map(|url| {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.clone()
            } else {
                format!("http://{}", url)
            }
        })
    }
}
