use serde::{Deserialize, Serialize};

use crate::pipeline::GenerationError;

pub const MIN_SOURCE_CHARS: usize = 50;
pub const MIN_CARDS: u32 = 1;
pub const MAX_CARDS: u32 = 200;

/// One question/answer pair. Batch order is display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A validated generation request. Construct through [`GenerationRequest::new`];
/// once built it is consumed by a single pipeline run and discarded.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    source_text: String,
    card_count: u32,
}

impl GenerationRequest {
    pub fn new(source_text: impl Into<String>, card_count: u32) -> Result<Self, GenerationError> {
        let source_text = source_text.into();
        let length = source_text.trim().chars().count();
        if length < MIN_SOURCE_CHARS {
            return Err(GenerationError::SourceTooShort { length });
        }
        if !(MIN_CARDS..=MAX_CARDS).contains(&card_count) {
            return Err(GenerationError::CardCountOutOfRange {
                requested: card_count,
            });
        }
        Ok(Self {
            source_text,
            card_count,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn card_count(&self) -> u32 {
        self.card_count
    }
}
