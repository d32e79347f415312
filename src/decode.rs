use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::card::Flashcard;

/// Why a model reply could not be turned into a flashcard batch. A single bad
/// element rejects the whole batch; there is no partial acceptance.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("the model returned an empty reply")]
    EmptyReply,
    #[error("the model reply is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
    #[error("expected a JSON array of cards, got {found}")]
    NotAnArray { found: &'static str, raw: String },
    #[error("the model returned an empty card array")]
    EmptyBatch,
    #[error("card {index} is missing a non-empty question and answer")]
    IncompleteCard { index: usize },
}

impl DecodeError {
    /// The offending reply text, where one was captured.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            DecodeError::InvalidJson { raw, .. } | DecodeError::NotAnArray { raw, .. } => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCard {
    question: String,
    answer: String,
}

/// Decode a raw model reply into an ordered flashcard batch.
pub fn decode_flashcards(raw: &str) -> Result<Vec<Flashcard>, DecodeError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(DecodeError::EmptyReply);
    }

    let value: Value = serde_json::from_str(text).map_err(|source| DecodeError::InvalidJson {
        source,
        raw: text.to_string(),
    })?;

    let Value::Array(elements) = value else {
        return Err(DecodeError::NotAnArray {
            found: json_type_name(&value),
            raw: text.to_string(),
        });
    };
    if elements.is_empty() {
        return Err(DecodeError::EmptyBatch);
    }

    let mut cards = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        let raw_card: RawCard = serde_json::from_value(element)
            .map_err(|_| DecodeError::IncompleteCard { index })?;
        let question = raw_card.question.trim();
        let answer = raw_card.answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(DecodeError::IncompleteCard { index });
        }
        cards.push(Flashcard {
            question: question.to_string(),
            answer: answer.to_string(),
        });
    }

    Ok(cards)
}

/// Strip an outer Markdown code fence that some models wrap around JSON even
/// when told not to. A leading run of backticks opens the fence, an optional
/// `json` tag directly after it is dropped, and a missing closing fence is
/// tolerated. Unfenced input comes back trimmed and otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let mut inner = trimmed.trim_start_matches('`');
    if let Some(rest) = inner.strip_prefix("json") {
        inner = rest;
    }
    if let Some(end) = inner.find("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = r#"[{"question":"Q","answer":"A"}]"#;

    #[test]
    fn strips_fence_with_language_tag() {
        let fenced = "```json\n[{\"question\":\"Q\",\"answer\":\"A\"}]\n```";
        assert_eq!(strip_code_fence(fenced), PLAIN);
    }

    #[test]
    fn strips_fence_without_language_tag() {
        let fenced = "```\n[{\"question\":\"Q\",\"answer\":\"A\"}]\n```";
        assert_eq!(strip_code_fence(fenced), PLAIN);
    }

    #[test]
    fn tolerates_missing_closing_fence() {
        let fenced = "```json\n[{\"question\":\"Q\",\"answer\":\"A\"}]";
        assert_eq!(strip_code_fence(fenced), PLAIN);
    }

    #[test]
    fn unfenced_input_is_only_trimmed() {
        assert_eq!(strip_code_fence(&format!("  {PLAIN}\n")), PLAIN);
    }

    #[test]
    fn fenced_and_unfenced_decode_identically() {
        let fenced = "```json\n[{\"question\":\"Q\",\"answer\":\"A\"}]\n```";
        assert_eq!(
            decode_flashcards(fenced).unwrap(),
            decode_flashcards(PLAIN).unwrap()
        );
    }

    #[test]
    fn decodes_batch_in_reply_order() {
        let raw = r#"[
            {"question": "First?", "answer": "1"},
            {"question": "Second?", "answer": "2"},
            {"question": "Third?", "answer": "3"}
        ]"#;
        let cards = decode_flashcards(raw).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].question, "First?");
        assert_eq!(cards[2].answer, "3");
    }

    #[test]
    fn empty_or_whitespace_reply_fails() {
        assert!(matches!(decode_flashcards(""), Err(DecodeError::EmptyReply)));
        assert!(matches!(
            decode_flashcards("   \n\t"),
            Err(DecodeError::EmptyReply)
        ));
        // A fence with nothing inside is still an empty reply.
        assert!(matches!(
            decode_flashcards("```json\n```"),
            Err(DecodeError::EmptyReply)
        ));
    }

    #[test]
    fn truncated_array_is_invalid_json_not_partial() {
        let raw = r#"[{"question":"Q","answer":"A"},{"question":"half"#;
        match decode_flashcards(raw) {
            Err(DecodeError::InvalidJson { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn trailing_comma_is_invalid_json() {
        let raw = r#"[{"question":"Q","answer":"A"},]"#;
        assert!(matches!(
            decode_flashcards(raw),
            Err(DecodeError::InvalidJson { .. })
        ));
    }

    #[test]
    fn non_array_json_is_rejected_with_type_name() {
        match decode_flashcards(r#"{"question":"Q","answer":"A"}"#) {
            Err(DecodeError::NotAnArray { found, .. }) => assert_eq!(found, "an object"),
            other => panic!("expected NotAnArray, got {other:?}"),
        }
        assert!(matches!(
            decode_flashcards("42"),
            Err(DecodeError::NotAnArray { found: "a number", .. })
        ));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(
            decode_flashcards("[]"),
            Err(DecodeError::EmptyBatch)
        ));
    }

    #[test]
    fn element_with_missing_or_blank_field_rejects_the_batch() {
        let missing = r#"[{"question":"Q","answer":"A"},{"question":"Q2"}]"#;
        assert!(matches!(
            decode_flashcards(missing),
            Err(DecodeError::IncompleteCard { index: 1 })
        ));

        let blank = r#"[{"question":"  ","answer":"A"}]"#;
        assert!(matches!(
            decode_flashcards(blank),
            Err(DecodeError::IncompleteCard { index: 0 })
        ));

        let wrong_type = r#"[{"question":"Q","answer":7}]"#;
        assert!(matches!(
            decode_flashcards(wrong_type),
            Err(DecodeError::IncompleteCard { index: 0 })
        ));
    }

    #[test]
    fn card_fields_are_trimmed() {
        let raw = r#"[{"question":"  What?  ","answer":"\nBecause.\n"}]"#;
        let cards = decode_flashcards(raw).unwrap();
        assert_eq!(cards[0].question, "What?");
        assert_eq!(cards[0].answer, "Because.");
    }

    #[test]
    fn round_trips_through_pretty_json() {
        let cards = vec![
            Flashcard {
                question: "What is photosynthesis?".into(),
                answer: "Light-driven carbon fixation.".into(),
            },
            Flashcard {
                question: "Where does it happen?".into(),
                answer: "In the chloroplast.".into(),
            },
        ];
        let json = serde_json::to_string_pretty(&cards).unwrap();
        assert_eq!(decode_flashcards(&json).unwrap(), cards);
    }
}
