use std::sync::Arc;

use thiserror::Error;

use crate::card::{Flashcard, GenerationRequest, MAX_CARDS, MIN_CARDS, MIN_SOURCE_CHARS};
use crate::decode::{DecodeError, decode_flashcards};
use crate::llm::prompt::build_user_prompt;

/// Everything that can end a generation attempt. Validation failures happen
/// before any provider call; the rest are terminal for the current request
/// and the user retries by re-submitting.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("source text is {length} characters; paste at least {MIN_SOURCE_CHARS} characters of study material")]
    SourceTooShort { length: usize },
    #[error("card count {requested} is out of range; choose between {MIN_CARDS} and {MAX_CARDS}")]
    CardCountOutOfRange { requested: u32 },
    #[error("flashcard generation request failed")]
    Provider(#[source] anyhow::Error),
    #[error("could not read flashcards from the model reply")]
    Decode(#[from] DecodeError),
}

impl GenerationError {
    /// True when the request never left the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GenerationError::SourceTooShort { .. } | GenerationError::CardCountOutOfRange { .. }
        )
    }
}

/// Seam over the text-generation provider: one prompt in, one raw reply out.
#[allow(async_fn_in_trait)]
pub trait CardSource {
    async fn raw_card_batch(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Composes prompt building, the provider call, and reply decoding into a
/// single linear attempt. No retry, no caching of prior requests.
pub struct GenerationPipeline<P: CardSource> {
    provider: Arc<P>,
}

impl<P: CardSource> GenerationPipeline<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Validate, then generate. Callers that already hold a validated
    /// [`GenerationRequest`] can go through [`Self::generate`] directly.
    pub async fn run(
        &self,
        source_text: &str,
        card_count: u32,
    ) -> Result<Vec<Flashcard>, GenerationError> {
        let request = GenerationRequest::new(source_text, card_count)?;
        self.generate(&request).await
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<Flashcard>, GenerationError> {
        let prompt = build_user_prompt(request.source_text(), request.card_count());
        let reply = self
            .provider
            .raw_card_batch(&prompt)
            .await
            .map_err(GenerationError::Provider)?;
        let cards = decode_flashcards(&reply)?;
        Ok(cards)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::anyhow;

    use super::CardSource;

    /// Queued canned replies in place of the network, plus a call counter so
    /// tests can assert that no request went out.
    #[derive(Default)]
    pub struct QueuedCardSource {
        replies: Mutex<VecDeque<anyhow::Result<String>>>,
        calls: Mutex<usize>,
    }

    impl QueuedCardSource {
        pub fn push_reply(&self, reply: impl Into<String>) {
            self.replies.lock().unwrap().push_back(Ok(reply.into()));
        }

        pub fn push_failure(&self, message: &str) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(anyhow!(message.to_string())));
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl CardSource for QueuedCardSource {
        async fn raw_card_batch(&self, _prompt: &str) -> anyhow::Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no queued reply")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::QueuedCardSource;
    use super::*;

    const PHOTOSYNTHESIS: &str = "Photosynthesis converts light energy into chemical energy \
                                  stored in glucose inside plant chloroplasts.";

    fn pipeline_with(source: Arc<QueuedCardSource>) -> GenerationPipeline<QueuedCardSource> {
        GenerationPipeline::new(source)
    }

    #[tokio::test]
    async fn returns_cards_in_reply_order() {
        let source = Arc::new(QueuedCardSource::default());
        source.push_reply(
            r#"[
                {"question": "What does photosynthesis produce?", "answer": "Glucose"},
                {"question": "Where does it occur?", "answer": "Chloroplasts"},
                {"question": "What drives it?", "answer": "Light energy"}
            ]"#,
        );

        let cards = pipeline_with(Arc::clone(&source))
            .run(PHOTOSYNTHESIS, 3)
            .await
            .unwrap();

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].answer, "Glucose");
        assert_eq!(cards[2].question, "What drives it?");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn fenced_reply_still_decodes() {
        let source = Arc::new(QueuedCardSource::default());
        source.push_reply("```json\n[{\"question\":\"Q\",\"answer\":\"A\"}]\n```");

        let cards = pipeline_with(source).run(PHOTOSYNTHESIS, 1).await.unwrap();
        assert_eq!(cards[0].question, "Q");
    }

    #[tokio::test]
    async fn short_source_text_makes_no_provider_call() {
        let source = Arc::new(QueuedCardSource::default());
        let err = pipeline_with(Arc::clone(&source))
            .run("too short to be study material", 3)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(matches!(err, GenerationError::SourceTooShort { .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_count_makes_no_provider_call() {
        let source = Arc::new(QueuedCardSource::default());
        let err = pipeline_with(Arc::clone(&source))
            .run(PHOTOSYNTHESIS, 500)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::CardCountOutOfRange { requested: 500 }
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced_without_retry() {
        let source = Arc::new(QueuedCardSource::default());
        source.push_failure("rate limited");

        let err = pipeline_with(Arc::clone(&source))
            .run(PHOTOSYNTHESIS, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Provider(_)));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_is_a_decode_failure() {
        let source = Arc::new(QueuedCardSource::default());
        source.push_reply("I'm sorry, I can't produce JSON today.");

        let err = pipeline_with(source).run(PHOTOSYNTHESIS, 3).await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn generated_batch_exports_to_csv_and_json() {
        use chrono::TimeZone;

        let source = Arc::new(QueuedCardSource::default());
        source.push_reply(
            r#"[
                {"question": "What does photosynthesis produce?", "answer": "Glucose"},
                {"question": "Where does it occur?", "answer": "Chloroplasts"},
                {"question": "What drives it?", "answer": "Light energy"}
            ]"#,
        );
        let cards = pipeline_with(source).run(PHOTOSYNTHESIS, 3).await.unwrap();

        let tmp = tempfile::TempDir::new().unwrap();
        let generated_at = chrono::Local.with_ymd_and_hms(2026, 8, 6, 9, 15, 0).unwrap();
        let paths = crate::export::save_cards(tmp.path(), &cards, generated_at).unwrap();

        // Header plus one row per card.
        let mut reader = csv::Reader::from_path(&paths.csv).unwrap();
        assert_eq!(reader.records().count(), 3);

        let reloaded: Vec<crate::card::Flashcard> =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(reloaded, cards);
    }

    #[tokio::test]
    async fn decoded_count_is_not_checked_against_the_request() {
        // Asking for 5 but getting 2 is accepted; the UI reports the real count.
        let source = Arc::new(QueuedCardSource::default());
        source.push_reply(
            r#"[{"question":"Q1","answer":"A1"},{"question":"Q2","answer":"A2"}]"#,
        );

        let cards = pipeline_with(source).run(PHOTOSYNTHESIS, 5).await.unwrap();
        assert_eq!(cards.len(), 2);
    }
}
