//! A deterministic mock `AiModel`, for tests that need to pin exact
//! extraction/classification/scoring behavior rather than exercise the
//! keyword rules in [`crate::RuleBasedAiModel`] (a queue-of-responses
//! builder, the same shape as a mock chat model or mock tool).

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{AiError, Result};
use crate::model::{AiModel, ClassificationRequest, ClassificationResponse, ExtractionRequest, ExtractionResponse, ScoreRequest, ScoreResponse};

/// A mock [`AiModel`] that returns pre-programmed responses in call order,
/// or a fixed canned response for every call of a given kind if only one
/// was configured. Useful for asserting exactly how many times each
/// method is called, and in what order.
#[derive(Default)]
pub struct MockAiModel {
    extract_responses: Mutex<Vec<Result<ExtractionResponse>>>,
    classify_responses: Mutex<Vec<Result<ClassificationResponse>>>,
    score_responses: Mutex<Vec<Result<ScoreResponse>>>,
    extract_calls: Mutex<usize>,
    classify_calls: Mutex<usize>,
    score_calls: Mutex<usize>,
}

impl MockAiModel {
    /// A mock with no responses queued; every call returns
    /// [`AiError::Unavailable`] until one is queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response returned by the next call to `extract`.
    pub fn with_extract_response(self, response: ExtractionResponse) -> Self {
        self.extract_responses.lock().push(Ok(response));
        self
    }

    /// Queue a response returned by the next call to `classify`.
    pub fn with_classify_response(self, response: ClassificationResponse) -> Self {
        self.classify_responses.lock().push(Ok(response));
        self
    }

    /// Queue a response returned by the next call to `score`.
    pub fn with_score_response(self, response: ScoreResponse) -> Self {
        self.score_responses.lock().push(Ok(response));
        self
    }

    /// Queue `extract` failing with [`AiError::Unavailable`], to exercise
    /// the rule-based fallback path.
    pub fn with_extract_failure(self, reason: impl Into<String>) -> Self {
        self.extract_responses.lock().push(Err(AiError::Unavailable(reason.into())));
        self
    }

    /// How many times `extract` has been called.
    pub fn extract_call_count(&self) -> usize {
        *self.extract_calls.lock()
    }
}

#[async_trait]
impl AiModel for MockAiModel {
    async fn extract(&self, _request: ExtractionRequest) -> Result<ExtractionResponse> {
        *self.extract_calls.lock() += 1;
        let mut queue = self.extract_responses.lock();
        if queue.is_empty() {
            return Err(AiError::Unavailable("no response queued".to_string()));
        }
        if queue.len() == 1 {
            return queue[0].clone();
        }
        queue.remove(0)
    }

    async fn classify(&self, _request: ClassificationRequest) -> Result<ClassificationResponse> {
        *self.classify_calls.lock() += 1;
        let mut queue = self.classify_responses.lock();
        if queue.is_empty() {
            return Err(AiError::Unavailable("no response queued".to_string()));
        }
        if queue.len() == 1 {
            return queue[0].clone();
        }
        queue.remove(0)
    }

    async fn score(&self, _request: ScoreRequest) -> Result<ScoreResponse> {
        *self.score_calls.lock() += 1;
        let mut queue = self.score_responses.lock();
        if queue.is_empty() {
            return Err(AiError::Unavailable("no response queued".to_string()));
        }
        if queue.len() == 1 {
            return queue[0].clone();
        }
        queue.remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFact;

    #[tokio::test]
    async fn unconfigured_mock_reports_unavailable() {
        let mock = MockAiModel::new();
        let result = mock.extract(ExtractionRequest { facts: vec![RawFact { source: "s".to_string(), text: "t".to_string(), event_date: None }] }).await;
        assert!(matches!(result, Err(AiError::Unavailable(_))));
    }

    #[tokio::test]
    async fn configured_response_is_returned_and_counted() {
        let mock = MockAiModel::new().with_extract_response(ExtractionResponse::default());
        mock.extract(ExtractionRequest { facts: vec![] }).await.unwrap();
        mock.extract(ExtractionRequest { facts: vec![] }).await.unwrap();
        assert_eq!(mock.extract_call_count(), 2);
    }
}
