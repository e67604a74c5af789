//! Scriptable service doubles
//!
//! Each mock records the requests it receives and can be told to fail, so
//! handler tests can assert on exactly what would have reached AWS.

use async_trait::async_trait;
use reelscope_core::models::{SentimentAnalysis, SentimentScore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ServiceError, ServiceResult};
use crate::labels::{LabelDetectionJobRequest, LabelDetectionPage, LabelDetectionService};
use crate::sentiment::SentimentService;
use crate::transcription::{TranscriptionJobRequest, TranscriptionService};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct TranscriptionState {
    requests: Vec<TranscriptionJobRequest>,
    failure: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockTranscriptionService {
    state: Arc<Mutex<TranscriptionState>>,
}

impl MockTranscriptionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, message: impl Into<String>) {
        lock(&self.state).failure = Some(message.into());
    }

    pub fn requests(&self) -> Vec<TranscriptionJobRequest> {
        lock(&self.state).requests.clone()
    }
}

#[async_trait]
impl TranscriptionService for MockTranscriptionService {
    async fn start_job(&self, request: &TranscriptionJobRequest) -> ServiceResult<()> {
        let mut state = lock(&self.state);
        state.requests.push(request.clone());
        match &state.failure {
            Some(message) => Err(ServiceError::Transcription(message.clone())),
            None => Ok(()),
        }
    }
}

struct LabelState {
    job_id: String,
    starts: Vec<LabelDetectionJobRequest>,
    pages: VecDeque<LabelDetectionPage>,
    page_requests: Vec<(String, Option<String>)>,
    start_failure: Option<String>,
    results_failure: Option<String>,
}

#[derive(Clone)]
pub struct MockLabelDetectionService {
    state: Arc<Mutex<LabelState>>,
}

impl Default for MockLabelDetectionService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLabelDetectionService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LabelState {
                job_id: "mock-label-job".to_string(),
                starts: Vec::new(),
                pages: VecDeque::new(),
                page_requests: Vec::new(),
                start_failure: None,
                results_failure: None,
            })),
        }
    }

    /// Job id returned by `start_job`
    pub fn set_job_id(&self, job_id: impl Into<String>) {
        lock(&self.state).job_id = job_id.into();
    }

    /// Queue a results page; an empty queue yields a final empty page
    pub fn push_page(&self, page: LabelDetectionPage) {
        lock(&self.state).pages.push_back(page);
    }

    pub fn fail_start(&self, message: impl Into<String>) {
        lock(&self.state).start_failure = Some(message.into());
    }

    pub fn fail_results(&self, message: impl Into<String>) {
        lock(&self.state).results_failure = Some(message.into());
    }

    pub fn starts(&self) -> Vec<LabelDetectionJobRequest> {
        lock(&self.state).starts.clone()
    }

    pub fn page_requests(&self) -> Vec<(String, Option<String>)> {
        lock(&self.state).page_requests.clone()
    }
}

#[async_trait]
impl LabelDetectionService for MockLabelDetectionService {
    async fn start_job(&self, request: &LabelDetectionJobRequest) -> ServiceResult<String> {
        let mut state = lock(&self.state);
        state.starts.push(request.clone());
        match &state.start_failure {
            Some(message) => Err(ServiceError::LabelDetection(message.clone())),
            None => Ok(state.job_id.clone()),
        }
    }

    async fn get_results_page(
        &self,
        job_id: &str,
        next_token: Option<&str>,
    ) -> ServiceResult<LabelDetectionPage> {
        let mut state = lock(&self.state);
        state
            .page_requests
            .push((job_id.to_string(), next_token.map(str::to_owned)));
        if let Some(message) = &state.results_failure {
            return Err(ServiceError::LabelDetection(message.clone()));
        }
        Ok(state.pages.pop_front().unwrap_or_default())
    }
}

struct SentimentState {
    response: SentimentAnalysis,
    calls: Vec<(String, String)>,
    failure: Option<String>,
}

#[derive(Clone)]
pub struct MockSentimentService {
    state: Arc<Mutex<SentimentState>>,
}

impl Default for MockSentimentService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSentimentService {
    /// Answers `POSITIVE` until told otherwise
    pub fn new() -> Self {
        Self::with_response(SentimentAnalysis {
            sentiment: "POSITIVE".to_string(),
            sentiment_score: SentimentScore {
                positive: 0.9,
                negative: 0.02,
                neutral: 0.07,
                mixed: 0.01,
            },
        })
    }

    pub fn with_response(response: SentimentAnalysis) -> Self {
        Self {
            state: Arc::new(Mutex::new(SentimentState {
                response,
                calls: Vec::new(),
                failure: None,
            })),
        }
    }

    pub fn fail(&self, message: impl Into<String>) {
        lock(&self.state).failure = Some(message.into());
    }

    /// `(text, language_code)` of every call
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl SentimentService for MockSentimentService {
    async fn detect_sentiment(&self, text: &str, language_code: &str) -> ServiceResult<SentimentAnalysis> {
        let mut state = lock(&self.state);
        state
            .calls
            .push((text.to_string(), language_code.to_string()));
        match &state.failure {
            Some(message) => Err(ServiceError::Sentiment(message.clone())),
            None => Ok(state.response.clone()),
        }
    }
}
