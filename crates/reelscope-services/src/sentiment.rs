//! Document-level sentiment detection

use async_trait::async_trait;
use reelscope_core::models::SentimentAnalysis;

use crate::error::ServiceResult;

/// Largest UTF-8 document the sentiment service accepts
pub const MAX_SENTIMENT_TEXT_BYTES: usize = 5000;

#[async_trait]
pub trait SentimentService: Send + Sync {
    /// Callers keep `text` within [`MAX_SENTIMENT_TEXT_BYTES`]
    async fn detect_sentiment(&self, text: &str, language_code: &str) -> ServiceResult<SentimentAnalysis>;
}

/// Longest prefix of `text` within `max_bytes` that ends on a char boundary
pub fn truncate_to_limit(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(feature = "aws-comprehend")]
pub use aws::AwsSentimentService;

#[cfg(feature = "aws-comprehend")]
mod aws {
    use super::*;
    use crate::error::ServiceError;
    use aws_sdk_comprehend::error::DisplayErrorContext;
    use aws_sdk_comprehend::types::LanguageCode;
    use aws_sdk_comprehend::Client as ComprehendClient;
    use reelscope_core::models::SentimentScore;

    /// Amazon Comprehend backed [`SentimentService`]
    #[derive(Clone, Debug)]
    pub struct AwsSentimentService {
        client: ComprehendClient,
    }

    impl AwsSentimentService {
        pub fn new(client: ComprehendClient) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl SentimentService for AwsSentimentService {
        async fn detect_sentiment(&self, text: &str, language_code: &str) -> ServiceResult<SentimentAnalysis> {
            let output = self
                .client
                .detect_sentiment()
                .text(text)
                .language_code(LanguageCode::from(language_code))
                .send()
                .await
                .map_err(|e| ServiceError::Sentiment(DisplayErrorContext(&e).to_string()))?;

            let sentiment = output
                .sentiment()
                .map(|s| s.as_str().to_owned())
                .ok_or_else(|| {
                    ServiceError::UnexpectedResponse("DetectSentiment returned no sentiment".to_string())
                })?;
            let sentiment_score = output
                .sentiment_score()
                .map(|score| SentimentScore {
                    positive: score.positive().unwrap_or(0.0),
                    negative: score.negative().unwrap_or(0.0),
                    neutral: score.neutral().unwrap_or(0.0),
                    mixed: score.mixed().unwrap_or(0.0),
                })
                .unwrap_or_default();

            tracing::info!(sentiment = %sentiment, language_code = %language_code, "Sentiment detected");
            Ok(SentimentAnalysis {
                sentiment,
                sentiment_score,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_to_limit("hello", MAX_SENTIMENT_TEXT_BYTES), "hello");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        // 'é' is two bytes; a 3-byte limit must not split the second one
        assert_eq!(truncate_to_limit("éé", 3), "é");
        assert_eq!(truncate_to_limit("abcdef", 4), "abcd");

        let long = "ü".repeat(4000);
        let cut = truncate_to_limit(&long, MAX_SENTIMENT_TEXT_BYTES);
        assert_eq!(cut.len(), MAX_SENTIMENT_TEXT_BYTES);
        assert!(cut.chars().all(|c| c == 'ü'));
    }
}
