//! Reelscope managed-service layer
//!
//! Trait seams for the three AWS analysis services the pipeline drives, with
//! AWS SDK implementations behind features. Handlers only see the traits.

pub mod error;
pub mod labels;
pub mod sentiment;
pub mod transcription;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{ServiceError, ServiceResult};
pub use labels::{
    collect_results, LabelDetectionJobRequest, LabelDetectionPage, LabelDetectionResults,
    LabelDetectionService, MAX_RESULT_PAGES,
};
pub use sentiment::{truncate_to_limit, SentimentService, MAX_SENTIMENT_TEXT_BYTES};
pub use transcription::{TranscriptionJobRequest, TranscriptionService};

#[cfg(feature = "aws-rekognition")]
pub use labels::AwsLabelDetectionService;
#[cfg(feature = "aws-comprehend")]
pub use sentiment::AwsSentimentService;
#[cfg(feature = "aws-transcribe")]
pub use transcription::AwsTranscriptionService;
