//! Speech-to-text job submission

use async_trait::async_trait;
use reelscope_core::JobName;

use crate::error::ServiceResult;

/// Parameters of one asynchronous transcription job
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJobRequest {
    pub job_name: JobName,
    /// `s3://bucket/key` of the media to transcribe
    pub media_uri: String,
    pub media_format: String,
    pub language_code: String,
    pub output_bucket: String,
    pub output_key: String,
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submit the job; completion is reported out of band
    async fn start_job(&self, request: &TranscriptionJobRequest) -> ServiceResult<()>;
}

#[cfg(feature = "aws-transcribe")]
pub use aws::AwsTranscriptionService;

#[cfg(feature = "aws-transcribe")]
mod aws {
    use super::*;
    use crate::error::ServiceError;
    use aws_sdk_transcribe::error::DisplayErrorContext;
    use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};
    use aws_sdk_transcribe::Client as TranscribeClient;

    /// Amazon Transcribe backed [`TranscriptionService`]
    #[derive(Clone, Debug)]
    pub struct AwsTranscriptionService {
        client: TranscribeClient,
    }

    impl AwsTranscriptionService {
        pub fn new(client: TranscribeClient) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl TranscriptionService for AwsTranscriptionService {
        async fn start_job(&self, request: &TranscriptionJobRequest) -> ServiceResult<()> {
            let media = Media::builder().media_file_uri(&request.media_uri).build();

            self.client
                .start_transcription_job()
                .transcription_job_name(request.job_name.as_str())
                .media(media)
                .media_format(MediaFormat::from(request.media_format.as_str()))
                .language_code(LanguageCode::from(request.language_code.as_str()))
                .output_bucket_name(&request.output_bucket)
                .output_key(&request.output_key)
                .send()
                .await
                .map_err(|e| ServiceError::Transcription(DisplayErrorContext(&e).to_string()))?;

            tracing::info!(
                transcription_job_name = %request.job_name,
                media_uri = %request.media_uri,
                output_key = %request.output_key,
                "Transcription job started"
            );
            Ok(())
        }
    }
}
