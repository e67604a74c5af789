//! Video label detection: job submission and result paging

use async_trait::async_trait;
use reelscope_core::models::{DetectedLabel, VideoMetadata};
use reelscope_core::{JobName, NotificationChannel};

use crate::error::{ServiceError, ServiceResult};

/// Upper bound on result pages fetched for one job
pub const MAX_RESULT_PAGES: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDetectionJobRequest {
    pub bucket: String,
    pub object_name: String,
    /// Echoed back in the completion notification
    pub job_tag: JobName,
    pub channel: NotificationChannel,
}

/// One page of `GetLabelDetection` output
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelDetectionPage {
    pub labels: Vec<DetectedLabel>,
    pub video_metadata: Option<VideoMetadata>,
    pub next_token: Option<String>,
}

/// Every page of a finished job, concatenated
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelDetectionResults {
    pub labels: Vec<DetectedLabel>,
    /// Metadata reported by the last page
    pub video_metadata: Option<VideoMetadata>,
    pub pages: usize,
}

#[async_trait]
pub trait LabelDetectionService: Send + Sync {
    /// Submit the job and return the service's job id
    async fn start_job(&self, request: &LabelDetectionJobRequest) -> ServiceResult<String>;

    async fn get_results_page(
        &self,
        job_id: &str,
        next_token: Option<&str>,
    ) -> ServiceResult<LabelDetectionPage>;
}

/// Follow `next_token` until the service stops returning one
pub async fn collect_results(
    service: &dyn LabelDetectionService,
    job_id: &str,
    max_pages: usize,
) -> ServiceResult<LabelDetectionResults> {
    let mut results = LabelDetectionResults::default();
    let mut next_token: Option<String> = None;

    loop {
        if results.pages >= max_pages {
            return Err(ServiceError::UnexpectedResponse(format!(
                "label detection job {} returned more than {} result pages",
                job_id, max_pages
            )));
        }

        let page = service
            .get_results_page(job_id, next_token.as_deref())
            .await?;
        results.pages += 1;
        results.labels.extend(page.labels);
        if page.video_metadata.is_some() {
            results.video_metadata = page.video_metadata;
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(
        job_id = %job_id,
        pages = results.pages,
        label_count = results.labels.len(),
        "Collected label detection results"
    );
    Ok(results)
}

#[cfg(feature = "aws-rekognition")]
pub use aws::AwsLabelDetectionService;

#[cfg(feature = "aws-rekognition")]
mod aws {
    use super::*;
    use aws_sdk_rekognition::error::DisplayErrorContext;
    use aws_sdk_rekognition::types::{
        LabelDetectionSortBy, NotificationChannel as SnsChannel, S3Object, Video,
    };
    use aws_sdk_rekognition::Client as RekognitionClient;
    use reelscope_core::models::LabelInfo;

    /// Amazon Rekognition Video backed [`LabelDetectionService`]
    #[derive(Clone, Debug)]
    pub struct AwsLabelDetectionService {
        client: RekognitionClient,
    }

    impl AwsLabelDetectionService {
        pub fn new(client: RekognitionClient) -> Self {
            Self { client }
        }
    }

    fn to_video_metadata(metadata: &aws_sdk_rekognition::types::VideoMetadata) -> VideoMetadata {
        VideoMetadata {
            codec: metadata.codec().map(str::to_owned),
            duration_millis: metadata.duration_millis(),
            format: metadata.format().map(str::to_owned),
            frame_rate: metadata.frame_rate(),
            frame_height: metadata.frame_height(),
            frame_width: metadata.frame_width(),
            color_range: metadata.color_range().map(|range| range.as_str().to_owned()),
        }
    }

    #[async_trait]
    impl LabelDetectionService for AwsLabelDetectionService {
        async fn start_job(&self, request: &LabelDetectionJobRequest) -> ServiceResult<String> {
            let video = Video::builder()
                .s3_object(
                    S3Object::builder()
                        .bucket(&request.bucket)
                        .name(&request.object_name)
                        .build(),
                )
                .build();
            let channel = SnsChannel::builder()
                .sns_topic_arn(&request.channel.sns_topic_arn)
                .role_arn(&request.channel.role_arn)
                .build()
                .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;

            let output = self
                .client
                .start_label_detection()
                .video(video)
                .notification_channel(channel)
                .job_tag(request.job_tag.as_str())
                .send()
                .await
                .map_err(|e| ServiceError::LabelDetection(DisplayErrorContext(&e).to_string()))?;

            let job_id = output.job_id().map(str::to_owned).ok_or_else(|| {
                ServiceError::UnexpectedResponse("StartLabelDetection returned no job id".to_string())
            })?;

            tracing::info!(
                job_id = %job_id,
                job_tag = %request.job_tag,
                object_name = %request.object_name,
                "Label detection job started"
            );
            Ok(job_id)
        }

        async fn get_results_page(
            &self,
            job_id: &str,
            next_token: Option<&str>,
        ) -> ServiceResult<LabelDetectionPage> {
            let output = self
                .client
                .get_label_detection()
                .job_id(job_id)
                .sort_by(LabelDetectionSortBy::Timestamp)
                .set_next_token(next_token.map(str::to_owned))
                .send()
                .await
                .map_err(|e| ServiceError::LabelDetection(DisplayErrorContext(&e).to_string()))?;

            let labels = output
                .labels()
                .iter()
                .filter_map(|detection| {
                    let label = detection.label()?;
                    Some(DetectedLabel {
                        timestamp_ms: detection.timestamp(),
                        label: LabelInfo {
                            name: label.name().unwrap_or_default().to_string(),
                            confidence: label.confidence().unwrap_or(0.0),
                            parents: label
                                .parents()
                                .iter()
                                .filter_map(|parent| parent.name().map(str::to_owned))
                                .collect(),
                        },
                    })
                })
                .collect();

            Ok(LabelDetectionPage {
                labels,
                video_metadata: output.video_metadata().map(to_video_metadata),
                next_token: output.next_token().map(str::to_owned),
            })
        }
    }
}
