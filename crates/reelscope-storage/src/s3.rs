use crate::keys::validate_key;
use crate::traits::{Storage, StorageBackend, StorageError, StorageProvider, StorageResult};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// S3 storage implementation bound to one bucket
#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Several instances (input, output, transcript buckets) can share one
    /// client; cloning an SDK client is cheap.
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        S3Storage {
            client,
            bucket: bucket.into(),
        }
    }

    /// Map an SDK failure to a storage error, recognising missing keys and buckets
    fn classify<E, R>(
        &self,
        key: &str,
        err: SdkError<E, R>,
        fallback: fn(String) -> StorageError,
    ) -> StorageError
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
        R: Debug,
    {
        let code = err
            .as_service_error()
            .and_then(|service_err| service_err.code())
            .map(str::to_owned);

        match code.as_deref() {
            Some("NoSuchBucket") => StorageError::BucketNotFound(self.bucket.clone()),
            Some("NoSuchKey") | Some("NotFound") => StorageError::NotFound(key.to_string()),
            _ => fallback(DisplayErrorContext(&err).to_string()),
        }
    }
}

/// Resolves bucket names to [`S3Storage`] instances sharing one client
#[derive(Clone)]
pub struct S3StorageProvider {
    client: S3Client,
}

impl S3StorageProvider {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

impl StorageProvider for S3StorageProvider {
    fn bucket(&self, name: &str) -> Arc<dyn Storage> {
        Arc::new(S3Storage::new(self.client.clone(), name))
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| {
            let err = self.classify(key, e, StorageError::UploadFailed);
            tracing::error!(
                error = %err,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            err
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err = self.classify(key, e, StorageError::DownloadFailed);
                if !err.is_not_found() {
                    tracing::error!(
                        error = %err,
                        bucket = %self.bucket,
                        key = %key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 download failed"
                    );
                }
                err
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes();

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn list_folder(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let start = std::time::Instant::now();
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| self.classify(prefix, e, StorageError::ListFailed))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            object_count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(keys)
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "Generated presigned upload URL"
        );

        Ok(request.uri().to_string())
    }
}
