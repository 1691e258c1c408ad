//! Amazon S3 (and S3-compatible) object store.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl};
use aws_sdk_s3::Client;
use chrono::DateTime;
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::ObjectEntry;

/// Object store backed by the AWS SDK.
pub struct S3ObjectStore {
    client: Client,
    multipart_threshold: u64,
    part_size: u64,
}

impl S3ObjectStore {
    /// Wraps an existing client.
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            multipart_threshold: config.multipart_threshold_bytes,
            part_size: config.multipart_part_size_bytes.max(5 * 1024 * 1024),
        }
    }

    /// Builds a client from the environment credential chain plus overrides.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            info!("S3 endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if config.endpoint_url.is_some() {
            builder = builder.force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()), config)
    }

    async fn put_single(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        acl: Option<&str>,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::upload_failed(local_path, bucket, key, e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .set_acl(acl.map(ObjectCannedAcl::from))
            .send()
            .await
            .map_err(|e| {
                StorageError::upload_failed(local_path, bucket, key, DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn put_multipart(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        acl: Option<&str>,
    ) -> Result<(), StorageError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .set_acl(acl.map(ObjectCannedAcl::from))
            .send()
            .await
            .map_err(|e| {
                StorageError::upload_failed(local_path, bucket, key, DisplayErrorContext(&e).to_string())
            })?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| StorageError::upload_failed(local_path, bucket, key, "No upload ID"))?
            .to_string();

        let parts = match self.upload_parts(local_path, bucket, key, &upload_id).await {
            Ok(parts) => parts,
            Err(e) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(
                        "Failed to abort multipart upload {} for s3://{}/{}: {}",
                        upload_id,
                        bucket,
                        key,
                        DisplayErrorContext(&abort_err)
                    );
                }
                return Err(e);
            }
        };

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                StorageError::upload_failed(local_path, bucket, key, DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn upload_parts(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<Vec<CompletedPart>, StorageError> {
        let mut file = tokio::fs::File::open(local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;

        let chunk_size = self.part_size as usize;
        let mut buffer = vec![0u8; chunk_size];
        let mut completed_parts = Vec::new();
        let mut part_number = 1;

        loop {
            let mut n = 0;
            while n < chunk_size {
                let read = file
                    .read(&mut buffer[n..])
                    .await
                    .map_err(|e| StorageError::io(local_path, e))?;
                if read == 0 {
                    break;
                }
                n += read;
            }

            if n == 0 {
                break;
            }

            let part = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(buffer[..n].to_vec()))
                .send()
                .await
                .map_err(|e| {
                    StorageError::upload_failed(
                        local_path,
                        bucket,
                        key,
                        DisplayErrorContext(&e).to_string(),
                    )
                })?;

            debug!(part_number, bytes = n, "Uploaded part of s3://{}/{}", bucket, key);

            completed_parts.push(
                CompletedPart::builder()
                    .e_tag(part.e_tag().unwrap_or_default())
                    .part_number(part_number)
                    .build(),
            );

            part_number += 1;
        }

        Ok(completed_parts)
    }
}

/// One page of a listing and the token for the next one, if any.
struct ListPage {
    entries: Vec<ObjectEntry>,
    next_token: Option<String>,
}

/// Fetch pages until one comes back without a continuation token.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<ObjectEntry>, StorageError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListPage, StorageError>>,
{
    let mut entries = Vec::new();
    let mut token = None;

    loop {
        let page = fetch(token.take()).await?;
        entries.extend(page.entries);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(entries)
}

fn object_entry(object: aws_sdk_s3::types::Object) -> Option<ObjectEntry> {
    let key = object.key?;
    Some(ObjectEntry {
        key,
        size: object.size.and_then(|s| u64::try_from(s).ok()),
        last_modified: object
            .last_modified
            .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos())),
    })
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let entries = collect_pages(|token| async move {
            let res = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(token)
                .send()
                .await
                .map_err(|e| StorageError::ListFailed {
                    bucket: bucket.to_string(),
                    prefix: prefix.to_string(),
                    reason: DisplayErrorContext(&e).to_string(),
                })?;

            let truncated = res.is_truncated.unwrap_or(false);
            Ok(ListPage {
                entries: res
                    .contents
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(object_entry)
                    .collect(),
                next_token: res.next_continuation_token.filter(|_| truncated),
            })
        })
        .await?;

        debug!("Listed {} objects under s3://{}/{}", entries.len(), bucket, prefix);
        Ok(entries)
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<u64, StorageError> {
        let res = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StorageError::download_failed(bucket, key, DisplayErrorContext(&e).to_string())
                }
            })?;

        let mut file = tokio::fs::File::create(local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;

        let mut body = res.body;
        let mut total = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| StorageError::download_failed(bucket, key, e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| StorageError::io(local_path, e))?;
            total += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| StorageError::io(local_path, e))?;

        Ok(total)
    }

    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        acl: Option<&str>,
    ) -> Result<u64, StorageError> {
        let size = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?
            .len();

        if size > self.multipart_threshold {
            debug!(size, "Using multipart upload for s3://{}/{}", bucket, key);
            self.put_multipart(local_path, bucket, key, acl).await?;
        } else {
            self.put_single(local_path, bucket, key, acl).await?;
        }

        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::ready;

    fn entry(key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            size: Some(10),
            last_modified: None,
        }
    }

    fn page(keys: &[&str], next_token: Option<&str>) -> ListPage {
        ListPage {
            entries: keys.iter().map(|k| entry(k)).collect(),
            next_token: next_token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_collect_pages_follows_tokens() {
        let mut pages = VecDeque::from(vec![
            page(&["in/a.las", "in/b.las"], Some("t1")),
            page(&["in/c.laz"], Some("t2")),
            page(&["in/d.las"], None),
        ]);
        let mut tokens = Vec::new();

        let entries = collect_pages(|token| {
            tokens.push(token);
            ready(pages.pop_front().ok_or_else(|| StorageError::ListFailed {
                bucket: "raw".to_string(),
                prefix: "in/".to_string(),
                reason: "fetched past the last page".to_string(),
            }))
        })
        .await
        .unwrap();

        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["in/a.las", "in/b.las", "in/c.laz", "in/d.las"]);
        assert_eq!(
            tokens,
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_collect_pages_single_page() {
        let mut calls = 0;
        let entries = collect_pages(|_| {
            calls += 1;
            ready(Ok(page(&["in/a.las"], None)))
        })
        .await
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_error() {
        let mut calls = 0;
        let result = collect_pages(|token| {
            calls += 1;
            ready(match token {
                None => Ok(page(&["in/a.las"], Some("t1"))),
                Some(_) => Err(StorageError::ListFailed {
                    bucket: "raw".to_string(),
                    prefix: "in/".to_string(),
                    reason: "throttled".to_string(),
                }),
            })
        })
        .await;

        assert!(matches!(result, Err(StorageError::ListFailed { .. })));
        assert_eq!(calls, 2);
    }
}
