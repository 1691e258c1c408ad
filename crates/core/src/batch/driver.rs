//! Drivers that turn remote objects into work items and process them.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::conversion::naming::{
    default_output_name, is_point_cloud, join_key, key_file_name, mirrored_key,
};
use crate::conversion::{self, ConversionReport, FileConverter};
use crate::engine::Engine;
use crate::metrics;
use crate::storage::{ObjectLocation, ObjectStore, PrefixLocation, BUCKET_OWNER_FULL_CONTROL};

use super::config::BatchConfig;
use super::error::{BatchError, ItemError};
use super::events::{
    BatchOperationsEvent, BatchOperationsResponse, BatchTask, DirectEvent, DirectEventResponse,
    TaskResult,
};
use super::staging::StagingArea;
use super::types::{BatchSummary, ResultCode, ResultRecord, WorkItem};

/// Runs work items through download, convert and upload.
///
/// One driver serves all three remote variants: a listing run over the
/// source prefix, a batch operations event and a direct event.
pub struct BatchDriver<S: ObjectStore, E: Engine> {
    store: Arc<S>,
    converter: FileConverter<E>,
    destination: PrefixLocation,
    source: Option<PrefixLocation>,
    acl: Option<String>,
    config: BatchConfig,
}

impl<S: ObjectStore, E: Engine> BatchDriver<S, E> {
    /// Creates a driver publishing under `destination`.
    pub fn new(
        store: Arc<S>,
        converter: FileConverter<E>,
        destination: PrefixLocation,
        config: BatchConfig,
    ) -> Self {
        Self {
            store,
            converter,
            destination,
            source: None,
            acl: None,
            config,
        }
    }

    /// Sets the bucket and prefix enumerated by [`run_listing`](Self::run_listing).
    pub fn with_source(mut self, source: PrefixLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the canned ACL applied to uploads.
    pub fn with_acl(mut self, acl: Option<String>) -> Self {
        self.acl = acl;
        self
    }

    /// Downloads, converts and uploads one item inside its own staging area.
    ///
    /// The staging directory is removed whichever way this returns.
    pub async fn process_item(
        &self,
        item: &WorkItem,
        acl: Option<&str>,
    ) -> Result<ConversionReport, ItemError> {
        let file_name = key_file_name(&item.source.key);
        if file_name.is_empty() {
            return Err(ItemError::InvalidItem(format!(
                "object key {} has no file name",
                item.source.key
            )));
        }

        let staging = StagingArea::create(&self.config.staging_dir).await?;
        let input = staging.path().join(file_name);
        let output = staging.path().join(default_output_name(file_name));

        info!("Downloading {} to {}", item.source, input.display());
        let downloaded = self
            .store
            .download(&item.source.bucket, &item.source.key, &input)
            .await?;
        metrics::record_transfer("download", downloaded);

        let report = match self.converter.run(&input, Some(&output)).await {
            Ok(report) => report,
            Err(e) => {
                conversion::log_failure(&e);
                return Err(e.into());
            }
        };
        if let Some(count) = report.point_count {
            info!("Processed {} points. COPC output: {}", count, output.display());
        }
        info!("Output file size: {:.2} MB", report.output_size_mb());

        info!("Uploading {} to {}", output.display(), item.destination);
        let uploaded = self
            .store
            .upload(
                &output,
                &item.destination.bucket,
                &item.destination.key,
                acl,
            )
            .await?;
        metrics::record_transfer("upload", uploaded);

        Ok(report)
    }

    /// Processes one item and folds the outcome into a result record.
    async fn run_item(&self, item: &WorkItem, acl: Option<&str>) -> ResultRecord {
        let record = match self.process_item(item, acl).await {
            Ok(_) => {
                let message = format!(
                    "Successfully copied converted file {} from object {}.",
                    item.destination.key, item.source.key
                );
                info!("{}", message);
                ResultRecord::succeeded(&item.id, message)
            }
            Err(e) => {
                let code = e.result_code();
                error!(item = %item.id, code = %code, "{}", e);
                ResultRecord::failed(&item.id, code, e.to_string())
            }
        };
        metrics::record_item(record.code.as_str());
        record
    }

    /// Enumerates the source prefix and converts every LAS/LAZ object.
    ///
    /// Folder markers are skipped silently. Other non-point-cloud keys are
    /// recorded as permanent failures without being downloaded. A failing
    /// item never stops the run.
    pub async fn run_listing(&self) -> Result<BatchSummary, BatchError> {
        let source = self.source.as_ref().ok_or(BatchError::SourceNotConfigured)?;

        let entries = self.store.list(&source.bucket, &source.prefix).await?;
        info!(
            "Found {} objects under s3://{}/{}",
            entries.len(),
            source.bucket,
            source.prefix
        );

        let mut summary = BatchSummary::new();
        for entry in entries {
            if entry.is_folder_marker(&source.prefix) {
                debug!("Skipping folder marker {}", entry.key);
                continue;
            }

            info!("{}", entry.key);
            let record = if is_point_cloud(Path::new(&entry.key)) {
                let output_name = default_output_name(key_file_name(&entry.key));
                let item = WorkItem::new(
                    entry.key.clone(),
                    ObjectLocation::new(&source.bucket, &entry.key),
                    ObjectLocation::new(
                        &self.destination.bucket,
                        join_key(&self.destination.prefix, &output_name),
                    ),
                );
                self.run_item(&item, self.acl.as_deref()).await
            } else {
                warn!("Skipping {}: not a .las or .laz object", entry.key);
                let record = ResultRecord::failed(
                    &entry.key,
                    ResultCode::PermanentFailure,
                    format!("Input file must be .las or .laz format: {}", entry.key),
                );
                metrics::record_item(record.code.as_str());
                record
            };
            summary.push(record);
        }
        summary.finish();

        info!("Completed conversions: {}", summary.succeeded);
        if summary.failed > 0 {
            warn!("Failed conversions: {}", summary.failed);
        }
        Ok(summary)
    }

    /// Handles every task of a batch operations invocation.
    ///
    /// Exactly one result is returned per task, in task order. Outputs mirror
    /// the source folder under the destination prefix.
    pub async fn handle_batch_event(&self, event: BatchOperationsEvent) -> BatchOperationsResponse {
        info!(
            invocation_id = %event.invocation_id,
            schema = %event.invocation_schema_version,
            "Received batch operations event with {} task(s)",
            event.tasks.len()
        );

        let acl = self.acl.as_deref().unwrap_or(BUCKET_OWNER_FULL_CONTROL);
        let mut results = Vec::with_capacity(event.tasks.len());

        for task in &event.tasks {
            let record = match self.task_work_item(task) {
                Ok(item) => self.run_item(&item, Some(acl)).await,
                Err(e) => {
                    error!(task_id = %task.task_id, "{}", e);
                    metrics::record_item(e.result_code().as_str());
                    ResultRecord::failed(&task.task_id, e.result_code(), e.to_string())
                }
            };
            results.push(TaskResult::from(record));
        }

        BatchOperationsResponse {
            invocation_schema_version: event.invocation_schema_version,
            treat_missing_keys_as: ResultCode::PermanentFailure,
            invocation_id: event.invocation_id,
            results,
        }
    }

    fn task_work_item(&self, task: &BatchTask) -> Result<WorkItem, ItemError> {
        let bucket = task.bucket_name().ok_or_else(|| {
            ItemError::InvalidItem(format!("task {} names no bucket", task.task_id))
        })?;
        let key = task.decoded_key().map_err(|e| {
            ItemError::InvalidItem(format!("task {} has an undecodable key: {}", task.task_id, e))
        })?;

        let output_name = default_output_name(key_file_name(&key));
        let relative = mirrored_key(&key, &output_name, self.config.trim_leading_folder);
        let destination_key = join_key(&self.destination.prefix, &relative);

        Ok(WorkItem::new(
            task.task_id.clone(),
            ObjectLocation::new(bucket, key),
            ObjectLocation::new(&self.destination.bucket, destination_key),
        ))
    }

    /// Converts the single object named by a direct event.
    pub async fn handle_direct_event(&self, event: DirectEvent) -> DirectEventResponse {
        info!(
            "Received direct event for s3://{}/{}",
            event.source_bucket, event.source_object
        );

        let engine_version = match self.converter.engine().validate().await {
            Ok(info) => info.version,
            Err(e) => {
                warn!("Could not determine engine version: {}", e);
                "unavailable".to_string()
            }
        };

        let output_name = default_output_name(key_file_name(&event.source_object));
        let item = WorkItem::new(
            event.source_object.clone(),
            ObjectLocation::new(&event.source_bucket, &event.source_object),
            ObjectLocation::new(
                &self.destination.bucket,
                join_key(&self.destination.prefix, &output_name),
            ),
        );
        let record = self.run_item(&item, self.acl.as_deref()).await;
        let conversion = record.code.is_success();

        DirectEventResponse {
            engine_version,
            runtime_version: runtime_version(),
            source_bucket: event.source_bucket,
            source_object: event.source_object,
            conversion,
            error: (!conversion).then_some(record.message),
        }
    }
}

fn runtime_version() -> String {
    format!(
        "copcify {} ({}-{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
