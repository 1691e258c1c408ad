//! Event payloads for the event-driven variants.
//!
//! [`BatchOperationsEvent`] is the S3 Batch Operations invocation (schema
//! 1.0 and 2.0). [`DirectEvent`] names a single object directly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{ResultCode, ResultRecord};

/// An S3 Batch Operations invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperationsEvent {
    pub invocation_id: String,
    pub invocation_schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<BatchJob>,
    pub tasks: Vec<BatchTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_arguments: Option<HashMap<String, String>>,
}

/// One object named by a batch operations event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub task_id: String,
    /// Schema 1.0 carries the bucket ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket_arn: Option<String>,
    /// Schema 2.0 carries the bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
    /// URL-encoded object key.
    pub s3_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_version_id: Option<String>,
}

impl BatchTask {
    /// Bucket name, from either schema.
    pub fn bucket_name(&self) -> Option<&str> {
        if let Some(bucket) = self.s3_bucket.as_deref().filter(|b| !b.is_empty()) {
            return Some(bucket);
        }
        self.s3_bucket_arn
            .as_deref()
            .map(|arn| arn.rsplit_once(":::").map(|(_, name)| name).unwrap_or(arn))
            .filter(|b| !b.is_empty())
    }

    /// Object key with URL encoding removed (`+` is a space).
    pub fn decoded_key(&self) -> Result<String, std::string::FromUtf8Error> {
        let plus_decoded = self.s3_key.replace('+', " ");
        urlencoding::decode(&plus_decoded).map(|key| key.into_owned())
    }
}

/// Response returned for a batch operations invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperationsResponse {
    pub invocation_schema_version: String,
    pub treat_missing_keys_as: ResultCode,
    pub invocation_id: String,
    pub results: Vec<TaskResult>,
}

/// Per-task entry of [`BatchOperationsResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,
    pub result_code: ResultCode,
    pub result_string: String,
}

impl From<ResultRecord> for TaskResult {
    fn from(record: ResultRecord) -> Self {
        Self {
            task_id: record.id,
            result_code: record.code,
            result_string: record.message,
        }
    }
}

/// A single object named directly by the invoker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectEvent {
    #[serde(rename = "S3_SOURCE_BUCKET", alias = "source_bucket")]
    pub source_bucket: String,
    #[serde(rename = "S3_SOURCE_OBJECT", alias = "source_object")]
    pub source_object: String,
}

/// Response for a [`DirectEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectEventResponse {
    #[serde(rename = "PDAL VERSION")]
    pub engine_version: String,
    #[serde(rename = "SYS VERSION")]
    pub runtime_version: String,
    #[serde(rename = "S3 SOURCE BUCKET")]
    pub source_bucket: String,
    #[serde(rename = "S3 SOURCE OBJECT")]
    pub source_object: String,
    #[serde(rename = "CONVERSION")]
    pub conversion: bool,
    #[serde(rename = "ERROR", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_1_event() {
        let json = r#"{
            "invocationSchemaVersion": "1.0",
            "invocationId": "inv-1",
            "job": {"id": "job-1"},
            "tasks": [{
                "taskId": "T1",
                "s3Key": "site/a.laz",
                "s3VersionId": null,
                "s3BucketArn": "arn:aws:s3:::raw"
            }]
        }"#;

        let event: BatchOperationsEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.invocation_id, "inv-1");
        assert_eq!(event.tasks.len(), 1);
        assert_eq!(event.tasks[0].bucket_name(), Some("raw"));
        assert_eq!(event.tasks[0].decoded_key().unwrap(), "site/a.laz");
    }

    #[test]
    fn test_parse_schema_2_event() {
        let json = r#"{
            "invocationSchemaVersion": "2.0",
            "invocationId": "inv-2",
            "job": {"id": "job-2", "userArguments": {"k": "v"}},
            "tasks": [{
                "taskId": "T9",
                "s3Bucket": "raw",
                "s3Key": "site/my+tile%281%29.las"
            }]
        }"#;

        let event: BatchOperationsEvent = serde_json::from_str(json).unwrap();
        let task = &event.tasks[0];
        assert_eq!(task.bucket_name(), Some("raw"));
        assert_eq!(task.decoded_key().unwrap(), "site/my tile(1).las");
    }

    #[test]
    fn test_task_without_bucket() {
        let task = BatchTask {
            task_id: "T1".to_string(),
            s3_bucket_arn: None,
            s3_bucket: None,
            s3_key: "a.laz".to_string(),
            s3_version_id: None,
        };
        assert_eq!(task.bucket_name(), None);
    }

    #[test]
    fn test_response_shape() {
        let response = BatchOperationsResponse {
            invocation_schema_version: "1.0".to_string(),
            treat_missing_keys_as: ResultCode::PermanentFailure,
            invocation_id: "inv-1".to_string(),
            results: vec![TaskResult::from(ResultRecord::succeeded("T1", "done"))],
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["treatMissingKeysAs"], "PermanentFailure");
        assert_eq!(value["invocationId"], "inv-1");
        assert_eq!(value["results"][0]["taskId"], "T1");
        assert_eq!(value["results"][0]["resultCode"], "Succeeded");
        assert_eq!(value["results"][0]["resultString"], "done");
    }

    #[test]
    fn test_direct_event_keys() {
        let event: DirectEvent =
            serde_json::from_str(r#"{"S3_SOURCE_BUCKET": "raw", "S3_SOURCE_OBJECT": "a.laz"}"#)
                .unwrap();
        assert_eq!(event.source_bucket, "raw");
        assert_eq!(event.source_object, "a.laz");

        let response = DirectEventResponse {
            engine_version: "2.6.3".to_string(),
            runtime_version: "test".to_string(),
            source_bucket: event.source_bucket,
            source_object: event.source_object,
            conversion: true,
            error: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["PDAL VERSION"], "2.6.3");
        assert_eq!(value["CONVERSION"], true);
        assert!(value.get("ERROR").is_none());
    }
}
