pub mod batch;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod metrics;
pub mod storage;
pub mod testing;

pub use batch::{
    BatchConfig, BatchDriver, BatchError, BatchOperationsEvent, BatchOperationsResponse,
    BatchSummary, DirectEvent, DirectEventResponse, ItemError, ResultCode, ResultRecord, WorkItem,
};
pub use config::{
    load_config, load_config_from_str, resolve_config_path, validate_config, Config, ConfigError,
};
pub use conversion::{ConversionError, ConversionReport, FileConverter};
pub use engine::{Engine, EngineConfig, EngineError, EngineInfo, JobSubmission, PdalEngine};
pub use storage::{ObjectStore, PrefixLocation, S3ObjectStore, StorageConfig, StorageError};
