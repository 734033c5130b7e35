//! # Provider Types
//!
//! Provider-neutral views of the managed Flink application. The AWS client translates to and
//! from SDK shapes; everything above the provider layer only sees these.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Application status as reported by `describe`
///
/// Statuses the handlers do not know about are kept verbatim in `Other` so they can be
/// reported back to the operator unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Deleting,
    Starting,
    Stopping,
    Ready,
    Running,
    Updating,
    Autoscaling,
    ForceStopping,
    RollingBack,
    RolledBack,
    Maintenance,
    Other(String),
}

impl ApplicationStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Deleting => "DELETING",
            Self::Starting => "STARTING",
            Self::Stopping => "STOPPING",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Updating => "UPDATING",
            Self::Autoscaling => "AUTOSCALING",
            Self::ForceStopping => "FORCE_STOPPING",
            Self::RollingBack => "ROLLING_BACK",
            Self::RolledBack => "ROLLED_BACK",
            Self::Maintenance => "MAINTENANCE",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for ApplicationStatus {
    fn from(value: &str) -> Self {
        match value {
            "DELETING" => Self::Deleting,
            "STARTING" => Self::Starting,
            "STOPPING" => Self::Stopping,
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "UPDATING" => Self::Updating,
            "AUTOSCALING" => Self::Autoscaling,
            "FORCE_STOPPING" => Self::ForceStopping,
            "ROLLING_BACK" => Self::RollingBack,
            "ROLLED_BACK" => Self::RolledBack,
            "MAINTENANCE" => Self::Maintenance,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an application returned by `describe`
///
/// Never cached: every decision re-fetches it, since `version_id` moves after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetail {
    pub name: String,
    pub arn: String,
    pub status: ApplicationStatus,
    /// Current application version, required by configuration mutations
    pub version_id: i64,
    /// Required by the delete call
    pub create_timestamp: Option<DateTime<Utc>>,
    /// Present only while a VPC attachment exists
    pub vpc_configuration_id: Option<String>,
}

/// Whether the application runs packaged code or hosts notebooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationMode {
    Streaming,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismSettings {
    pub parallelism: i32,
    pub parallelism_per_kpu: i32,
    pub autoscaling_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointSettings {
    pub interval_ms: i64,
    pub min_pause_between_checkpoints_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyGroup {
    pub id: String,
    pub properties: BTreeMap<String, String>,
}

/// Where the application code comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationCode {
    /// Packaged artifact (ZIP/JAR) in object storage
    S3Zip { bucket_arn: String, file_key: String },
    /// Inline text, used for notebook documents
    PlainText(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcSettings {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenArtifact {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }
}

/// Extra configuration for notebook (interactive) applications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookSettings {
    pub log_level: String,
    pub glue_database_arn: String,
    pub dependency_jars: Vec<MavenArtifact>,
}

/// Everything needed to create an application in one call
#[derive(Debug, Clone, PartialEq)]
pub struct CreateApplicationRequest {
    pub name: String,
    pub description: String,
    pub runtime_environment: String,
    pub service_execution_role: String,
    pub mode: ApplicationMode,
    pub parallelism: ParallelismSettings,
    pub checkpoint: Option<CheckpointSettings>,
    pub property_groups: Vec<PropertyGroup>,
    pub code: ApplicationCode,
    pub vpc: Option<VpcSettings>,
    pub notebook: Option<NotebookSettings>,
    pub log_stream_arn: String,
}

/// Kind of presigned URL to request for an application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignedUrlType {
    ZeppelinUi,
}
