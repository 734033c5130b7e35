//! # Custom Resource Requests
//!
//! The request CloudFormation sends to a custom-resource handler, and the invocation context
//! the Lambda runtime supplies alongside it.

use crate::error::{LifecycleError, LifecycleResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::SystemTime;

/// CloudFormation custom-resource request
///
/// `request_type` is kept as the raw string so an unknown value can still be reported back.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    pub request_type: String,
    /// Pre-signed URL the outcome must be PUT to
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub logical_resource_id: String,
    /// Absent on Create
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    /// Present on Update only
    #[serde(default)]
    pub old_resource_properties: Option<Map<String, Value>>,
}

impl CustomResourceRequest {
    /// Map the request type onto a lifecycle operation
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownRequestType`] for anything but Create, Update or Delete.
    pub fn operation(&self) -> LifecycleResult<LifecycleOperation> {
        LifecycleOperation::from_request_type(&self.request_type)
    }
}

// The response URL is a bearer credential for the stack, keep it out of the logs
impl fmt::Debug for CustomResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResourceRequest")
            .field("request_type", &self.request_type)
            .field("response_url", &"<redacted>")
            .field("stack_id", &self.stack_id)
            .field("request_id", &self.request_id)
            .field("resource_type", &self.resource_type)
            .field("logical_resource_id", &self.logical_resource_id)
            .field("physical_resource_id", &self.physical_resource_id)
            .field("resource_properties", &self.resource_properties)
            .field("old_resource_properties", &self.old_resource_properties)
            .finish()
    }
}

/// Desired state change carried by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOperation {
    /// `Create`
    Provision,
    /// `Update`
    Reconcile,
    /// `Delete`
    Decommission,
}

impl LifecycleOperation {
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownRequestType`] for unrecognised request types.
    pub fn from_request_type(request_type: &str) -> LifecycleResult<Self> {
        match request_type {
            "Create" => Ok(Self::Provision),
            "Update" => Ok(Self::Reconcile),
            "Delete" => Ok(Self::Decommission),
            other => Err(LifecycleError::UnknownRequestType(other.to_string())),
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provision => "Create",
            Self::Reconcile => "Update",
            Self::Decommission => "Delete",
        })
    }
}

/// Invocation details the handlers need from the Lambda runtime
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
    /// Used as the physical resource id for newly created resources
    pub log_stream_name: String,
    /// Hard deadline of the invocation, if the platform supplied one
    pub deadline: Option<SystemTime>,
}
