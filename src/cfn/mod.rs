//! # CloudFormation Custom Resources
//!
//! Request model and outcome reporting for the custom-resource protocol.

pub mod event;
pub mod response;

pub use event::{CustomResourceRequest, InvocationContext, LifecycleOperation};
pub use response::{CfnResponder, Outcome, OutcomeReporter, ResponseBody, ResponseStatus};
