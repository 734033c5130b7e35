//! # Resource Properties
//!
//! CloudFormation delivers every scalar in `ResourceProperties` as a string, so numbers and
//! booleans are parsed here, at the boundary. A bad value fails with
//! [`LifecycleError::InvalidProperty`] before any remote call is made.

use crate::constants::BLUEPRINT_PROPERTY_GROUP_ID;
use crate::error::{LifecycleError, LifecycleResult};
use crate::provider::{
    ApplicationCode, ApplicationMode, CheckpointSettings, CreateApplicationRequest,
    ParallelismSettings, PropertyGroup, VpcSettings,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

pub type Properties = Map<String, Value>;

/// Render a scalar property as text
fn scalar_text(name: &str, value: &Value) -> LifecycleResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(LifecycleError::invalid_property(name, "expected a scalar value")),
    }
}

/// Required, non-empty text property
///
/// # Errors
///
/// [`LifecycleError::MissingProperty`] when absent or empty, [`LifecycleError::InvalidProperty`]
/// when not a scalar.
pub fn required_str(props: &Properties, name: &str) -> LifecycleResult<String> {
    let value = props
        .get(name)
        .ok_or_else(|| LifecycleError::MissingProperty(name.to_string()))?;
    let text = scalar_text(name, value)?;
    if text.trim().is_empty() {
        return Err(LifecycleError::MissingProperty(name.to_string()));
    }
    Ok(text)
}

/// Optional parsed property
///
/// # Errors
///
/// [`LifecycleError::InvalidProperty`] when present but unparsable.
pub fn optional_parsed<T>(props: &Properties, name: &str) -> LifecycleResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = props.get(name).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let text = scalar_text(name, value)?;
    text.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| LifecycleError::invalid_property(name, e.to_string()))
}

/// Required parsed property
///
/// # Errors
///
/// [`LifecycleError::MissingProperty`] when absent, [`LifecycleError::InvalidProperty`] when
/// unparsable.
pub fn required_parsed<T>(props: &Properties, name: &str) -> LifecycleResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_parsed(props, name)?.ok_or_else(|| LifecycleError::MissingProperty(name.to_string()))
}

/// Optional boolean property, `true`/`false` in any case
///
/// # Errors
///
/// [`LifecycleError::InvalidProperty`] for any other text.
pub fn optional_bool(props: &Properties, name: &str) -> LifecycleResult<Option<bool>> {
    match props.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(value) => match scalar_text(name, value)?.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(LifecycleError::invalid_property(
                name,
                format!("expected true or false, got {other:?}"),
            )),
        },
    }
}

/// Optional list property, given as a JSON list or a comma separated string
///
/// # Errors
///
/// [`LifecycleError::InvalidProperty`] when an element is not a scalar.
pub fn optional_list(props: &Properties, name: &str) -> LifecycleResult<Vec<String>> {
    let items = match props.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| scalar_text(name, v))
            .collect::<LifecycleResult<Vec<_>>>()?,
        Some(value) => scalar_text(name, value)?
            .split(',')
            .map(ToString::to_string)
            .collect(),
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// Optional string map property
///
/// # Errors
///
/// [`LifecycleError::InvalidProperty`] when not an object or a value is not a scalar.
pub fn optional_map(props: &Properties, name: &str) -> LifecycleResult<BTreeMap<String, String>> {
    match props.get(name) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| -> LifecycleResult<(String, String)> {
                Ok((k.clone(), scalar_text(&format!("{name}.{k}"), v)?))
            })
            .collect(),
        Some(_) => Err(LifecycleError::invalid_property(name, "expected a map")),
    }
}

/// Properties of a packaged Java application resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaAppProperties {
    pub app_name: String,
    pub runtime_environment: String,
    pub service_execution_role: String,
    pub bucket_arn: String,
    pub file_key: String,
    pub log_stream_arn: String,
    pub parallelism: i32,
    pub parallelism_per_kpu: i32,
    pub autoscaling_enabled: bool,
    pub checkpoint_interval_ms: i64,
    pub min_pause_between_checkpoints_ms: i64,
    pub application_properties: BTreeMap<String, String>,
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

impl JavaAppProperties {
    /// Only the application name, enough for Delete
    ///
    /// # Errors
    ///
    /// [`LifecycleError::MissingProperty`] when `AppName` is absent.
    pub fn app_name(props: &Properties) -> LifecycleResult<String> {
        required_str(props, "AppName")
    }

    /// # Errors
    ///
    /// Fails on the first missing or invalid property.
    pub fn from_properties(props: &Properties) -> LifecycleResult<Self> {
        let parsed = Self {
            app_name: required_str(props, "AppName")?,
            runtime_environment: required_str(props, "RuntimeEnvironment")?,
            service_execution_role: required_str(props, "ServiceExecutionRole")?,
            bucket_arn: required_str(props, "BucketArn")?,
            file_key: required_str(props, "FileKey")?,
            log_stream_arn: required_str(props, "LogStreamArn")?,
            parallelism: optional_parsed(props, "Parallelism")?.unwrap_or(2),
            parallelism_per_kpu: optional_parsed(props, "ParallelismPerKpu")?.unwrap_or(1),
            autoscaling_enabled: optional_bool(props, "AutoscalingEnabled")?.unwrap_or(false),
            checkpoint_interval_ms: optional_parsed(props, "CheckpointInterval")?.unwrap_or(60_000),
            min_pause_between_checkpoints_ms: optional_parsed(props, "MinPauseBetweenCheckpoints")?
                .unwrap_or(5_000),
            application_properties: optional_map(props, "ApplicationProperties")?,
            subnet_ids: optional_list(props, "Subnets")?,
            security_group_ids: optional_list(props, "SecurityGroups")?,
        };
        if parsed.parallelism < 1 {
            return Err(LifecycleError::invalid_property("Parallelism", "must be at least 1"));
        }
        if parsed.parallelism_per_kpu < 1 {
            return Err(LifecycleError::invalid_property(
                "ParallelismPerKpu",
                "must be at least 1",
            ));
        }
        if parsed.subnet_ids.is_empty() != parsed.security_group_ids.is_empty() {
            return Err(LifecycleError::invalid_property(
                "Subnets",
                "Subnets and SecurityGroups must be given together",
            ));
        }
        Ok(parsed)
    }

    /// Build the create call for this application
    #[must_use]
    pub fn to_create_request(&self) -> CreateApplicationRequest {
        let vpc = (!self.subnet_ids.is_empty()).then(|| VpcSettings {
            subnet_ids: self.subnet_ids.clone(),
            security_group_ids: self.security_group_ids.clone(),
        });
        CreateApplicationRequest {
            name: self.app_name.clone(),
            description: "MSF blueprint Java application".to_string(),
            runtime_environment: self.runtime_environment.clone(),
            service_execution_role: self.service_execution_role.clone(),
            mode: ApplicationMode::Streaming,
            parallelism: ParallelismSettings {
                parallelism: self.parallelism,
                parallelism_per_kpu: self.parallelism_per_kpu,
                autoscaling_enabled: self.autoscaling_enabled,
            },
            checkpoint: Some(CheckpointSettings {
                interval_ms: self.checkpoint_interval_ms,
                min_pause_between_checkpoints_ms: self.min_pause_between_checkpoints_ms,
            }),
            property_groups: vec![PropertyGroup {
                id: BLUEPRINT_PROPERTY_GROUP_ID.to_string(),
                properties: self.application_properties.clone(),
            }],
            code: ApplicationCode::S3Zip {
                bucket_arn: self.bucket_arn.clone(),
                file_key: self.file_key.clone(),
            },
            vpc,
            notebook: None,
            log_stream_arn: self.log_stream_arn.clone(),
        }
    }
}

/// Properties of the data generator resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGenProperties {
    pub stream_arn: String,
    pub number_of_items: u64,
}

impl DataGenProperties {
    /// # Errors
    ///
    /// Fails when `StreamArn` or `NumberOfItems` is missing or invalid.
    pub fn from_properties(props: &Properties) -> LifecycleResult<Self> {
        Ok(Self {
            stream_arn: required_str(props, "StreamArn")?,
            number_of_items: required_parsed(props, "NumberOfItems")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn java_props() -> Value {
        json!({
            "AppName": "orders",
            "RuntimeEnvironment": "FLINK-1_15",
            "ServiceExecutionRole": "arn:aws:iam::123456789012:role/msf",
            "BucketArn": "arn:aws:s3:::artifacts",
            "FileKey": "orders.jar",
            "LogStreamArn": "arn:aws:logs:us-east-1:123456789012:log-group:g:log-stream:s",
            "Parallelism": "4",
            "ParallelismPerKpu": "2",
            "AutoscalingEnabled": "false",
            "CheckpointInterval": "30000",
            "MinPauseBetweenCheckpoints": "1000",
            "ApplicationProperties": {"BlueprintName": "orders", "Version": 2}
        })
    }

    #[test]
    fn test_java_properties_parse_string_typed_values() {
        let parsed = JavaAppProperties::from_properties(&props(java_props())).expect("valid");
        assert_eq!(parsed.parallelism, 4);
        assert_eq!(parsed.parallelism_per_kpu, 2);
        assert!(!parsed.autoscaling_enabled);
        assert_eq!(parsed.checkpoint_interval_ms, 30_000);
        assert_eq!(parsed.min_pause_between_checkpoints_ms, 1_000);
        assert_eq!(parsed.application_properties["Version"], "2");
        assert!(parsed.subnet_ids.is_empty());
    }

    #[test]
    fn test_java_properties_defaults() {
        let mut value = java_props();
        for key in [
            "Parallelism",
            "ParallelismPerKpu",
            "AutoscalingEnabled",
            "CheckpointInterval",
            "MinPauseBetweenCheckpoints",
            "ApplicationProperties",
        ] {
            value.as_object_mut().expect("object").remove(key);
        }
        let parsed = JavaAppProperties::from_properties(&props(value)).expect("valid");
        assert_eq!(parsed.parallelism, 2);
        assert_eq!(parsed.parallelism_per_kpu, 1);
        assert!(!parsed.autoscaling_enabled);
        assert_eq!(parsed.checkpoint_interval_ms, 60_000);
        assert_eq!(parsed.min_pause_between_checkpoints_ms, 5_000);
        assert!(parsed.application_properties.is_empty());
    }

    #[test]
    fn test_invalid_number_is_a_validation_error() {
        let mut value = java_props();
        value["Parallelism"] = json!("four");
        let err = JavaAppProperties::from_properties(&props(value)).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Invalid resource property Parallelism"));
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let mut value = java_props();
        value["AutoscalingEnabled"] = json!("maybe");
        let err = JavaAppProperties::from_properties(&props(value)).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidProperty { ref name, .. } if name == "AutoscalingEnabled"));
    }

    #[test]
    fn test_missing_app_name() {
        let err = JavaAppProperties::app_name(&props(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing required resource property: AppName");
    }

    #[test]
    fn test_vpc_from_comma_separated_and_list() {
        let mut value = java_props();
        value["Subnets"] = json!("subnet-a, subnet-b");
        value["SecurityGroups"] = json!(["sg-1"]);
        let parsed = JavaAppProperties::from_properties(&props(value)).expect("valid");
        let request = parsed.to_create_request();
        assert_eq!(
            request.vpc,
            Some(VpcSettings {
                subnet_ids: vec!["subnet-a".to_string(), "subnet-b".to_string()],
                security_group_ids: vec!["sg-1".to_string()],
            })
        );
    }

    #[test]
    fn test_vpc_requires_both_lists() {
        let mut value = java_props();
        value["Subnets"] = json!("subnet-a");
        assert!(JavaAppProperties::from_properties(&props(value)).is_err());
    }

    #[test]
    fn test_create_request_shape() {
        let request = JavaAppProperties::from_properties(&props(java_props()))
            .expect("valid")
            .to_create_request();
        assert_eq!(request.mode, ApplicationMode::Streaming);
        assert_eq!(request.property_groups[0].id, "BlueprintMetadata");
        assert_eq!(
            request.code,
            ApplicationCode::S3Zip {
                bucket_arn: "arn:aws:s3:::artifacts".to_string(),
                file_key: "orders.jar".to_string(),
            }
        );
        assert!(request.vpc.is_none());
        assert!(request.notebook.is_none());
    }

    #[test]
    fn test_datagen_properties() {
        let parsed = DataGenProperties::from_properties(&props(json!({
            "StreamArn": "arn:aws:kinesis:us-east-1:123456789012:stream/s",
            "NumberOfItems": 25
        })))
        .expect("valid");
        assert_eq!(parsed.number_of_items, 25);

        let err = DataGenProperties::from_properties(&props(json!({
            "StreamArn": "arn:aws:kinesis:us-east-1:123456789012:stream/s",
            "NumberOfItems": "-1"
        })))
        .unwrap_err();
        assert!(err.is_validation());
    }
}
