//! # Managed Service for Apache Flink Client
//!
//! Client for the kinesisanalyticsv2 control plane.
//!
//! This module provides functionality to:
//! - Describe applications, mapping `ResourceNotFoundException` to "not found"
//! - Create streaming and interactive (Studio) applications
//! - Start applications, detach VPC configurations and delete applications
//! - Request presigned URLs for the application web UIs

use crate::provider::{
    ApplicationClient, ApplicationCode, ApplicationDetail, ApplicationMode, ApplicationStatus,
    CreateApplicationRequest, PresignedUrlType,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kinesisanalyticsv2::error::DisplayErrorContext;
use aws_sdk_kinesisanalyticsv2::primitives::DateTime as SdkDateTime;
use aws_sdk_kinesisanalyticsv2::types as sdk;
use aws_sdk_kinesisanalyticsv2::Client;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, Instrument};

/// kinesisanalyticsv2 implementation of [`ApplicationClient`]
pub struct KinesisAnalyticsClient {
    client: Client,
}

impl std::fmt::Debug for KinesisAnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinesisAnalyticsClient")
            .finish_non_exhaustive()
    }
}

impl KinesisAnalyticsClient {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn to_application_detail(detail: &sdk::ApplicationDetail) -> ApplicationDetail {
    ApplicationDetail {
        name: detail.application_name().to_string(),
        arn: detail.application_arn().to_string(),
        status: ApplicationStatus::from(detail.application_status().as_str()),
        version_id: detail.application_version_id(),
        create_timestamp: detail
            .create_timestamp()
            .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())),
        vpc_configuration_id: detail
            .application_configuration_description()
            .and_then(|config| config.vpc_configuration_descriptions().first())
            .map(|vpc| vpc.vpc_configuration_id().to_string()),
    }
}

/// Translate the provider-neutral request into the SDK's application configuration
fn application_configuration(
    request: &CreateApplicationRequest,
) -> Result<sdk::ApplicationConfiguration> {
    let parallelism = sdk::ParallelismConfiguration::builder()
        .configuration_type(sdk::ConfigurationType::Custom)
        .parallelism(request.parallelism.parallelism)
        .parallelism_per_kpu(request.parallelism.parallelism_per_kpu)
        .auto_scaling_enabled(request.parallelism.autoscaling_enabled)
        .build()
        .context("Invalid parallelism configuration")?;

    let mut flink =
        sdk::FlinkApplicationConfiguration::builder().parallelism_configuration(parallelism);
    if let Some(checkpoint) = request.checkpoint {
        let checkpoint = sdk::CheckpointConfiguration::builder()
            .configuration_type(sdk::ConfigurationType::Custom)
            .checkpointing_enabled(true)
            .checkpoint_interval(checkpoint.interval_ms)
            .min_pause_between_checkpoints(checkpoint.min_pause_between_checkpoints_ms)
            .build()
            .context("Invalid checkpoint configuration")?;
        flink = flink.checkpoint_configuration(checkpoint);
    }

    let (code_content, code_content_type) = match &request.code {
        ApplicationCode::S3Zip {
            bucket_arn,
            file_key,
        } => {
            let location = sdk::S3ContentLocation::builder()
                .bucket_arn(bucket_arn)
                .file_key(file_key)
                .build()
                .context("Invalid code location")?;
            (
                sdk::CodeContent::builder()
                    .s3_content_location(location)
                    .build(),
                sdk::CodeContentType::Zipfile,
            )
        }
        ApplicationCode::PlainText(text) => (
            sdk::CodeContent::builder().text_content(text).build(),
            sdk::CodeContentType::Plaintext,
        ),
    };
    let code = sdk::ApplicationCodeConfiguration::builder()
        .code_content(code_content)
        .code_content_type(code_content_type)
        .build()
        .context("Invalid code configuration")?;

    let mut configuration = sdk::ApplicationConfiguration::builder()
        .flink_application_configuration(flink.build())
        .application_code_configuration(code);

    if !request.property_groups.is_empty() {
        let mut groups = Vec::with_capacity(request.property_groups.len());
        for group in &request.property_groups {
            let properties: HashMap<String, String> = group.properties.clone().into_iter().collect();
            groups.push(
                sdk::PropertyGroup::builder()
                    .property_group_id(&group.id)
                    .set_property_map(Some(properties))
                    .build()
                    .with_context(|| format!("Invalid property group {}", group.id))?,
            );
        }
        let environment = sdk::EnvironmentProperties::builder()
            .set_property_groups(Some(groups))
            .build()
            .context("Invalid environment properties")?;
        configuration = configuration.environment_properties(environment);
    }

    if let Some(vpc) = &request.vpc {
        let vpc = sdk::VpcConfiguration::builder()
            .set_subnet_ids(Some(vpc.subnet_ids.clone()))
            .set_security_group_ids(Some(vpc.security_group_ids.clone()))
            .build()
            .context("Invalid VPC configuration")?;
        configuration = configuration.vpc_configurations(vpc);
    }

    if let Some(notebook) = &request.notebook {
        let monitoring = sdk::ZeppelinMonitoringConfiguration::builder()
            .log_level(sdk::LogLevel::from(notebook.log_level.as_str()))
            .build()
            .context("Invalid notebook monitoring configuration")?;
        let glue = sdk::GlueDataCatalogConfiguration::builder()
            .database_arn(&notebook.glue_database_arn)
            .build()
            .context("Invalid Glue catalog configuration")?;
        let catalog = sdk::CatalogConfiguration::builder()
            .glue_data_catalog_configuration(glue)
            .build();

        let mut zeppelin = sdk::ZeppelinApplicationConfiguration::builder()
            .monitoring_configuration(monitoring)
            .catalog_configuration(catalog);
        for jar in &notebook.dependency_jars {
            let maven = sdk::MavenReference::builder()
                .group_id(&jar.group_id)
                .artifact_id(&jar.artifact_id)
                .version(&jar.version)
                .build()
                .with_context(|| format!("Invalid Maven reference {}", jar.artifact_id))?;
            let artifact = sdk::CustomArtifactConfiguration::builder()
                .artifact_type(sdk::ArtifactType::DependencyJar)
                .maven_reference(maven)
                .build()
                .with_context(|| format!("Invalid custom artifact {}", jar.artifact_id))?;
            zeppelin = zeppelin.custom_artifacts_configuration(artifact);
        }
        configuration = configuration.zeppelin_application_configuration(zeppelin.build());
    }

    Ok(configuration.build())
}

#[async_trait]
impl ApplicationClient for KinesisAnalyticsClient {
    async fn describe_application(&self, name: &str) -> Result<Option<ApplicationDetail>> {
        let span = tracing::debug_span!("msf.application.describe", application.name = name);
        let start = Instant::now();

        async move {
            match self
                .client
                .describe_application()
                .application_name(name)
                .send()
                .await
            {
                Ok(output) => {
                    let detail = output
                        .application_detail()
                        .context("DescribeApplication returned no application detail")?;
                    let detail = to_application_detail(detail);
                    debug!(
                        "Described application {} in {:?}: status={}, version={}",
                        name,
                        start.elapsed(),
                        detail.status,
                        detail.version_id
                    );
                    Ok(Some(detail))
                }
                Err(e)
                    if e
                        .as_service_error()
                        .is_some_and(|err| err.is_resource_not_found_exception()) =>
                {
                    debug!("Application {} not found", name);
                    Ok(None)
                }
                Err(e) => Err(anyhow::anyhow!(
                    "Failed to describe application {name}: {}",
                    DisplayErrorContext(&e)
                )),
            }
        }
        .instrument(span)
        .await
    }

    async fn create_application(&self, request: &CreateApplicationRequest) -> Result<()> {
        let span = info_span!(
            "msf.application.create",
            application.name = %request.name,
            runtime = %request.runtime_environment
        );

        async move {
            let configuration = application_configuration(request)?;
            let logging = sdk::CloudWatchLoggingOption::builder()
                .log_stream_arn(&request.log_stream_arn)
                .build()
                .context("Invalid CloudWatch logging option")?;
            let mode = match request.mode {
                ApplicationMode::Streaming => sdk::ApplicationMode::Streaming,
                ApplicationMode::Interactive => sdk::ApplicationMode::Interactive,
            };

            let output = self
                .client
                .create_application()
                .application_name(&request.name)
                .application_description(&request.description)
                .runtime_environment(sdk::RuntimeEnvironment::from(
                    request.runtime_environment.as_str(),
                ))
                .service_execution_role(&request.service_execution_role)
                .application_configuration(configuration)
                .cloud_watch_logging_options(logging)
                .application_mode(mode)
                .send()
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create application {}: {}",
                        request.name,
                        DisplayErrorContext(&e)
                    )
                })?;

            info!(
                "Create response for {}: {:?}",
                request.name,
                output.application_detail().map(sdk::ApplicationDetail::application_arn)
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn start_application(&self, name: &str) -> Result<()> {
        info!("Starting application {}", name);
        self.client
            .start_application()
            .application_name(name)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to start application {name}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        Ok(())
    }

    async fn delete_application_vpc_configuration(
        &self,
        name: &str,
        current_version_id: i64,
        vpc_configuration_id: &str,
    ) -> Result<()> {
        let output = self
            .client
            .delete_application_vpc_configuration()
            .application_name(name)
            .current_application_version_id(current_version_id)
            .vpc_configuration_id(vpc_configuration_id)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to delete VPC configuration {vpc_configuration_id} from application {name}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        info!(
            "Deleted VPC configuration {} from application {}, new version {:?}",
            vpc_configuration_id,
            name,
            output.application_version_id()
        );
        Ok(())
    }

    async fn delete_application(
        &self,
        name: &str,
        create_timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.client
            .delete_application()
            .application_name(name)
            .create_timestamp(SdkDateTime::from_secs_and_nanos(
                create_timestamp.timestamp(),
                create_timestamp.timestamp_subsec_nanos(),
            ))
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to delete application {name}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        info!("Delete accepted for application {}", name);
        Ok(())
    }

    async fn create_presigned_url(
        &self,
        name: &str,
        url_type: PresignedUrlType,
        session_expiry: Duration,
    ) -> Result<Option<String>> {
        let url_type = match url_type {
            PresignedUrlType::ZeppelinUi => sdk::UrlType::ZeppelinUiUrl,
        };
        let expiry_secs = i64::try_from(session_expiry.as_secs())
            .context("Presigned URL session expiry out of range")?;

        let output = self
            .client
            .create_application_presigned_url()
            .application_name(name)
            .url_type(url_type)
            .session_expiration_duration_in_seconds(expiry_secs)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create presigned URL for application {name}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        Ok(output.authorized_url().map(ToString::to_string))
    }
}
