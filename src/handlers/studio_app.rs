//! Studio (notebook) application, attached to a VPC so it can reach the Kafka cluster.

use crate::cfn::CustomResourceRequest;
use crate::config::{EnvLookup, StudioAppConfig};
use crate::constants::BLUEPRINT_PROPERTY_GROUP_ID;
use crate::error::LifecycleResult;
use crate::lifecycle::guard::{self, ApplicationOperation};
use crate::lifecycle::{LifecycleHandler, StatusPoller, Watchdog};
use crate::notebook::{KafkaSource, Note};
use crate::provider::{
    ApplicationClient, ApplicationCode, ApplicationMode, CreateApplicationRequest, MavenArtifact,
    NotebookSettings, ParallelismSettings, PropertyGroup, VpcSettings,
};
use anyhow::Context;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Connector jars every blueprint notebook depends on
fn dependency_jars() -> Vec<MavenArtifact> {
    vec![
        MavenArtifact::new("org.apache.flink", "flink-connector-kafka", "1.15.4"),
        MavenArtifact::new("org.apache.flink", "flink-sql-connector-kinesis", "1.15.4"),
        MavenArtifact::new("software.amazon.msk", "aws-msk-iam-auth", "1.1.6"),
    ]
}

/// Build the create call for a Studio application
///
/// # Errors
///
/// Fails if the notebook document cannot be rendered.
pub fn studio_create_request(config: &StudioAppConfig) -> LifecycleResult<CreateApplicationRequest> {
    let note = Note::blueprint(
        &config.app_name,
        KafkaSource {
            bootstrap_servers: &config.bootstrap_servers,
            topic: &config.source_topic,
        },
    )
    .to_json()
    .context("Failed to render notebook")?;

    Ok(CreateApplicationRequest {
        name: config.app_name.clone(),
        description: "blueprint studio application".to_string(),
        runtime_environment: config.runtime_environment.clone(),
        service_execution_role: config.execution_role.clone(),
        mode: ApplicationMode::Interactive,
        parallelism: ParallelismSettings {
            parallelism: 4,
            parallelism_per_kpu: 1,
            autoscaling_enabled: false,
        },
        checkpoint: None,
        property_groups: vec![PropertyGroup {
            id: BLUEPRINT_PROPERTY_GROUP_ID.to_string(),
            properties: BTreeMap::from([
                ("StackId".to_string(), config.stack_id.clone()),
                ("BlueprintName".to_string(), config.blueprint_name.clone()),
            ]),
        }],
        code: ApplicationCode::PlainText(note),
        vpc: Some(VpcSettings {
            subnet_ids: vec![config.subnet_id.clone()],
            security_group_ids: vec![config.security_group_id.clone()],
        }),
        notebook: Some(NotebookSettings {
            log_level: "INFO".to_string(),
            glue_database_arn: config.glue_database_arn.clone(),
            dependency_jars: dependency_jars(),
        }),
        log_stream_arn: config.log_stream_arn.clone(),
    })
}

pub struct StudioAppHandler {
    client: Arc<dyn ApplicationClient>,
    env: EnvLookup,
    poll_interval: Duration,
}

impl std::fmt::Debug for StudioAppHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioAppHandler")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl StudioAppHandler {
    pub fn new(client: Arc<dyn ApplicationClient>, env: EnvLookup, poll_interval: Duration) -> Self {
        Self {
            client,
            env,
            poll_interval,
        }
    }

    async fn create(&self, watchdog: &Watchdog) -> LifecycleResult<String> {
        let config = StudioAppConfig::from_lookup(&*self.env)?;
        let request = studio_create_request(&config)?;
        let poller = StatusPoller::new(self.poll_interval).bounded_by(watchdog);
        guard::execute(
            self.client.as_ref(),
            &poller,
            ApplicationOperation::Create(Box::new(request)),
        )
        .await?;
        Ok("Successfully Created Application".to_string())
    }
}

#[async_trait]
impl LifecycleHandler for StudioAppHandler {
    fn name(&self) -> &'static str {
        "studio-app-resource"
    }

    async fn provision(
        &self,
        _request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.create(watchdog).await
    }

    /// Same as Create: an existing application is left as it is
    async fn reconcile(
        &self,
        _request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.create(watchdog).await
    }

    async fn decommission(
        &self,
        _request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let config = StudioAppConfig::from_lookup(&*self.env)?;
        let poller = StatusPoller::new(self.poll_interval).bounded_by(watchdog);
        guard::execute(
            self.client.as_ref(),
            &poller,
            ApplicationOperation::Delete {
                name: config.app_name,
            },
        )
        .await?;
        Ok("Successfully Deleted Application".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StudioAppConfig {
        StudioAppConfig {
            app_name: "studio".to_string(),
            execution_role: "arn:aws:iam::123456789012:role/studio".to_string(),
            bootstrap_servers: "b-1.msk.example:9098".to_string(),
            subnet_id: "subnet-1".to_string(),
            source_topic: "stocks".to_string(),
            security_group_id: "sg-1".to_string(),
            glue_database_arn: "arn:aws:glue:us-east-1:123456789012:database/db".to_string(),
            log_stream_arn: "arn:aws:logs:us-east-1:123456789012:log-group:g:log-stream:s"
                .to_string(),
            runtime_environment: "ZEPPELIN-FLINK-3_0".to_string(),
            blueprint_name: "msk-to-studio".to_string(),
            stack_id: "stack-1".to_string(),
        }
    }

    #[test]
    fn test_studio_create_request() {
        let request = studio_create_request(&config()).expect("request should build");

        assert_eq!(request.mode, ApplicationMode::Interactive);
        assert_eq!(request.parallelism.parallelism, 4);
        assert_eq!(request.parallelism.parallelism_per_kpu, 1);
        assert!(!request.parallelism.autoscaling_enabled);
        assert_eq!(request.property_groups[0].id, "BlueprintMetadata");
        assert_eq!(request.property_groups[0].properties["StackId"], "stack-1");
        assert_eq!(
            request.property_groups[0].properties["BlueprintName"],
            "msk-to-studio"
        );
        assert_eq!(
            request.vpc.as_ref().map(|v| v.subnet_ids.clone()),
            Some(vec!["subnet-1".to_string()])
        );

        let notebook = request.notebook.as_ref().expect("notebook settings");
        assert_eq!(notebook.log_level, "INFO");
        let artifacts: Vec<_> = notebook
            .dependency_jars
            .iter()
            .map(|a| format!("{}:{}:{}", a.group_id, a.artifact_id, a.version))
            .collect();
        assert_eq!(
            artifacts,
            vec![
                "org.apache.flink:flink-connector-kafka:1.15.4",
                "org.apache.flink:flink-sql-connector-kinesis:1.15.4",
                "software.amazon.msk:aws-msk-iam-auth:1.1.6",
            ]
        );

        let ApplicationCode::PlainText(note) = &request.code else {
            panic!("studio code must be inline text");
        };
        assert!(note.contains("\"id\":\"ABCDEFGHI\""));
    }
}
