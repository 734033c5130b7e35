//! Common test utilities
//!
//! In-memory stand-ins for the remote services behind the provider traits, plus builders for
//! custom-resource requests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use msf_blueprint_handlers::cfn::{CustomResourceRequest, InvocationContext, Outcome, OutcomeReporter};
use msf_blueprint_handlers::config::EnvLookup;
use msf_blueprint_handlers::provider::{
    ApplicationClient, ApplicationDetail, ApplicationStatus, AssetFetcher, AssetStore,
    CreateApplicationRequest, NotebookSession, PresignedUrlType, RecordSink,
};
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests that open real HTTP connections
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        msf_blueprint_handlers::observability::install_crypto_provider();
    });
}

/// Build a custom-resource request
pub fn request(request_type: &str, properties: Value) -> CustomResourceRequest {
    serde_json::from_value(json!({
        "RequestType": request_type,
        "ResponseURL": "https://cloudformation-custom-resource-response.example/signed",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/blueprint/1",
        "RequestId": "11111111-2222-3333-4444-555555555555",
        "LogicalResourceId": "Resource",
        "ResourceType": "Custom::Blueprint",
        "ResourceProperties": properties,
    }))
    .expect("request should deserialize")
}

pub fn context() -> InvocationContext {
    InvocationContext {
        request_id: "lambda-request".to_string(),
        log_stream_name: "2024/01/01/[$LATEST]0123456789abcdef".to_string(),
        deadline: None,
    }
}

/// Environment lookup over a fixed set of variables
pub fn env(vars: &[(&str, &str)]) -> EnvLookup {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Arc::new(move |key: &str| vars.get(key).cloned())
}

pub fn create_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Remote call observed by [`ScriptedApplicationClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Describe(String),
    Create(Box<CreateApplicationRequest>),
    Start(String),
    DetachVpc {
        name: String,
        version_id: i64,
        vpc_configuration_id: String,
    },
    Delete {
        name: String,
        create_timestamp: DateTime<Utc>,
    },
    PresignedUrl {
        name: String,
        url_type: PresignedUrlType,
        expiry: Duration,
    },
}

#[derive(Debug, Default)]
struct ClientState {
    exists: bool,
    statuses: VecDeque<ApplicationStatus>,
    version_id: i64,
    vpc_configuration_id: Option<String>,
    presigned_url: Option<String>,
    describe_error: Option<String>,
    calls: Vec<Call>,
}

/// Application control plane that replays a scripted status sequence
///
/// Each describe consumes one status; the last one repeats forever.
#[derive(Debug, Default)]
pub struct ScriptedApplicationClient {
    state: Mutex<ClientState>,
}

impl ScriptedApplicationClient {
    /// An application that does not exist
    pub fn missing() -> Self {
        Self::default()
    }

    /// An existing application that reports `statuses` in order
    pub fn with_statuses(statuses: &[&str]) -> Self {
        let client = Self::default();
        {
            let mut state = client.state.lock().expect("lock");
            state.exists = true;
            state.version_id = 3;
            state.statuses = statuses.iter().map(|s| ApplicationStatus::from(*s)).collect();
        }
        client
    }

    pub fn with_vpc(self, vpc_configuration_id: &str) -> Self {
        self.state.lock().expect("lock").vpc_configuration_id =
            Some(vpc_configuration_id.to_string());
        self
    }

    pub fn with_presigned_url(self, url: &str) -> Self {
        self.state.lock().expect("lock").presigned_url = Some(url.to_string());
        self
    }

    pub fn with_describe_error(self, message: &str) -> Self {
        self.state.lock().expect("lock").describe_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("lock").calls.clone()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Describe(_)))
            .count()
    }

    pub fn created(&self) -> Vec<CreateApplicationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(request) => Some(*request),
                _ => None,
            })
            .collect()
    }

    /// Calls other than describe, in order
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Describe(_)))
            .collect()
    }
}

#[async_trait]
impl ApplicationClient for ScriptedApplicationClient {
    async fn describe_application(&self, name: &str) -> Result<Option<ApplicationDetail>> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Describe(name.to_string()));
        if let Some(message) = &state.describe_error {
            bail!("Failed to describe application {name}: {message}");
        }
        if !state.exists {
            return Ok(None);
        }
        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().cloned()
        }
        .unwrap_or(ApplicationStatus::Ready);

        Ok(Some(ApplicationDetail {
            name: name.to_string(),
            arn: format!("arn:aws:kinesisanalytics:us-east-1:123456789012:application/{name}"),
            status,
            version_id: state.version_id,
            create_timestamp: Some(create_timestamp()),
            vpc_configuration_id: state.vpc_configuration_id.clone(),
        }))
    }

    async fn create_application(&self, request: &CreateApplicationRequest) -> Result<()> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Create(Box::new(request.clone())));
        state.exists = true;
        state.version_id = 1;
        state.statuses = VecDeque::from([ApplicationStatus::Ready]);
        Ok(())
    }

    async fn start_application(&self, name: &str) -> Result<()> {
        self.state
            .lock()
            .expect("lock")
            .calls
            .push(Call::Start(name.to_string()));
        Ok(())
    }

    async fn delete_application_vpc_configuration(
        &self,
        name: &str,
        current_version_id: i64,
        vpc_configuration_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().expect("lock");
        if current_version_id != state.version_id {
            bail!("ConcurrentModificationException: stale version {current_version_id}");
        }
        state.calls.push(Call::DetachVpc {
            name: name.to_string(),
            version_id: current_version_id,
            vpc_configuration_id: vpc_configuration_id.to_string(),
        });
        state.version_id += 1;
        state.vpc_configuration_id = None;
        Ok(())
    }

    async fn delete_application(&self, name: &str, create_timestamp: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Delete {
            name: name.to_string(),
            create_timestamp,
        });
        state.exists = false;
        Ok(())
    }

    async fn create_presigned_url(
        &self,
        name: &str,
        url_type: PresignedUrlType,
        session_expiry: Duration,
    ) -> Result<Option<String>> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::PresignedUrl {
            name: name.to_string(),
            url_type,
            expiry: session_expiry,
        });
        Ok(state.presigned_url.clone())
    }
}

/// Reporter that keeps every outcome it is handed
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Outcome>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<Outcome> {
        self.reports.lock().expect("lock").clone()
    }
}

#[async_trait]
impl OutcomeReporter for RecordingReporter {
    async fn report(
        &self,
        _request: &CustomResourceRequest,
        _context: &InvocationContext,
        outcome: &Outcome,
    ) -> Result<()> {
        self.reports.lock().expect("lock").push(outcome.clone());
        Ok(())
    }
}

/// Record written to a [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRecord {
    pub stream_arn: String,
    pub data: Value,
    pub partition_key: String,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn put_record(&self, stream_arn: &str, data: &[u8], partition_key: &str) -> Result<()> {
        self.records.lock().expect("lock").push(SinkRecord {
            stream_arn: stream_arn.to_string(),
            data: serde_json::from_slice(data)?,
            partition_key: partition_key.to_string(),
        });
        Ok(())
    }
}

/// Buckets kept in memory, keyed by (bucket, key)
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn seed(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("lock")
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .expect("lock")
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("lock")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.seed(bucket, key, &body);
        Ok(())
    }

    async fn empty_bucket(&self, bucket: &str) -> Result<usize> {
        let mut objects = self.objects.lock().expect("lock");
        let before = objects.len();
        objects.retain(|(b, _), _| b != bucket);
        Ok(before - objects.len())
    }
}

/// Fetcher serving fixed bodies by URL
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AssetFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.fetched.lock().expect("lock").push(url.to_string());
        match self.bodies.get(url.as_str()) {
            Some(body) => Ok(body.clone()),
            None => bail!("404 Not Found: {url}"),
        }
    }
}

/// Notebook session returning a canned reply
#[derive(Debug)]
pub struct CannedNotebookSession {
    reply: Value,
    urls: Mutex<Vec<String>>,
}

impl CannedNotebookSession {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl NotebookSession for CannedNotebookSession {
    async fn run_note(&self, authorized_job_url: &str) -> Result<Value> {
        self.urls
            .lock()
            .expect("lock")
            .push(authorized_job_url.to_string());
        Ok(self.reply.clone())
    }
}
