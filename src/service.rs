//! Client side of the assessment service contracts.
//!
//! [`AssessmentService`] is the seam the task runners call through;
//! [`HttpService`] implements it over HTTP with reqwest.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::ServiceConfig;
use crate::error::TaskError;
use crate::models::{
    DataEnvelope, GeneratedPassword, MetadataReport, PasswordRequest, ScanResult, TaskKind,
    display_value,
};
use crate::staging::{FileSource, StagedFile};

pub const SCAN_PATH: &str = "/scan";
pub const GENERATE_PASSWORD_PATH: &str = "/generate-password";
pub const ANALYZE_METADATA_PATH: &str = "/analyze-metadata";
/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'a>>;

pub trait AssessmentService: Send + Sync {
    fn scan_ports<'a>(&'a self, target: &'a str) -> ServiceFuture<'a, ScanResult>;

    fn generate_password<'a>(
        &'a self,
        request: &'a PasswordRequest,
    ) -> ServiceFuture<'a, GeneratedPassword>;

    fn analyze_metadata<'a>(&'a self, file: &'a StagedFile) -> ServiceFuture<'a, MetadataReport>;
}

#[derive(Debug, Clone)]
pub struct HttpService {
    client: Client,
    config: ServiceConfig,
}

impl HttpService {
    pub fn new(config: ServiceConfig) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn read_response<T: DeserializeOwned>(
        response: Response,
        kind: TaskKind,
    ) -> Result<T, TaskError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| TaskError::Transport(e.to_string()))?;
        decode_body(status, content_type.as_deref(), &body, kind)
    }
}

impl AssessmentService for HttpService {
    fn scan_ports<'a>(&'a self, target: &'a str) -> ServiceFuture<'a, ScanResult> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.config.endpoint(SCAN_PATH))
                .json(&json!({ "target": target }))
                .send()
                .await
                .map_err(|e| TaskError::Transport(e.to_string()))?;
            let envelope: DataEnvelope<ScanResult> =
                Self::read_response(response, TaskKind::PortScan).await?;
            Ok(envelope.data)
        })
    }

    fn generate_password<'a>(
        &'a self,
        request: &'a PasswordRequest,
    ) -> ServiceFuture<'a, GeneratedPassword> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.config.endpoint(GENERATE_PASSWORD_PATH))
                .json(request)
                .send()
                .await
                .map_err(|e| TaskError::Transport(e.to_string()))?;
            Self::read_response(response, TaskKind::PasswordGeneration).await
        })
    }

    fn analyze_metadata<'a>(&'a self, file: &'a StagedFile) -> ServiceFuture<'a, MetadataReport> {
        Box::pin(async move {
            let form = upload_form(file).await?;

            let response = self
                .client
                .post(self.config.endpoint(ANALYZE_METADATA_PATH))
                .multipart(form)
                .send()
                .await
                .map_err(|e| TaskError::Transport(e.to_string()))?;
            let envelope: DataEnvelope<MetadataReport> =
                Self::read_response(response, TaskKind::MetadataAnalysis).await?;
            Ok(envelope.data)
        })
    }
}

/// Multipart body for the metadata endpoint: the file content under `file`.
pub async fn upload_form(file: &StagedFile) -> Result<multipart::Form, TaskError> {
    let bytes = match file.source() {
        FileSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| TaskError::Validation(format!("Could not read {}: {}", file.name(), e)))?,
        FileSource::Memory(bytes) => bytes.clone(),
    };
    let part = multipart::Part::bytes(bytes).file_name(file.name().to_string());
    Ok(multipart::Form::new().part(UPLOAD_FIELD, part))
}

/// Classifies a raw response.
///
/// - non-2xx: `Service`, with the body's `error`/`message` text when the body is JSON
/// - 2xx without a JSON content type: `Format`, the body is not parsed
/// - 2xx JSON with an `error` key at the top level or inside `data`: `Service`
/// - 2xx JSON not matching `T`: `Format`
pub fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
    kind: TaskKind,
) -> Result<T, TaskError> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    if !status.is_success() {
        let message = if is_json {
            serde_json::from_slice::<Value>(body)
                .ok()
                .and_then(|v| error_message(&v))
        } else {
            None
        };
        return Err(TaskError::Service(message.unwrap_or_else(|| {
            format!("{} (HTTP {})", TaskError::fallback_message(kind), status.as_u16())
        })));
    }

    if !is_json {
        return Err(TaskError::Format(format!(
            "expected JSON from the {} service, got {}",
            kind,
            content_type.unwrap_or("no content type")
        )));
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| TaskError::Format(e.to_string()))?;
    let reported = value
        .get("error")
        .or_else(|| value.get("data").and_then(|data| data.get("error")));
    if let Some(message) = reported.and_then(display_value) {
        return Err(TaskError::Service(message));
    }
    serde_json::from_value(value).map_err(|e| TaskError::Format(e.to_string()))
}

fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(display_value)
        .filter(|m| !m.trim().is_empty())
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use crate::staging::FileCandidate;
    use std::io::Write;

    #[tokio::test]
    async fn test_upload_form_uses_file_field() {
        let file = FileCandidate::from_bytes("notes.txt", b"hello".to_vec())
            .validate()
            .unwrap();
        let form = upload_form(&file).await.unwrap();
        assert!(!form.boundary().is_empty());
        assert_eq!(UPLOAD_FIELD, "file");
    }

    #[tokio::test]
    async fn test_unreadable_upload_is_a_validation_error() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(b"hello").unwrap();
        let file = FileCandidate::from_path(tmp.path()).unwrap().validate().unwrap();
        drop(tmp);

        let err = upload_form(&file).await.unwrap_err();
        assert!(err.is_validation());
    }
}
