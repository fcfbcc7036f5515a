/// Category inference backends: the in-browser model and a remote model server
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

pub const DEFAULT_MODEL_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3.2";

/// A model that answers a text prompt with free text
#[async_trait(?Send)]
pub trait ModelBackend {
    async fn infer(&self, prompt: &str) -> Result<String, BackendError>;

    /// Short name for log lines
    fn name(&self) -> &str;
}

/// Which backend the user picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    Local,
    Remote { url: String, model: String },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Remote {
            url: DEFAULT_MODEL_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl BackendConfig {
    pub fn connect(&self) -> Box<dyn ModelBackend> {
        match self {
            BackendConfig::Local => local_backend(),
            BackendConfig::Remote { url, model } => Box::new(RemoteModel::new(url, model)),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_backend() -> Box<dyn ModelBackend> {
    Box::new(crate::bridge::LocalModel)
}

#[cfg(not(target_arch = "wasm32"))]
fn local_backend() -> Box<dyn ModelBackend> {
    Box::new(UnavailableModel {
        reason: "the in-browser model only exists in the extension build".to_string(),
    })
}

/// Stand-in for a backend that cannot run on this target
pub struct UnavailableModel {
    reason: String,
}

#[async_trait(?Send)]
impl ModelBackend for UnavailableModel {
    async fn infer(&self, _prompt: &str) -> Result<String, BackendError> {
        Err(BackendError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Model server reached over HTTP (Ollama-style `/api/generate`)
pub struct RemoteModel {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl RemoteModel {
    pub fn new(url: &str, model: &str) -> Self {
        RemoteModel {
            client: reqwest::Client::new(),
            url: url.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ModelBackend for RemoteModel {
    async fn infer(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request_body(&self.model, prompt))
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn request_body<'a>(model: &'a str, prompt: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        model,
        prompt,
        stream: false,
    }
}

fn parse_response(body: &str) -> Result<String, BackendError> {
    serde_json::from_str::<GenerateResponse>(body)
        .map(|parsed| parsed.response)
        .map_err(|e| BackendError::Malformed(e.to_string()))
}
