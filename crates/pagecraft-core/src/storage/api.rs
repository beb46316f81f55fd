//! HTTP storage backed by the PageCraft API server.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::page::PageContent;
use crate::registry::{ComponentPrototype, PrototypeId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const PAGE_PATH: &str = "/api/page";
const COMPONENTS_PATH: &str = "/api/components";
const DELETE_COMPONENT_PATH: &str = "/api/components/delete";

/// Envelope for every API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Storage that talks to a remote API server.
#[derive(Debug, Clone)]
pub struct ApiStorage {
    client: reqwest::Client,
    base_url: String,
}

fn transport_error(e: reqwest::Error) -> StorageError {
    StorageError::Io(format!("Request failed: {}", e))
}

fn status_error(status: u16, message: String) -> StorageError {
    match status {
        404 => StorageError::NotFound(message),
        400 | 422 => StorageError::Serialization(message),
        _ => StorageError::Other(message),
    }
}

/// Unwrap an API envelope. `success: false` becomes an error chosen by status.
pub(crate) fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> StorageResult<T> {
    let envelope: ApiResponse<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(StorageError::Serialization(format!("Invalid response: {}", e)));
        }
        // Framework rejections are plain text
        Err(_) => return Err(status_error(status, String::from_utf8_lossy(body).into_owned())),
    };

    if !envelope.success {
        let message = envelope
            .error
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        return Err(status_error(status, message));
    }

    match envelope.data {
        Some(data) => Ok(data),
        // Unit payloads arrive as null
        None => serde_json::from_value(serde_json::Value::Null)
            .map_err(|_| StorageError::Serialization("Response has no data".to_string())),
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> StorageResult<T> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport_error)?;
    decode_envelope(status, &body)
}

impl ApiStorage {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client around a preconfigured `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        log::debug!("GET {}", url);
        self.client.get(url)
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        let url = self.url(path);
        log::debug!("POST {}", url);
        self.client.post(url).json(body)
    }
}

impl Storage for ApiStorage {
    fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>> {
        let request = self.get(PAGE_PATH);
        Box::pin(send(request))
    }

    fn save_page(&self, page: &PageContent) -> BoxFuture<'_, StorageResult<()>> {
        let request = self.post(PAGE_PATH, page);
        Box::pin(send(request))
    }

    fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>> {
        let request = self.get(COMPONENTS_PATH);
        Box::pin(send(request))
    }

    fn save_component(&self, prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>> {
        let request = self.post(COMPONENTS_PATH, prototype);
        Box::pin(send(request))
    }

    fn delete_component(&self, id: PrototypeId) -> BoxFuture<'_, StorageResult<()>> {
        let request = self.post(DELETE_COMPONENT_PATH, &id);
        Box::pin(send(request))
    }
}
