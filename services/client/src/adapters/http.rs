//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the backend RAG service.
//! It implements the `DocumentService` port from the `core` crate.

use async_trait::async_trait;
use docchat_core::{
    ChatAnswer, Citation, DocumentId, DocumentService, PortError, PortResult, StagedFile,
    UploadReceipt,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    multipart::{Form, Part},
    Client, Response,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

//=========================================================================================
// Wire Payloads
//=========================================================================================

#[derive(Deserialize)]
struct UploadResponse {
    document_id: i64,
    filename: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    document_id: i64,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
    #[serde(default)]
    citations: Vec<CitationPayload>,
}

#[derive(Deserialize)]
struct CitationPayload {
    snippet: String,
    page_number: u32,
}

impl CitationPayload {
    fn to_domain(self) -> Citation {
        Citation {
            snippet: self.snippet,
            page_number: self.page_number,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentService` over the backend's REST API.
#[derive(Clone)]
pub struct HttpDocumentService {
    client: Client,
    base_url: String,
}

impl HttpDocumentService {
    /// Creates a new `HttpDocumentService`. Every request defaults to a JSON content
    /// type; the upload overrides it with its multipart boundary.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into `PortError::Rejected` carrying the body as-is.
    async fn check(response: Response) -> PortResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let payload = response.text().await.map_err(transport)?;
        error!("Backend returned {}: {}", status, payload);
        Err(PortError::Rejected {
            status: status.as_u16(),
            payload,
        })
    }
}

fn transport(e: reqwest::Error) -> PortError {
    PortError::Transport(e.to_string())
}

fn decode(e: reqwest::Error) -> PortError {
    PortError::Unexpected(format!("Malformed response body: {}", e))
}

//=========================================================================================
// `DocumentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn upload(&self, file: &StagedFile) -> PortResult<UploadReceipt> {
        let mut part = Part::bytes(file.contents.to_vec()).file_name(file.name.clone());
        if let Some(media_type) = &file.media_type {
            part = part
                .mime_str(media_type)
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let form = Form::new().part("file", part);

        debug!("POST /upload ({} bytes)", file.contents.len());
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let body: UploadResponse = Self::check(response).await?.json().await.map_err(decode)?;
        Ok(UploadReceipt {
            document_id: DocumentId(body.document_id),
            filename: body.filename,
        })
    }

    async fn chat(&self, message: &str, document_id: DocumentId) -> PortResult<ChatAnswer> {
        debug!("POST /chat for document {}", document_id);
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&ChatRequest {
                message,
                document_id: document_id.0,
            })
            .send()
            .await
            .map_err(transport)?;

        let body: ChatResponse = Self::check(response).await?.json().await.map_err(decode)?;
        Ok(ChatAnswer {
            answer: body.answer,
            citations: body
                .citations
                .into_iter()
                .map(CitationPayload::to_domain)
                .collect(),
        })
    }

    async fn delete(&self, document_id: DocumentId) -> PortResult<()> {
        debug!("DELETE /upload/{}", document_id);
        let response = self
            .client
            .delete(self.url(&format!("/upload/{}", document_id)))
            .send()
            .await
            .map_err(transport)?;

        Self::check(response).await?;
        Ok(())
    }
}
