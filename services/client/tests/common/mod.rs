//! An in-process fake of the RAG backend, served with axum on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub request_content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReceivedDelete {
    pub document_id: i64,
    pub request_content_type: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub chats: Mutex<Vec<Value>>,
    pub deletes: Mutex<Vec<ReceivedDelete>>,
    /// When set, the next request of any kind fails with this status and body.
    pub fail_next: Mutex<Option<(u16, String)>>,
    pub next_document_id: Mutex<i64>,
}

impl BackendState {
    pub fn fail_next(&self, status: u16, body: &str) {
        *self.fail_next.lock().unwrap() = Some((status, body.to_string()));
    }

    fn take_failure(&self) -> Option<Response> {
        self.fail_next.lock().unwrap().take().map(|(status, body)| {
            let status = StatusCode::from_u16(status).unwrap();
            (status, [(CONTENT_TYPE, "application/json")], body).into_response()
        })
    }
}

pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

pub async fn spawn_backend() -> FakeBackend {
    let state = Arc::new(BackendState {
        next_document_id: Mutex::new(42),
        ..Default::default()
    });

    let app = Router::new()
        .route("/upload", post(upload_handler))
        .route("/upload/{document_id}", delete(delete_handler))
        .route("/chat", post(chat_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

fn header(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn upload_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Some(failure) = state.take_failure() {
        return failure;
    }

    let mut file_name = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let upload = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            request_content_type: header(&headers, CONTENT_TYPE).unwrap_or_default(),
            bytes: field.bytes().await.unwrap().to_vec(),
        };
        file_name = upload.file_name.clone();
        state.uploads.lock().unwrap().push(upload);
    }

    let document_id = {
        let mut next = state.next_document_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    };
    Json(json!({ "document_id": document_id, "filename": file_name })).into_response()
}

async fn chat_handler(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state.take_failure() {
        return failure;
    }
    let message = body["message"].as_str().unwrap_or_default().to_string();
    state.chats.lock().unwrap().push(body);

    Json(json!({
        "answer": format!("You asked: {}", message),
        "citations": [
            { "snippet": "X is...", "page_number": 3 },
            { "snippet": "Later on", "page_number": 1 }
        ]
    }))
    .into_response()
}

async fn delete_handler(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(document_id): Path<i64>,
) -> Response {
    if let Some(failure) = state.take_failure() {
        return failure;
    }
    state.deletes.lock().unwrap().push(ReceivedDelete {
        document_id,
        request_content_type: header(&headers, CONTENT_TYPE),
    });
    Json(json!({ "status": "deleted" })).into_response()
}
