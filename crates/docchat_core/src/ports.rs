//! crates/docchat_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the HTTP stack, the storage medium and the renderer.

use async_trait::async_trait;
use crate::domain::{ChatAnswer, DocumentId, Notice, Rect, StagedFile, UploadReceipt, Viewport};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The server answered with an error status; `payload` is its body, verbatim.
    #[error("{payload}")]
    Rejected { status: u16, payload: String },
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The backend RAG service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Uploads one file for processing and returns its server-side identifier.
    async fn upload(&self, file: &StagedFile) -> PortResult<UploadReceipt>;

    /// Asks a question about the given document.
    async fn chat(&self, message: &str, document_id: DocumentId) -> PortResult<ChatAnswer>;

    /// Deletes the document and everything derived from it.
    async fn delete(&self, document_id: DocumentId) -> PortResult<()>;
}

/// Persistent per-profile record of whether the onboarding tour was completed.
pub trait TourProgressStore: Send + Sync {
    fn is_completed(&self) -> bool;

    /// Must be idempotent.
    fn mark_completed(&self) -> PortResult<()>;
}

/// Live geometry of the rendered view.
pub trait AnchorLayout: Send + Sync {
    /// Returns the bounding box of the named anchor, or `None` if it is not rendered.
    fn measure(&self, anchor: &str) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    /// Scrolls the view so the anchor sits in the viewport's center.
    fn scroll_into_view(&self, anchor: &str);
}

/// Display sink for status events and transient notices.
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: Notice);
}
