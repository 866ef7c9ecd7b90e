//! crates/docchat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any transport, storage or rendering format.

use bytes::Bytes;
use std::fmt;

/// The only media type accepted through drag-and-drop.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

//=========================================================================================
// Documents
//=========================================================================================

/// The server-side identifier of a processed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a file reached the client. Only drag-and-drop is type-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    Picker,
    DragDrop,
}

/// A file selected by the user but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    /// The declared media type, if the source reported one.
    pub media_type: Option<String>,
    pub contents: Bytes,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, contents: Bytes) -> Self {
        Self {
            name: name.into(),
            media_type,
            contents,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }
}

/// What the backend returns after processing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub document_id: DocumentId,
    pub filename: String,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A snippet of the source document backing part of an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub snippet: String,
    pub page_number: u32,
}

/// A single entry of the chat transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub citations: Vec<Citation>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations,
        }
    }
}

/// The answer the backend produced for one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

//=========================================================================================
// Notices
//=========================================================================================

/// Status events and transient user-facing notices emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Processing { file_name: String },
    Ready { file_name: String },
    UploadFailed { detail: String },
    Removed,
    RemoveFailed { detail: String },
    Conflict { message: String },
    InvalidInput { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Processing { file_name } => write!(f, "Processing {}...", file_name),
            Notice::Ready { file_name } => write!(f, "{} is ready. Start chatting!", file_name),
            Notice::UploadFailed { detail } => write!(f, "Upload failed: {}", detail),
            Notice::Removed => write!(f, "Document removed."),
            Notice::RemoveFailed { detail } => write!(f, "Could not remove document: {}", detail),
            Notice::Conflict { message } | Notice::InvalidInput { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

//=========================================================================================
// Layout geometry
//=========================================================================================

/// A screen-space rectangle, in the same units the layout reports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Grows the rectangle outward by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            top: self.top - margin,
            left: self.left - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, rect: &Rect) -> bool {
        rect.top >= 0.0 && rect.left >= 0.0 && rect.bottom() <= self.height && rect.right() <= self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_drop_type_check_is_case_insensitive() {
        let upper = StagedFile::new("a.pdf", Some("APPLICATION/PDF".into()), Bytes::new());
        let missing = StagedFile::new("a.pdf", None, Bytes::new());
        assert!(upper.is_pdf());
        assert!(!missing.is_pdf());
    }

    #[test]
    fn expand_is_constant_padding() {
        let r = Rect::new(100.0, 50.0, 200.0, 40.0).expand(8.0);
        assert_eq!(r, Rect::new(92.0, 42.0, 216.0, 56.0));
    }

    #[test]
    fn viewport_containment() {
        let vp = Viewport::new(800.0, 600.0);
        assert!(vp.contains(&Rect::new(10.0, 10.0, 100.0, 100.0)));
        assert!(!vp.contains(&Rect::new(550.0, 10.0, 100.0, 100.0)));
        assert!(!vp.contains(&Rect::new(-5.0, 10.0, 100.0, 100.0)));
    }
}
