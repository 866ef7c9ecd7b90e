//! crates/docchat_core/src/session.rs
//!
//! The session controller: owns the single active document, the staged file and the
//! chat transcript, and is the only place that issues calls to the `DocumentService`.
//!
//! State lives behind a `tokio::sync::Mutex` that is only held around synchronous
//! updates, never across a network await. Single-flight is enforced by state flags,
//! so a second request of the same kind is refused instead of queued.

use crate::domain::{ChatTurn, DocumentId, FileOrigin, Notice, StagedFile};
use crate::ports::{DocumentService, NoticeSink, PortError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Assistant turn appended when a chat call fails.
pub const CHAT_FAILURE_NOTICE: &str =
    "Sorry, I couldn't get an answer from the server. Please try again.";

const ACTIVE_DOCUMENT_CONFLICT: &str = "Remove the current document before uploading a new one.";
const UPLOAD_IN_FLIGHT_CONFLICT: &str = "A document is already being processed.";
const ALREADY_STAGED_CONFLICT: &str = "A file is already selected. Clear it before choosing another.";
const NOT_A_PDF: &str = "Only PDF files are supported.";

fn greeting_for(file_name: &str) -> String {
    format!("I've processed \"{}\". Ask me anything about it!", file_name)
}

//=========================================================================================
// Errors and outcomes
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A second document was proposed while one is active, staged or uploading.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("No file is staged for upload")]
    NothingStaged,
    /// The same kind of request is already outstanding.
    #[error("The previous request is still in progress")]
    InFlight,
    #[error(transparent)]
    Transport(#[from] PortError),
}

/// What happened to a `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The answer was appended to the transcript.
    Answered,
    /// The call failed and a failure notice was appended instead.
    Absorbed,
    /// Nothing was sent: empty text, no active document, or a chat call outstanding.
    Ignored,
    /// The answer arrived after its document was removed and was discarded.
    Dropped,
}

/// A staged file that has left the staged slot and awaits its upload call.
#[derive(Debug)]
pub struct PendingUpload {
    file: StagedFile,
}

/// A message already echoed into the transcript, awaiting its answer.
#[derive(Debug)]
pub struct PendingMessage {
    text: String,
    document_id: DocumentId,
    generation: u64,
}

//=========================================================================================
// State
//=========================================================================================

#[derive(Debug, Clone)]
struct ActiveDocument {
    id: DocumentId,
    file_name: String,
}

#[derive(Debug, Default)]
struct SessionState {
    // Id and name are one value so they are always set and cleared together.
    active: Option<ActiveDocument>,
    pending_file: Option<StagedFile>,
    transcript: Vec<ChatTurn>,
    busy: bool,
    uploading: bool,
    removing: bool,
    // Bumped on every activation so late replies can tell documents apart.
    generation: u64,
}

/// Where the session sits on the document axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPhase {
    Empty,
    Staged,
    Uploading,
    Active,
}

/// A read-only copy of the session, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub document_id: Option<DocumentId>,
    pub file_name: Option<String>,
    pub staged_file_name: Option<String>,
    pub transcript: Vec<ChatTurn>,
    pub busy: bool,
    pub uploading: bool,
    pub removing: bool,
}

impl SessionSnapshot {
    pub fn phase(&self) -> DocumentPhase {
        if self.document_id.is_some() {
            DocumentPhase::Active
        } else if self.uploading {
            DocumentPhase::Uploading
        } else if self.staged_file_name.is_some() {
            DocumentPhase::Staged
        } else {
            DocumentPhase::Empty
        }
    }

    /// Whether the send affordance should be enabled.
    pub fn can_send(&self) -> bool {
        self.document_id.is_some() && !self.busy
    }
}

//=========================================================================================
// Controller
//=========================================================================================

pub struct SessionController {
    state: Mutex<SessionState>,
    service: Arc<dyn DocumentService>,
    notices: Arc<dyn NoticeSink>,
}

impl SessionController {
    pub fn new(service: Arc<dyn DocumentService>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            service,
            notices,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            document_id: state.active.as_ref().map(|d| d.id),
            file_name: state.active.as_ref().map(|d| d.file_name.clone()),
            staged_file_name: state.pending_file.as_ref().map(|f| f.name.clone()),
            transcript: state.transcript.clone(),
            busy: state.busy,
            uploading: state.uploading,
            removing: state.removing,
        }
    }

    /// Stages a file for upload. Drag-and-drop entries must declare the PDF media type;
    /// picker entries are not filtered.
    pub async fn stage_file(&self, file: StagedFile, origin: FileOrigin) -> Result<(), SessionError> {
        let rejection = {
            let mut state = self.state.lock().await;
            let conflict = if state.active.is_some() {
                Some(ACTIVE_DOCUMENT_CONFLICT)
            } else if state.uploading {
                Some(UPLOAD_IN_FLIGHT_CONFLICT)
            } else if state.pending_file.is_some() {
                Some(ALREADY_STAGED_CONFLICT)
            } else {
                None
            };

            match conflict {
                Some(message) => Some(SessionError::Conflict(message.to_string())),
                None if origin == FileOrigin::DragDrop && !file.is_pdf() => {
                    Some(SessionError::InvalidInput(NOT_A_PDF.to_string()))
                }
                None => {
                    info!("Staged '{}' ({:?}).", file.name, origin);
                    state.pending_file = Some(file);
                    None
                }
            }
        };

        match rejection {
            None => Ok(()),
            Some(err) => {
                warn!("Rejected staged file: {}", err);
                let message = err.to_string();
                self.notices.emit(match err {
                    SessionError::InvalidInput(_) => Notice::InvalidInput { message },
                    _ => Notice::Conflict { message },
                });
                Err(err)
            }
        }
    }

    /// Clears the staged file, if any.
    pub async fn unstage_file(&self) {
        let mut state = self.state.lock().await;
        if let Some(file) = state.pending_file.take() {
            info!("Unstaged '{}'.", file.name);
        }
    }

    /// Moves the staged file into flight and emits the processing notice. The staged
    /// slot is emptied before anything is sent.
    pub async fn begin_upload(&self) -> Result<PendingUpload, SessionError> {
        let file = {
            let mut state = self.state.lock().await;
            if state.uploading {
                return Err(SessionError::InFlight);
            }
            let file = state.pending_file.take().ok_or(SessionError::NothingStaged)?;
            state.uploading = true;
            file
        };

        info!("Uploading '{}' ({} bytes).", file.name, file.contents.len());
        self.notices.emit(Notice::Processing {
            file_name: file.name.clone(),
        });
        Ok(PendingUpload { file })
    }

    /// Issues the upload call for a file taken by `begin_upload`.
    pub async fn finish_upload(&self, pending: PendingUpload) -> Result<DocumentId, SessionError> {
        let file = pending.file;
        let result = self.service.upload(&file).await;

        let mut state = self.state.lock().await;
        state.uploading = false;
        match result {
            Ok(receipt) => {
                state.generation += 1;
                state.active = Some(ActiveDocument {
                    id: receipt.document_id,
                    file_name: file.name.clone(),
                });
                state
                    .transcript
                    .push(ChatTurn::assistant(greeting_for(&file.name), Vec::new()));
                drop(state);

                info!("Document {} is ready as '{}'.", receipt.document_id, file.name);
                self.notices.emit(Notice::Ready {
                    file_name: file.name,
                });
                Ok(receipt.document_id)
            }
            Err(e) => {
                drop(state);
                error!("Upload of '{}' failed: {}", file.name, e);
                self.notices.emit(Notice::UploadFailed {
                    detail: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Uploads the staged file.
    pub async fn commit_upload(&self) -> Result<DocumentId, SessionError> {
        let pending = self.begin_upload().await?;
        self.finish_upload(pending).await
    }

    /// Echoes the message into the transcript and marks the session busy. Returns
    /// `None` when nothing may be sent: empty text, no active document, or a chat call
    /// already outstanding.
    pub async fn begin_message(&self, text: &str) -> Option<PendingMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let mut state = self.state.lock().await;
        let document_id = state.active.as_ref().map(|d| d.id)?;
        if state.busy {
            return None;
        }
        state.transcript.push(ChatTurn::user(text));
        state.busy = true;
        Some(PendingMessage {
            text: text.to_string(),
            document_id,
            generation: state.generation,
        })
    }

    /// Asks the backend about a message started with `begin_message`. Failures are
    /// folded into the transcript, never returned.
    pub async fn complete_message(&self, pending: PendingMessage) -> SendOutcome {
        let result = self.service.chat(&pending.text, pending.document_id).await;

        let mut state = self.state.lock().await;
        state.busy = false;

        // Ids can be reused by the backend, so staleness is judged by activation.
        if state.active.is_none() || state.generation != pending.generation {
            warn!(
                "Dropping chat reply for document {} which is no longer active.",
                pending.document_id
            );
            return SendOutcome::Dropped;
        }

        match result {
            Ok(answer) => {
                info!(
                    "Answer received with {} citation(s).",
                    answer.citations.len()
                );
                state
                    .transcript
                    .push(ChatTurn::assistant(answer.answer, answer.citations));
                SendOutcome::Answered
            }
            Err(e) => {
                warn!("Chat call failed: {}", e);
                state
                    .transcript
                    .push(ChatTurn::assistant(CHAT_FAILURE_NOTICE, Vec::new()));
                SendOutcome::Absorbed
            }
        }
    }

    /// Echoes the message and asks the backend about the active document.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin_message(text).await {
            Some(pending) => self.complete_message(pending).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Deletes the active document on the server. Local state is only cleared once the
    /// server confirms, so a failed removal can be retried.
    pub async fn remove_document(&self) -> Result<(), SessionError> {
        let document_id = {
            let mut state = self.state.lock().await;
            let Some(document_id) = state.active.as_ref().map(|d| d.id) else {
                return Ok(());
            };
            if state.removing {
                return Err(SessionError::InFlight);
            }
            state.removing = true;
            document_id
        };

        info!("Removing document {}.", document_id);
        let result = self.service.delete(document_id).await;

        let mut state = self.state.lock().await;
        state.removing = false;
        match result {
            Ok(()) => {
                state.active = None;
                state.transcript.clear();
                drop(state);
                info!("Document {} removed.", document_id);
                self.notices.emit(Notice::Removed);
                Ok(())
            }
            Err(e) => {
                drop(state);
                error!("Removal of document {} failed: {}", document_id, e);
                self.notices.emit(Notice::RemoveFailed {
                    detail: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}
