//! services/client/src/app/render.rs
//!
//! Turns session snapshots and tour overlays into terminal text.

use docchat_core::{ChatTurn, DocumentPhase, Role, SessionSnapshot, TourOverlay};
use std::fmt::Write;
use std::path::Path;

pub const HELP_TEXT: &str = "\
Commands:
  pick <path>        select a file (any type)
  drop <path>        drop a PDF onto the upload area
  sample             select the sample document
  view-sample        show where the sample document is
  unstage            clear the selected file
  upload             process the selected file
  ask <question>     ask about the active document
  remove             delete the active document
  next | skip | finish   drive the onboarding tour
  tour               show the current tour step
  resize <w> <h>     change the viewport size
  show               print status and transcript
  info               how the assistant works
  quit";

pub const NO_SAMPLE: &str = "No sample document is configured (set DOCCHAT_SAMPLE_PDF).";

const INFO_STAGES: [(&str, &str); 4] = [
    (
        "Document Loading",
        "Every sentence of the uploaded PDF is extracted and cleaned up before the AI sees it.",
    ),
    (
        "Knowledge Mapping",
        "The text is turned into embeddings, a semantic map of what the document means.",
    ),
    (
        "Smart Retrieval",
        "Each question pulls the passages most relevant to it from that map.",
    ),
    (
        "Grounded Answers",
        "Answers are written from the retrieved passages only, with page citations.",
    ),
];

/// The "How it works" panel.
pub fn info_text() -> String {
    let mut out = String::from(
        "How the assistant works (RAG: retrieval-augmented generation)\n",
    );
    for (i, (title, description)) in INFO_STAGES.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", i + 1, title, description);
    }
    out
}

pub fn sample_preview(path: &Path, size_bytes: u64) -> String {
    format!(
        "Sample document: {} ({:.1} KB). Open it in any PDF viewer, or type `sample` to select it.",
        path.display(),
        size_bytes as f64 / 1024.0
    )
}

pub fn turn(turn: &ChatTurn) -> String {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut out = format!("{}> {}", speaker, turn.content);
    for citation in &turn.citations {
        let _ = write!(out, "\n    [p. {}] {}", citation.page_number, citation.snippet);
    }
    out
}

pub fn transcript(turns: &[ChatTurn]) -> String {
    if turns.is_empty() {
        return "(no messages yet)".to_string();
    }
    turns.iter().map(turn).collect::<Vec<_>>().join("\n")
}

pub fn status(snapshot: &SessionSnapshot) -> String {
    let document = match snapshot.phase() {
        DocumentPhase::Empty => "no document".to_string(),
        DocumentPhase::Staged => format!(
            "selected: {} (type `upload`)",
            snapshot.staged_file_name.as_deref().unwrap_or_default()
        ),
        DocumentPhase::Uploading => "processing upload...".to_string(),
        DocumentPhase::Active => format!(
            "active: {} (id {})",
            snapshot.file_name.as_deref().unwrap_or_default(),
            snapshot
                .document_id
                .map(|id| id.to_string())
                .unwrap_or_default()
        ),
    };
    let mut out = format!("Document: {}", document);
    if snapshot.busy {
        out.push_str("\nThinking...");
    }
    if snapshot.removing {
        out.push_str("\nRemoving document...");
    }
    out
}

pub fn overlay(overlay: &TourOverlay) -> String {
    let s = &overlay.spotlight;
    format!(
        "== {} == {}\n{}\n(spotlight {:.0},{:.0} {:.0}x{:.0}; panel at {:.0},{:.0})\n[skip] [{}]",
        overlay.caption,
        overlay.title,
        overlay.body,
        s.left,
        s.top,
        s.width,
        s.height,
        overlay.panel.left,
        overlay.panel.top,
        overlay.action.label(),
    )
}
