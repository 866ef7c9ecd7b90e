//! services/client/src/adapters/layout.rs
//!
//! The page model of the terminal view. It lays out the named regions of the page the
//! same way for every viewport size, tracks the scroll position, and implements the
//! `AnchorLayout` port so the tour can measure anchors in viewport coordinates.

use docchat_core::{AnchorLayout, Rect, Viewport};
use std::sync::Mutex;

pub const ANCHOR_DROPZONE: &str = "step-dropzone";
pub const ANCHOR_TRY_SAMPLE: &str = "step-try-sample";
pub const ANCHOR_VIEW_SAMPLE: &str = "step-view-sample";
pub const ANCHOR_UPLOAD_BUTTON: &str = "step-upload-btn";
pub const ANCHOR_CHAT: &str = "step-chat";
pub const ANCHOR_HELP: &str = "step-help";

const PAGE_GUTTER: f64 = 24.0;
const MAX_CONTENT_WIDTH: f64 = 768.0;
const HEADER_HEIGHT: f64 = 72.0;
const SECTION_GAP: f64 = 16.0;
const DROPZONE_HEIGHT: f64 = 200.0;
const BUTTON_HEIGHT: f64 = 40.0;
const SAMPLE_BUTTON_WIDTH: f64 = 160.0;
const UPLOAD_BUTTON_HEIGHT: f64 = 48.0;
const CHAT_HEIGHT: f64 = 560.0;
const HELP_BUTTON_SIZE: f64 = 40.0;

#[derive(Debug)]
struct LayoutState {
    viewport: Viewport,
    scroll_top: f64,
    document_active: bool,
}

/// Page geometry for the terminal view.
#[derive(Debug)]
pub struct TerminalLayout {
    state: Mutex<LayoutState>,
}

impl TerminalLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: Mutex::new(LayoutState {
                viewport,
                scroll_top: 0.0,
                document_active: false,
            }),
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        let mut state = self.lock();
        state.viewport = viewport;
        state.scroll_top = clamp_scroll(&state, state.scroll_top);
    }

    /// While a document is active the upload controls are not rendered and the chat
    /// panel moves up into their place.
    pub fn set_document_active(&self, active: bool) {
        let mut state = self.lock();
        state.document_active = active;
        state.scroll_top = clamp_scroll(&state, state.scroll_top);
    }

    pub fn scroll_top(&self) -> f64 {
        self.lock().scroll_top
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LayoutState> {
        // A poisoned lock only means a panic elsewhere; the geometry is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Returns the rectangle of `anchor` in page coordinates, if it is rendered.
fn page_rect(state: &LayoutState, anchor: &str) -> Option<Rect> {
    let vw = state.viewport.width;
    let content_width = (vw - 2.0 * PAGE_GUTTER).clamp(0.0, MAX_CONTENT_WIDTH);
    let left = (vw - content_width) / 2.0;

    let dropzone_top = HEADER_HEIGHT + SECTION_GAP;
    let samples_top = dropzone_top + DROPZONE_HEIGHT + SECTION_GAP;
    let upload_top = samples_top + BUTTON_HEIGHT + SECTION_GAP;
    let chat_top = if state.document_active {
        dropzone_top
    } else {
        upload_top + UPLOAD_BUTTON_HEIGHT + SECTION_GAP * 2.0
    };

    let rect = match anchor {
        ANCHOR_HELP => Rect::new(
            (HEADER_HEIGHT - HELP_BUTTON_SIZE) / 2.0,
            left + content_width - HELP_BUTTON_SIZE,
            HELP_BUTTON_SIZE,
            HELP_BUTTON_SIZE,
        ),
        ANCHOR_DROPZONE if !state.document_active => {
            Rect::new(dropzone_top, left, content_width, DROPZONE_HEIGHT)
        }
        ANCHOR_TRY_SAMPLE => Rect::new(samples_top, left, SAMPLE_BUTTON_WIDTH, BUTTON_HEIGHT),
        ANCHOR_VIEW_SAMPLE => Rect::new(
            samples_top,
            left + SAMPLE_BUTTON_WIDTH + SECTION_GAP,
            SAMPLE_BUTTON_WIDTH,
            BUTTON_HEIGHT,
        ),
        ANCHOR_UPLOAD_BUTTON if !state.document_active => {
            Rect::new(upload_top, left, content_width, UPLOAD_BUTTON_HEIGHT)
        }
        ANCHOR_CHAT => Rect::new(chat_top, left, content_width, CHAT_HEIGHT),
        _ => return None,
    };
    Some(rect)
}

fn page_height(state: &LayoutState) -> f64 {
    page_rect(state, ANCHOR_CHAT)
        .map(|chat| chat.bottom() + PAGE_GUTTER * 2.0)
        .unwrap_or(state.viewport.height)
}

fn clamp_scroll(state: &LayoutState, scroll_top: f64) -> f64 {
    let max = (page_height(state) - state.viewport.height).max(0.0);
    scroll_top.clamp(0.0, max)
}

impl AnchorLayout for TerminalLayout {
    fn measure(&self, anchor: &str) -> Option<Rect> {
        let state = self.lock();
        page_rect(&state, anchor).map(|r| Rect {
            top: r.top - state.scroll_top,
            ..r
        })
    }

    fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    fn scroll_into_view(&self, anchor: &str) {
        let mut state = self.lock();
        if let Some(rect) = page_rect(&state, anchor) {
            let centered = rect.top + rect.height / 2.0 - state.viewport.height / 2.0;
            state.scroll_top = clamp_scroll(&state, centered);
        }
    }
}
