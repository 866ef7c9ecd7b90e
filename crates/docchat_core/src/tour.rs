//! crates/docchat_core/src/tour.rs
//!
//! The onboarding tour: walks a fixed script of named anchors and derives the
//! spotlight and info-panel geometry for the current one from live layout.
//! Nothing here suspends; every measurement is a synchronous layout query.

use crate::domain::{Rect, Viewport};
use crate::ports::{AnchorLayout, TourProgressStore};
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info, warn};

/// Outward margin added on every side of the anchor to form the spotlight.
pub const SPOTLIGHT_PADDING: f64 = 8.0;
/// Vertical gap between the anchor and a panel placed below it.
pub const PANEL_GAP: f64 = 24.0;
/// Space the panel needs; also its offset when flipped above the anchor.
pub const PANEL_HEIGHT: f64 = 200.0;
pub const PANEL_HALF_WIDTH: f64 = 175.0;
/// Minimum distance between the panel and the left viewport edge.
pub const PANEL_EDGE_MARGIN: f64 = 24.0;
/// Panel width plus its right-hand margin.
pub const PANEL_RIGHT_RESERVE: f64 = 375.0;

//=========================================================================================
// Script
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourStep {
    pub anchor: String,
    pub title: String,
    pub body: String,
}

impl TourStep {
    pub fn new(anchor: &str, title: &str, body: &str) -> Self {
        Self {
            anchor: anchor.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// The built-in onboarding script, in display order.
pub fn default_script() -> Vec<TourStep> {
    vec![
        TourStep::new(
            "step-dropzone",
            "Upload Area",
            "Drag and drop your PDF documents here to start.",
        ),
        TourStep::new(
            "step-try-sample",
            "Sample Document",
            "Don't have a PDF? Try it out with our sample file!",
        ),
        TourStep::new(
            "step-view-sample",
            "Preview",
            "You can view the sample file before uploading anything.",
        ),
        TourStep::new(
            "step-upload-btn",
            "Process Document",
            "After selecting a file, click here to process it for RAG.",
        ),
        TourStep::new(
            "step-chat",
            "Chat Interface",
            "Ask questions about your uploaded documents here.",
        ),
        TourStep::new(
            "step-help",
            "How it works",
            "Click here anytime to learn more about the RAG system.",
        ),
    ]
}

//=========================================================================================
// Geometry
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPosition {
    pub top: f64,
    pub left: f64,
}

pub fn spotlight(anchor: &Rect) -> Rect {
    anchor.expand(SPOTLIGHT_PADDING)
}

/// Places the info panel below the anchor, or above it when it would come too close
/// to the bottom edge. Horizontally centered on the anchor, clamped to the viewport.
pub fn panel_position(anchor: &Rect, viewport: &Viewport) -> PanelPosition {
    let below = anchor.bottom() + PANEL_GAP;
    let top = if below > viewport.height - PANEL_HEIGHT {
        anchor.top - PANEL_HEIGHT
    } else {
        below
    };

    // Right clamp applied last: on narrow viewports it wins over the left margin.
    let left = (anchor.center_x() - PANEL_HALF_WIDTH)
        .max(PANEL_EDGE_MARGIN)
        .min(viewport.width - PANEL_RIGHT_RESERVE);

    PanelPosition { top, left }
}

//=========================================================================================
// Overlay model
//=========================================================================================

/// The button that moves the tour forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Finish,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Next => "Next Step",
            PrimaryAction::Finish => "Get Started",
        }
    }
}

/// Everything the view needs to draw the tour for the current step.
#[derive(Debug, Clone, PartialEq)]
pub struct TourOverlay {
    pub caption: String,
    pub title: String,
    pub body: String,
    pub spotlight: Rect,
    pub panel: PanelPosition,
    pub action: PrimaryAction,
}

/// Scope of the "while the tour is visible" viewport listener.
///
/// The event loop forwards resize events to the tour only while this is active;
/// it is cancelled when the tour finishes or is skipped.
#[derive(Debug, Clone)]
pub struct ViewportSubscription {
    token: CancellationToken,
}

impl ViewportSubscription {
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Resolves once the subscription's scope has ended.
    pub fn ended(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

//=========================================================================================
// Engine
//=========================================================================================

pub struct TourGuide {
    script: Vec<TourStep>,
    step_index: usize,
    anchor_geometry: Rect,
    visible: bool,
    completed: bool,
    subscription: Option<CancellationToken>,
    layout: Arc<dyn AnchorLayout>,
    store: Arc<dyn TourProgressStore>,
}

impl TourGuide {
    /// Reads the completion record once; it is not consulted again.
    pub fn new(
        script: Vec<TourStep>,
        layout: Arc<dyn AnchorLayout>,
        store: Arc<dyn TourProgressStore>,
    ) -> Self {
        let completed = store.is_completed();
        Self {
            script,
            step_index: 0,
            anchor_geometry: Rect::default(),
            visible: false,
            completed,
            subscription: None,
            layout,
            store,
        }
    }

    /// Shows the tour from its first step, unless it was already completed or skipped.
    pub fn start(&mut self) -> Option<ViewportSubscription> {
        if self.completed || self.visible || self.script.is_empty() {
            return None;
        }

        info!("Starting onboarding tour ({} steps).", self.script.len());
        self.step_index = 0;
        self.visible = true;
        self.locate_current();

        let token = CancellationToken::new();
        self.subscription = Some(token.clone());
        Some(ViewportSubscription { token })
    }

    /// Moves to the next step. Returns `false` on the last step, where the primary
    /// action is `Finish` instead.
    pub fn advance(&mut self) -> bool {
        if !self.visible || self.step_index + 1 >= self.script.len() {
            return false;
        }
        self.step_index += 1;
        debug!("Tour step {} of {}.", self.step_index + 1, self.script.len());
        self.locate_current();
        true
    }

    pub fn finish(&mut self) {
        self.close("finished");
    }

    pub fn skip(&mut self) {
        self.close("skipped");
    }

    /// Recomputes the current anchor's geometry without changing the step.
    pub fn remeasure(&mut self) {
        if !self.visible {
            return;
        }
        let anchor = &self.script[self.step_index].anchor;
        self.anchor_geometry = self.layout.measure(anchor).unwrap_or_default();
    }

    pub fn overlay(&self) -> Option<TourOverlay> {
        if !self.visible {
            return None;
        }
        let step = &self.script[self.step_index];
        let viewport = self.layout.viewport();
        Some(TourOverlay {
            caption: format!("Step {} of {}", self.step_index + 1, self.script.len()),
            title: step.title.clone(),
            body: step.body.clone(),
            spotlight: spotlight(&self.anchor_geometry),
            panel: panel_position(&self.anchor_geometry, &viewport),
            action: self.primary_action(),
        })
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.step_index + 1 >= self.script.len() {
            PrimaryAction::Finish
        } else {
            PrimaryAction::Next
        }
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_count(&self) -> usize {
        self.script.len()
    }

    pub fn anchor_geometry(&self) -> Rect {
        self.anchor_geometry
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn close(&mut self, how: &str) {
        info!("Onboarding tour {} at step {}.", how, self.step_index + 1);
        self.visible = false;
        if let Some(token) = self.subscription.take() {
            token.cancel();
        }
        if let Err(e) = self.store.mark_completed() {
            warn!("Failed to persist tour completion: {}", e);
        }
        self.completed = true;
    }

    /// Measures the current anchor and scrolls it into view when it is not fully visible.
    /// A missing anchor yields an all-zero rectangle.
    fn locate_current(&mut self) {
        let anchor = &self.script[self.step_index].anchor;
        let Some(rect) = self.layout.measure(anchor) else {
            debug!("Tour anchor '{}' is not rendered.", anchor);
            self.anchor_geometry = Rect::default();
            return;
        };

        if self.layout.viewport().contains(&rect) {
            self.anchor_geometry = rect;
        } else {
            self.layout.scroll_into_view(anchor);
            self.anchor_geometry = self.layout.measure(anchor).unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use rstest::rstest;
    use std::collections::HashSet;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeLayout {
        anchors: Mutex<HashMap<String, Rect>>,
        viewport: Mutex<Viewport>,
        scrolled: Mutex<Vec<String>>,
    }

    impl FakeLayout {
        fn new(viewport: Viewport, anchors: &[(&str, Rect)]) -> Self {
            Self {
                anchors: Mutex::new(
                    anchors
                        .iter()
                        .map(|(name, rect)| (name.to_string(), *rect))
                        .collect(),
                ),
                viewport: Mutex::new(viewport),
                scrolled: Mutex::new(Vec::new()),
            }
        }

        fn set(&self, name: &str, rect: Rect) {
            self.anchors.lock().unwrap().insert(name.to_string(), rect);
        }
    }

    impl AnchorLayout for FakeLayout {
        fn measure(&self, anchor: &str) -> Option<Rect> {
            self.anchors.lock().unwrap().get(anchor).copied()
        }

        fn viewport(&self) -> Viewport {
            *self.viewport.lock().unwrap()
        }

        fn scroll_into_view(&self, anchor: &str) {
            self.scrolled.lock().unwrap().push(anchor.to_string());
            let viewport = self.viewport();
            let mut anchors = self.anchors.lock().unwrap();
            if let Some(rect) = anchors.get_mut(anchor) {
                rect.top = (viewport.height - rect.height) / 2.0;
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        completed: AtomicBool,
        writes: AtomicUsize,
        fail: bool,
    }

    impl TourProgressStore for MemoryStore {
        fn is_completed(&self) -> bool {
            self.completed.load(Ordering::SeqCst)
        }

        fn mark_completed(&self) -> PortResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Unexpected("disk full".into()));
            }
            self.completed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn script() -> Vec<TourStep> {
        vec![
            TourStep::new("a", "A", "first"),
            TourStep::new("b", "B", "second"),
            TourStep::new("c", "C", "third"),
        ]
    }

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 800.0)
    }

    fn guide(layout: Arc<FakeLayout>, store: Arc<MemoryStore>) -> TourGuide {
        TourGuide::new(script(), layout, store)
    }

    fn standard_layout() -> Arc<FakeLayout> {
        Arc::new(FakeLayout::new(
            viewport(),
            &[
                ("a", Rect::new(100.0, 100.0, 300.0, 50.0)),
                ("b", Rect::new(200.0, 500.0, 100.0, 40.0)),
                ("c", Rect::new(300.0, 900.0, 200.0, 60.0)),
            ],
        ))
    }

    #[test]
    fn start_measures_first_anchor() {
        let mut tour = guide(standard_layout(), Arc::new(MemoryStore::default()));

        let sub = tour.start().expect("tour should start");

        assert!(sub.is_active());
        assert!(tour.is_visible());
        assert_eq!(tour.step_index(), 0);
        assert_eq!(tour.anchor_geometry(), Rect::new(100.0, 100.0, 300.0, 50.0));
        let overlay = tour.overlay().unwrap();
        assert_eq!(overlay.caption, "Step 1 of 3");
        assert_eq!(overlay.title, "A");
        assert_eq!(overlay.spotlight, Rect::new(92.0, 92.0, 316.0, 66.0));
        assert_eq!(overlay.action, PrimaryAction::Next);
    }

    #[test]
    fn completed_tour_does_not_start() {
        let store = Arc::new(MemoryStore::default());
        store.completed.store(true, Ordering::SeqCst);
        let mut tour = guide(standard_layout(), store);

        assert!(tour.start().is_none());
        assert!(tour.overlay().is_none());
    }

    #[test]
    fn advance_stops_at_last_step() {
        let mut tour = guide(standard_layout(), Arc::new(MemoryStore::default()));
        tour.start();

        assert!(tour.advance());
        assert!(tour.advance());
        assert_eq!(tour.step_index(), 2);
        assert_eq!(tour.primary_action(), PrimaryAction::Finish);
        assert_eq!(tour.primary_action().label(), "Get Started");

        assert!(!tour.advance());
        assert_eq!(tour.step_index(), 2);
        assert_eq!(tour.overlay().unwrap().action, PrimaryAction::Finish);
    }

    #[test]
    fn offscreen_anchor_is_scrolled_and_remeasured() {
        let layout = standard_layout();
        layout.set("b", Rect::new(1500.0, 500.0, 100.0, 40.0));
        let mut tour = guide(layout.clone(), Arc::new(MemoryStore::default()));
        tour.start();

        tour.advance();

        assert_eq!(*layout.scrolled.lock().unwrap(), vec!["b".to_string()]);
        assert_eq!(tour.anchor_geometry(), Rect::new(380.0, 500.0, 100.0, 40.0));
    }

    #[test]
    fn visible_anchor_is_not_scrolled() {
        let layout = standard_layout();
        let mut tour = guide(layout.clone(), Arc::new(MemoryStore::default()));
        tour.start();
        tour.advance();
        assert!(layout.scrolled.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_anchor_yields_zero_rect_and_keeps_step() {
        let layout = Arc::new(FakeLayout::new(viewport(), &[("a", Rect::new(1.0, 1.0, 1.0, 1.0))]));
        let mut tour = guide(layout, Arc::new(MemoryStore::default()));
        tour.start();

        assert!(tour.advance());

        assert_eq!(tour.step_index(), 1);
        assert_eq!(tour.anchor_geometry(), Rect::default());
        assert!(tour.overlay().is_some());
    }

    #[test]
    fn remeasure_follows_layout_without_changing_step() {
        let layout = standard_layout();
        let mut tour = guide(layout.clone(), Arc::new(MemoryStore::default()));
        tour.start();
        tour.advance();

        layout.set("b", Rect::new(250.0, 400.0, 120.0, 40.0));
        tour.remeasure();

        assert_eq!(tour.step_index(), 1);
        assert_eq!(tour.anchor_geometry(), Rect::new(250.0, 400.0, 120.0, 40.0));
    }

    #[test]
    fn finish_and_skip_persist_idempotently() {
        let store = Arc::new(MemoryStore::default());
        let mut tour = guide(standard_layout(), store.clone());
        let sub = tour.start().unwrap();

        tour.finish();
        tour.skip();

        assert!(!sub.is_active());
        assert!(!tour.is_visible());
        assert!(tour.is_completed());
        assert!(store.is_completed());
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
        assert!(tour.start().is_none());
    }

    #[test]
    fn persistence_failure_still_hides_tour() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let mut tour = guide(standard_layout(), store);
        tour.start();

        tour.skip();

        assert!(!tour.is_visible());
        assert!(tour.overlay().is_none());
    }

    #[test]
    fn remeasure_is_ignored_when_hidden() {
        let layout = standard_layout();
        let mut tour = guide(layout.clone(), Arc::new(MemoryStore::default()));
        tour.start();
        tour.finish();

        layout.set("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        tour.remeasure();

        assert_eq!(tour.anchor_geometry(), Rect::new(100.0, 100.0, 300.0, 50.0));
    }

    #[tokio::test]
    async fn subscription_end_resolves_after_finish() {
        let mut tour = guide(standard_layout(), Arc::new(MemoryStore::default()));
        let sub = tour.start().unwrap();
        tour.finish();
        sub.ended().await;
    }

    #[rstest]
    // Fits below: 100 + 50 + 24 = 174 <= 600.
    #[case(Rect::new(100.0, 500.0, 200.0, 50.0), 174.0, 425.0)]
    // Too close to the bottom: flipped above.
    #[case(Rect::new(600.0, 500.0, 200.0, 50.0), 400.0, 425.0)]
    // Left clamp.
    #[case(Rect::new(100.0, 0.0, 100.0, 50.0), 174.0, 24.0)]
    // Right clamp.
    #[case(Rect::new(100.0, 1200.0, 80.0, 50.0), 174.0, 905.0)]
    // Missing anchor.
    #[case(Rect::default(), 24.0, 24.0)]
    fn panel_placement(#[case] anchor: Rect, #[case] top: f64, #[case] left: f64) {
        let panel = panel_position(&anchor, &viewport());
        assert_eq!(panel, PanelPosition { top, left });
    }

    #[test]
    fn right_clamp_wins_on_narrow_viewports() {
        let narrow = Viewport::new(320.0, 800.0);
        let panel = panel_position(&Rect::new(10.0, 10.0, 100.0, 20.0), &narrow);
        assert_eq!(panel.left, -55.0);
    }

    #[test]
    fn default_script_has_six_unique_anchors() {
        let script = default_script();
        assert_eq!(script.len(), 6);
        let anchors: HashSet<&str> = script.iter().map(|s| s.anchor.as_str()).collect();
        assert_eq!(anchors.len(), 6);
    }
}
