//! services/client/src/app/state.rs
//!
//! Defines the client's shared state, created once at startup.

use crate::adapters::TerminalLayout;
use crate::app::Console;
use crate::config::Config;
use docchat_core::{
    tour::default_script, DocumentService, NoticeSink, SessionController, TourGuide,
    TourProgressStore,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the event loop and its spawned operations share.
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionController>,
    pub tour: Mutex<TourGuide>,
    pub layout: Arc<TerminalLayout>,
    pub console: Console,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        service: Arc<dyn DocumentService>,
        notices: Arc<dyn NoticeSink>,
        layout: Arc<TerminalLayout>,
        store: Arc<dyn TourProgressStore>,
        console: Console,
    ) -> Self {
        let session = Arc::new(SessionController::new(service, notices));
        let tour = TourGuide::new(default_script(), layout.clone(), store);
        Self {
            config,
            session,
            tour: Mutex::new(tour),
            layout,
            console,
        }
    }

    /// Re-renders the layout after the document axis changed, and lets a visible
    /// tour observe the reflow.
    pub async fn sync_layout(&self) {
        let snapshot = self.session.snapshot().await;
        self.layout
            .set_document_active(snapshot.document_id.is_some());
        self.tour.lock().await.remeasure();
    }
}
