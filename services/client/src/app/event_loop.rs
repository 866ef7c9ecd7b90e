//! services/client/src/app/event_loop.rs
//!
//! The main control loop of the terminal view. It reads commands, hands them to the
//! session controller or the tour, and renders the results.
//!
//! Each session operation is split in two. The synchronous half (taking the staged
//! file, echoing a message) runs before the next input line is read, so a repeated
//! command sees the flags the first one set. The network half runs as a spawned task
//! so input keeps being processed while a call is outstanding. Those tasks are never
//! cancelled: when input ends, the loop waits for every one of them to finish.

use crate::{
    adapters::read_staged_file,
    app::{
        protocol::{Command, ParseError},
        render,
        state::AppState,
    },
    error::ClientError,
};
use docchat_core::{
    AnchorLayout, FileOrigin, PrimaryAction, SendOutcome, SessionError, TourGuide,
    ViewportSubscription, Viewport,
};
use std::{ops::ControlFlow, path::Path, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::watch,
    task::JoinSet,
};
use tracing::{debug, info};

/// Runs the view until input is exhausted or the user quits.
pub async fn run<R>(app: Arc<AppState>, input: R) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
{
    let (viewport_tx, _) = watch::channel(app.layout.viewport());
    let mut operations = JoinSet::new();

    app.console
        .line("docchat: chat with one PDF at a time. Type `help` for commands.");
    start_tour(&app, &viewport_tx).await;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(ParseError::Empty) => continue,
                    Err(e) => {
                        app.console.line(e);
                        continue;
                    }
                };
                if dispatch(&app, command, &viewport_tx, &mut operations).await.is_break() {
                    break;
                }
            }
            Some(finished) = operations.join_next(), if !operations.is_empty() => {
                if let Err(e) = finished {
                    debug!("Operation task ended abnormally: {}", e);
                }
            }
        }
    }

    if !operations.is_empty() {
        info!("Waiting for {} outstanding operation(s).", operations.len());
    }
    while operations.join_next().await.is_some() {}
    Ok(())
}

async fn dispatch(
    app: &Arc<AppState>,
    command: Command,
    viewport_tx: &watch::Sender<Viewport>,
    operations: &mut JoinSet<()>,
) -> ControlFlow<()> {
    let console = &app.console;
    match command {
        Command::Pick(path) => stage(app, &path, FileOrigin::Picker).await,
        Command::Drop(path) => stage(app, &path, FileOrigin::DragDrop).await,
        Command::Sample => match &app.config.sample_pdf_path {
            Some(path) => stage(app, path, FileOrigin::Picker).await,
            None => console.line(render::NO_SAMPLE),
        },
        Command::ViewSample => match &app.config.sample_pdf_path {
            Some(path) => match tokio::fs::metadata(path).await {
                Ok(meta) => console.line(render::sample_preview(path, meta.len())),
                Err(e) => console.line(format!("Cannot read {}: {}", path.display(), e)),
            },
            None => console.line(render::NO_SAMPLE),
        },
        Command::Unstage => app.session.unstage_file().await,
        Command::Upload => upload(app, operations).await,
        Command::Ask(text) => ask(app, text, operations).await,
        Command::Remove => {
            operations.spawn(remove(app.clone()));
        }
        Command::Next => {
            let mut tour = app.tour.lock().await;
            if !tour.is_visible() {
                console.line("The tour is not running.");
            } else {
                match tour.primary_action() {
                    PrimaryAction::Next => {
                        tour.advance();
                        print_overlay(app, &tour);
                    }
                    PrimaryAction::Finish => {
                        tour.finish();
                        console.line("You're all set.");
                    }
                }
            }
        }
        Command::Skip => app.tour.lock().await.skip(),
        Command::Finish => app.tour.lock().await.finish(),
        Command::Resize(viewport) => {
            app.layout.set_viewport(viewport);
            viewport_tx.send_replace(viewport);
        }
        Command::Tour => {
            let tour = app.tour.lock().await;
            if tour.is_visible() {
                print_overlay(app, &tour);
            } else {
                console.line("The tour is not running.");
            }
        }
        Command::Show => {
            let snapshot = app.session.snapshot().await;
            console.line(render::status(&snapshot));
            console.line(render::transcript(&snapshot.transcript));
        }
        Command::Help => console.line(render::HELP_TEXT),
        Command::Info => console.line(render::info_text().trim_end()),
        Command::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

async fn stage(app: &AppState, path: &Path, origin: FileOrigin) {
    let file = match read_staged_file(path).await {
        Ok(file) => file,
        Err(e) => {
            app.console
                .line(format!("Cannot read {}: {}", path.display(), e));
            return;
        }
    };
    let name = file.name.clone();
    match app.session.stage_file(file, origin).await {
        Ok(()) => app
            .console
            .line(format!("Selected {}. Type `upload` to process it.", name)),
        // The notice sink has already told the user why.
        Err(e) => debug!("Staging refused: {}", e),
    }
}

async fn upload(app: &Arc<AppState>, operations: &mut JoinSet<()>) {
    let pending = match app.session.begin_upload().await {
        Ok(pending) => pending,
        Err(SessionError::InFlight) => {
            app.console.line("A document is already being processed.");
            return;
        }
        Err(_) => {
            app.console.line("Select a PDF first (`pick` or `drop`).");
            return;
        }
    };

    let app = app.clone();
    operations.spawn(async move {
        match app.session.finish_upload(pending).await {
            Ok(_) => {
                app.sync_layout().await;
                if let Some(greeting) = app.session.snapshot().await.transcript.last() {
                    app.console.line(render::turn(greeting));
                }
            }
            Err(e) => debug!("Upload did not complete: {}", e),
        }
    });
}

async fn ask(app: &Arc<AppState>, text: String, operations: &mut JoinSet<()>) {
    let Some(pending) = app.session.begin_message(&text).await else {
        let snapshot = app.session.snapshot().await;
        if snapshot.document_id.is_none() {
            app.console.line("Upload a document before asking questions.");
        } else if snapshot.busy {
            app.console.line("Still waiting for the previous answer.");
        }
        return;
    };
    app.console.line("Thinking...");

    let app = app.clone();
    operations.spawn(async move {
        match app.session.complete_message(pending).await {
            SendOutcome::Answered | SendOutcome::Absorbed => {
                if let Some(reply) = app.session.snapshot().await.transcript.last() {
                    app.console.line(render::turn(reply));
                }
            }
            SendOutcome::Dropped | SendOutcome::Ignored => {
                debug!("Reply was not added to the transcript.")
            }
        }
    });
}

async fn remove(app: Arc<AppState>) {
    match app.session.remove_document().await {
        Ok(()) => app.sync_layout().await,
        Err(SessionError::InFlight) => app.console.line("The document is already being removed."),
        Err(e) => debug!("Removal did not complete: {}", e),
    }
}

fn print_overlay(app: &AppState, tour: &TourGuide) {
    if let Some(overlay) = tour.overlay() {
        app.console.line(render::overlay(&overlay));
    }
}

async fn start_tour(app: &Arc<AppState>, viewport_tx: &watch::Sender<Viewport>) {
    let mut tour = app.tour.lock().await;
    let Some(subscription) = tour.start() else {
        return;
    };
    print_overlay(app, &tour);
    watch_viewport(app.clone(), subscription, viewport_tx.subscribe());
}

/// Forwards viewport changes to the tour for as long as the subscription is active.
fn watch_viewport(
    app: Arc<AppState>,
    subscription: ViewportSubscription,
    mut viewport_rx: watch::Receiver<Viewport>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = subscription.ended() => break,
                changed = viewport_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let mut tour = app.tour.lock().await;
                    tour.remeasure();
                    print_overlay(&app, &tour);
                }
            }
        }
        debug!("Viewport subscription ended.");
    });
}
