//! services/client/src/adapters/notices.rs
//!
//! Prints controller notices to the terminal as transient one-line toasts.
//! Implements the `NoticeSink` port from the `core` crate.

use docchat_core::{Notice, NoticeSink};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

pub fn level_of(notice: &Notice) -> NoticeLevel {
    match notice {
        Notice::Processing { .. } => NoticeLevel::Info,
        Notice::Ready { .. } | Notice::Removed => NoticeLevel::Success,
        Notice::UploadFailed { .. }
        | Notice::RemoveFailed { .. }
        | Notice::Conflict { .. }
        | Notice::InvalidInput { .. } => NoticeLevel::Error,
    }
}

/// Formats a notice as a single toast line.
pub fn toast_line(notice: &Notice) -> String {
    let tag = match level_of(notice) {
        NoticeLevel::Info => "..",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "!!",
    };
    format!("[{}] {}", tag, notice)
}

/// Writes every notice to stdout and mirrors it to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNoticeSink;

impl NoticeSink for ConsoleNoticeSink {
    fn emit(&self, notice: Notice) {
        match level_of(&notice) {
            NoticeLevel::Error => warn!("Notice: {}", notice),
            _ => info!("Notice: {}", notice),
        }
        println!("{}", toast_line(&notice));
    }
}
