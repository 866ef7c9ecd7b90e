pub mod domain;
pub mod ports;
pub mod session;
pub mod tour;

pub use domain::{
    ChatAnswer, ChatTurn, Citation, DocumentId, FileOrigin, Notice, Rect, Role, StagedFile,
    UploadReceipt, Viewport,
};
pub use ports::{AnchorLayout, DocumentService, NoticeSink, PortError, PortResult, TourProgressStore};
pub use session::{
    DocumentPhase, PendingMessage, PendingUpload, SendOutcome, SessionController, SessionError,
    SessionSnapshot,
};
pub use tour::{PrimaryAction, TourGuide, TourOverlay, TourStep, ViewportSubscription};
