pub mod files;
pub mod http;
pub mod layout;
pub mod notices;
pub mod tour_store;

pub use files::read_staged_file;
pub use http::HttpDocumentService;
pub use layout::TerminalLayout;
pub use notices::ConsoleNoticeSink;
pub use tour_store::JsonTourStore;
