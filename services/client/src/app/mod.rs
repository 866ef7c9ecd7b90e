pub mod console;
pub mod event_loop;
pub mod protocol;
pub mod render;
pub mod state;

pub use console::Console;
pub use event_loop::run;
pub use protocol::Command;
pub use state::AppState;
