//! services/client/src/app/console.rs
//!
//! The output side of the terminal view. The binary writes to stdout; tests hand in a
//! buffer and read back what the user was shown.

use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Writes one line. A closed terminal is not an error worth surfacing.
    pub fn line(&self, text: impl Display) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}
