//! Interrupt handling for the `run` command

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Records whether Ctrl+C was pressed.
///
/// The wrapped child shares our process group and gets the interrupt
/// itself; we only remember it so the final notification can say so
/// and notifiers are still turned off.
pub struct InterruptSignal {
    interrupted: Arc<AtomicBool>,
}

impl InterruptSignal {
    /// Create a new interrupt signal handler
    pub fn new() -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the interrupt flag
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    /// Check if an interrupt was received
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Setup signal handler
    pub fn setup(&self) {
        let interrupted = Arc::clone(&self.interrupted);

        tokio::spawn(async move {
            loop {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }
}

impl Default for InterruptSignal {
    fn default() -> Self {
        Self::new()
    }
}
