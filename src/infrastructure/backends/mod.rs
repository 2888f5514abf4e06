//! Notification backends and the default registry

pub mod base;
pub mod context;
pub mod emacs;
pub mod file;
pub mod notify_rust;
pub mod notify_send;
pub mod terminal_notifier;
pub mod terminal_title;
pub mod tmux;

use std::sync::Arc;

use crate::application::ports::BackendFactory;
use crate::application::Registry;

pub use context::{BackendContext, TerminalSink};
pub use emacs::{EmacsBackend, EmacsFactory};
pub use file::{FileBackend, FileFactory};
pub use notify_rust::{LibnotifyBackend, LibnotifyFactory};
pub use notify_send::{NotifySendBackend, NotifySendFactory};
pub use terminal_notifier::{TerminalNotifierBackend, TerminalNotifierFactory};
pub use terminal_title::{TerminalTitleBackend, TerminalTitleFactory};
pub use tmux::{TmuxBackend, TmuxFactory};

/// Every supported backend, in detection priority.
///
/// One desktop popup mechanism at most, then the editor, the multiplexer,
/// the terminal title and the file backend independently.
pub fn default_registry(ctx: &BackendContext) -> Registry {
    Registry::new()
        .with_group(vec![
            factory(LibnotifyFactory::new(ctx.clone())),
            factory(TerminalNotifierFactory::new(ctx.clone())),
            factory(NotifySendFactory::new(ctx.clone())),
        ])
        .with_group(vec![factory(EmacsFactory::new(ctx.clone()))])
        .with_group(vec![factory(TmuxFactory::new(ctx.clone()))])
        .with_group(vec![factory(TerminalTitleFactory::new(ctx.clone()))])
        .with_group(vec![factory(FileFactory::new(ctx.clone()))])
}

fn factory<F: BackendFactory + 'static>(factory: F) -> Arc<dyn BackendFactory> {
    Arc::new(factory)
}
