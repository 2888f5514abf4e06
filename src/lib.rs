//! Alertcast - notifier detection and dispatch
//!
//! Detects which notification backends work on the current host (desktop
//! popups, notify-send, tmux, emacs, terminal title, a plain file), keeps
//! the chosen set in the process environment so child processes reuse it,
//! and fans each notification out to every chosen backend.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Notification options, notifier configuration and the
//!   cross-process state record
//! - **Application**: Backend ports, registry, detector and the notifier
//!   state machine
//! - **Infrastructure**: Backend adapters, state stores, config store and
//!   the command runner
//! - **CLI**: Command-line interface, argument parsing and interrupt handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
