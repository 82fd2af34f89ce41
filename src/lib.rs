//! Library crate for userdir-tui.
//!
//! This crate exposes the building blocks of the TUI:
//! - Application state, query state and update loop (`app`)
//! - Command-line configuration (`config`)
//! - Error types for the record load (`error`)
//! - Tracing setup (`logging`)
//! - Filter, sort and highlight pipeline (`search`)
//! - Record loading (`source`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdir` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod source;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
pub use error::{LoadError, Result};
pub use source::{User, UserId};
