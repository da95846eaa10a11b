//! Multi-document session lifecycle for Marknote.
//! Marknote 的多文件工作階段生命週期核心。
//!
//! The [`SessionController`] owns the open-tab order, the active note and
//! the activation history, and fans per-note events out to session-level
//! observers. All operations are synchronous; every state mutation completes
//! before the corresponding event is emitted, so listeners may safely call
//! back into the controller.

mod controller;
mod open_notes;

pub use controller::{SessionController, SessionError, SessionEvent};
pub use open_notes::OpenNotes;
