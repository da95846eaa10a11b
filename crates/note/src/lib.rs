//! Note identity and per-note event primitives for Marknote.
//! Marknote 的筆記識別與單篇筆記事件的核心模組。

mod util;

pub mod events;
pub mod id;
pub mod mime;
pub mod note;
pub mod registry;
pub mod untitled;

pub use events::{Emitter, Subscription, SubscriptionId};
pub use id::{NoteId, NoteRef};
pub use note::{Note, NoteError, NoteEvent, NoteKind};
pub use registry::NoteRegistry;
