//! View-layer collaborators: mime-to-editor dispatch and display buffers.
//! 檢視層協作元件：mime 對應編輯器的分派與顯示緩衝。

mod cache;
mod registry;

pub use cache::BufferCache;
pub use registry::{EditorRegistry, NoteEditor};
