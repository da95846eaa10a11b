use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use marknote_note::{mime, Note, NoteId, NoteRegistry};

/// One editor widget able to display notes of some content kind.
/// 能顯示某類內容筆記的編輯器元件。
pub trait NoteEditor {
    /// Displays the note, swapping in its per-identifier buffer.
    fn show(&mut self, note: &Rc<Note>);
    /// Drops any cached buffer for the identifier.
    fn release(&mut self, id: &NoteId);
    /// Brings this editor's view above all others.
    fn raise(&mut self);
    /// Pushes this editor's view behind the raised one.
    fn lower(&mut self);
}

/// Maps mime types to editor instances and keeps exactly one view raised.
/// 將 mime 類型對應到編輯器實例，並保持恰好一個檢視在最上層。
#[derive(Default)]
pub struct EditorRegistry {
    editors: HashMap<String, Box<dyn NoteEditor>>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mime_type: impl Into<String>, editor: Box<dyn NoteEditor>) {
        self.editors.insert(mime_type.into(), editor);
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Shows `path` in the editor registered for its mime type.
    /// 在對應 mime 類型的編輯器中顯示指定路徑。
    ///
    /// The mime type defaults to extension-based resolution. The matching
    /// editor is raised and every other registered editor is lowered, so a
    /// single view is visible at a time. Returns `false` when no editor
    /// handles the mime type.
    pub fn open_in_view(
        &mut self,
        notes: &NoteRegistry,
        path: &Path,
        mime_type: Option<&str>,
    ) -> bool {
        let mime_type = mime_type
            .map(str::to_owned)
            .unwrap_or_else(|| mime::for_path(path).to_owned());
        if !self.editors.contains_key(&mime_type) {
            tracing::debug!(path = %path.display(), mime_type, "no editor registered");
            return false;
        }

        let note = notes.resolve(NoteId::file(path));
        for (registered, editor) in self.editors.iter_mut() {
            if *registered == mime_type {
                editor.show(&note);
                editor.raise();
            } else {
                editor.lower();
            }
        }
        true
    }
}
