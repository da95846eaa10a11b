use std::cell::{Cell, RefCell};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::events::{Emitter, Subscription};
use crate::id::NoteId;
use crate::mime;
use crate::util::write_atomic;

/// Distinguishes file-backed notes from untitled slots.
/// 區分檔案型筆記與未命名槽位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteKind {
    File { path: PathBuf },
    Untitled { index: u32 },
}

/// Closed set of per-note event kinds.
/// 單篇筆記事件的封閉集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// Content replaced through [`Note::update`].
    Change,
    /// Content written to the backing file.
    Saved,
    /// Content teardown on removal from a session.
    Closed,
}

/// Errors raised by note content operations.
/// 筆記內容操作可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note IO error: {0}")]
    Io(#[from] io::Error),
    #[error("note {0} has no backing file")]
    NoBackingFile(NoteId),
}

/// A document identity with its own content accessors and event surface.
/// 具備內容存取與事件介面的文件識別。
///
/// The session layer owns which notes are open; the note itself owns reading,
/// updating and saving its content. Content is loaded lazily on the first
/// [`Note::read_content`] call for file-backed notes.
pub struct Note {
    id: NoteId,
    kind: NoteKind,
    mime_type: String,
    content: RefCell<Option<String>>,
    dirty: Cell<bool>,
    events: Emitter<NoteEvent>,
}

impl Note {
    /// Builds a file-backed note for `path`.
    /// 為指定路徑建立檔案型筆記。
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = mime::for_path(&path).to_owned();
        Self {
            id: NoteId::file(&path),
            kind: NoteKind::File { path },
            mime_type,
            content: RefCell::new(None),
            dirty: Cell::new(false),
            events: Emitter::new(),
        }
    }

    /// Builds an untitled note occupying `index`.
    /// 建立佔用指定槽位的未命名筆記。
    pub fn untitled(index: u32, mime_type: impl Into<String>) -> Self {
        Self {
            id: NoteId::untitled(index),
            kind: NoteKind::Untitled { index },
            mime_type: mime_type.into(),
            content: RefCell::new(Some(String::new())),
            dirty: Cell::new(false),
            events: Emitter::new(),
        }
    }

    /// Reconstructs a note from a bare identifier.
    /// 由識別碼重建筆記。
    pub fn from_id(id: &NoteId) -> Self {
        if let Some(index) = id.untitled_slot() {
            return Self::untitled(index, mime::MARKDOWN_MIME);
        }
        let path = id
            .to_file_path()
            .unwrap_or_else(|| PathBuf::from(id.as_str()));
        Self::from_file(path)
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn kind(&self) -> &NoteKind {
        &self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_untitled(&self) -> bool {
        matches!(self.kind, NoteKind::Untitled { .. })
    }

    /// The untitled slot this note occupies, when it has one.
    pub fn untitled_index(&self) -> Option<u32> {
        match self.kind {
            NoteKind::Untitled { index } => Some(index),
            NoteKind::File { .. } => None,
        }
    }

    /// Tab-strip label: the file name, or "Untitled-N" for untitled notes.
    /// 分頁標籤顯示名稱：檔名，或未命名筆記的「Untitled-N」。
    pub fn display_name(&self) -> String {
        match &self.kind {
            NoteKind::File { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.id.to_string()),
            NoteKind::Untitled { index } => format!("Untitled-{index}"),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Registers a listener for this note's events.
    /// 註冊此筆記的事件監聽者。
    pub fn subscribe(&self, callback: impl Fn(&NoteEvent) + 'static) -> Subscription<NoteEvent> {
        self.events.subscribe(callback)
    }

    /// Returns the current content, reading the backing file on first access.
    /// 回傳目前內容；檔案型筆記於首次存取時讀入磁碟內容。
    pub fn read_content(&self) -> Result<String, NoteError> {
        if let Some(content) = self.content.borrow().as_ref() {
            return Ok(content.clone());
        }
        let loaded = match &self.kind {
            NoteKind::File { path } => fs::read_to_string(path)?,
            NoteKind::Untitled { .. } => String::new(),
        };
        *self.content.borrow_mut() = Some(loaded.clone());
        Ok(loaded)
    }

    /// Replaces the content and marks the note dirty.
    /// 取代內容並將筆記標記為已修改。
    pub fn update(&self, content: impl Into<String>) {
        *self.content.borrow_mut() = Some(content.into());
        self.dirty.set(true);
        self.events.emit(&NoteEvent::Change);
    }

    /// Writes the content back to the backing file.
    /// 將內容寫回所屬檔案；未命名筆記沒有檔案可寫，回傳錯誤。
    pub fn save(&self) -> Result<(), NoteError> {
        let path = match &self.kind {
            NoteKind::File { path } => path.clone(),
            NoteKind::Untitled { .. } => return Err(NoteError::NoBackingFile(self.id.clone())),
        };
        let content = match self.content.borrow().as_ref() {
            Some(content) => content.clone(),
            // Never read nor updated: nothing to write.
            None => return Ok(()),
        };
        write_atomic(&path, content.as_bytes())?;
        self.dirty.set(false);
        self.events.emit(&NoteEvent::Saved);
        Ok(())
    }

    /// Content teardown hook invoked when the note leaves a session.
    /// 筆記離開工作階段時呼叫的內容釋放掛勾。
    pub fn close(&self) {
        if matches!(self.kind, NoteKind::File { .. }) {
            *self.content.borrow_mut() = None;
        }
        self.dirty.set(false);
        self.events.emit(&NoteEvent::Closed);
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("mime_type", &self.mime_type)
            .field("dirty", &self.dirty.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[test]
    fn file_note_reads_and_saves_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("todo.md");
        fs::write(&path, "- [ ] write tests").unwrap();

        let note = Note::from_file(&path);
        assert_eq!(note.mime_type(), "text/markdown");
        assert_eq!(note.display_name(), "todo.md");
        assert_eq!(note.read_content().unwrap(), "- [ ] write tests");

        note.update("- [x] write tests");
        assert!(note.is_dirty());
        note.save().unwrap();
        assert!(!note.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "- [x] write tests");
    }

    #[test]
    fn untitled_note_starts_empty_and_refuses_save() {
        let note = Note::untitled(2, mime::MARKDOWN_MIME);
        assert_eq!(note.display_name(), "Untitled-2");
        assert_eq!(note.untitled_index(), Some(2));
        assert_eq!(note.read_content().unwrap(), "");

        note.update("draft");
        let err = note.save().unwrap_err();
        assert!(matches!(err, NoteError::NoBackingFile(_)));
    }

    #[test]
    fn update_and_close_emit_events() {
        let note = Note::untitled(0, mime::MARKDOWN_MIME);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_events = Rc::clone(&seen);
        let _sub = note.subscribe(move |event| seen_events.borrow_mut().push(*event));

        note.update("x");
        note.close();
        assert_eq!(&*seen.borrow(), &[NoteEvent::Change, NoteEvent::Closed]);
    }

    #[test]
    fn from_id_restores_kind() {
        let file = Note::from_id(&NoteId::file("/tmp/a.rs"));
        assert!(matches!(file.kind(), NoteKind::File { .. }));
        assert_eq!(file.mime_type(), "text/x-rust");

        let untitled = Note::from_id(&NoteId::untitled(5));
        assert_eq!(untitled.untitled_index(), Some(5));
    }
}
