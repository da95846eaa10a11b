use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::id::{NoteId, NoteRef};
use crate::note::Note;

/// Identity cache guaranteeing one [`Note`] instance per identifier.
/// 確保每個識別碼對應唯一 [`Note`] 實例的識別快取。
///
/// Closing a note removes it from the session, not from this cache; the
/// cached identity is only dropped by [`NoteRegistry::clear_cache`] on a
/// session reset.
#[derive(Default)]
pub struct NoteRegistry {
    cache: RefCell<HashMap<NoteId, Rc<Note>>>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes an identifier-or-note input to the canonical cached note.
    /// 將「識別碼或筆記」的輸入正規化為快取中的標準筆記。
    ///
    /// Idempotent: repeated calls with the same identifier return the
    /// identical `Rc<Note>`. A note instance passed in is cached under its
    /// own identifier when no entry exists yet.
    pub fn resolve(&self, target: impl Into<NoteRef>) -> Rc<Note> {
        match target.into() {
            NoteRef::Note(note) => {
                let mut cache = self.cache.borrow_mut();
                let entry = cache
                    .entry(note.id().clone())
                    .or_insert_with(|| Rc::clone(&note));
                Rc::clone(entry)
            }
            NoteRef::Id(id) => {
                if let Some(note) = self.cache.borrow().get(&id) {
                    return Rc::clone(note);
                }
                let note = Rc::new(Note::from_id(&id));
                self.cache.borrow_mut().insert(id, Rc::clone(&note));
                note
            }
        }
    }

    /// Creates and caches a fresh untitled note for `index`.
    /// 建立並快取指定槽位的未命名筆記。
    pub fn create_untitled(&self, index: u32, mime_type: impl Into<String>) -> Rc<Note> {
        let note = Rc::new(Note::untitled(index, mime_type));
        self.cache
            .borrow_mut()
            .insert(note.id().clone(), Rc::clone(&note));
        note
    }

    /// Drops every cached identity. Callers must reset session state in the
    /// same breath; see the session controller's `reset`.
    /// 清空所有快取識別；呼叫端必須同時重設工作階段狀態。
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime;

    #[test]
    fn resolve_is_idempotent_per_identifier() {
        let registry = NoteRegistry::new();
        let id = NoteId::file("/tmp/a.md");
        let first = registry.resolve(&id);
        let second = registry.resolve(&id);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn resolve_of_a_note_returns_it_and_caches() {
        let registry = NoteRegistry::new();
        let note = registry.create_untitled(0, mime::MARKDOWN_MIME);
        let resolved = registry.resolve(&note);
        assert!(Rc::ptr_eq(&note, &resolved));
        let by_id = registry.resolve(note.id());
        assert!(Rc::ptr_eq(&note, &by_id));
    }

    #[test]
    fn clear_cache_recreates_identities() {
        let registry = NoteRegistry::new();
        let id = NoteId::file("/tmp/b.md");
        let before = registry.resolve(&id);
        registry.clear_cache();
        assert_eq!(registry.cached_count(), 0);
        let after = registry.resolve(&id);
        assert!(!Rc::ptr_eq(&before, &after));
    }
}
