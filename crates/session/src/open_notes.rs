use std::collections::HashMap;
use std::rc::Rc;

use marknote_note::{Note, NoteId};

/// The set of open notes and their tab order, maintained as one unit.
/// 開啟中的筆記集合與其分頁順序，以單一結構維護。
///
/// Membership and order always describe the same set: every identifier in
/// the order appears exactly once, and the map's key set equals the order's
/// contents.
#[derive(Default)]
pub struct OpenNotes {
    order: Vec<NoteId>,
    map: HashMap<NoteId, Rc<Note>>,
}

impl OpenNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.map.contains_key(id)
    }

    pub fn get(&self, id: &NoteId) -> Option<&Rc<Note>> {
        self.map.get(id)
    }

    /// Tab position of `id`, when open.
    pub fn index_of(&self, id: &NoteId) -> Option<usize> {
        self.order.iter().position(|open| open == id)
    }

    /// Inserts `note` at `index` in the tab order. `index` is clamped to the
    /// current length; inserting an already-open identifier is a caller bug.
    /// 將筆記插入分頁順序的指定位置；重複插入同一識別碼屬呼叫端錯誤。
    pub fn insert(&mut self, index: usize, note: Rc<Note>) {
        debug_assert!(!self.map.contains_key(note.id()));
        let index = index.min(self.order.len());
        self.order.insert(index, note.id().clone());
        self.map.insert(note.id().clone(), note);
        self.assert_consistent();
    }

    /// Removes `id`, returning its former tab position and note.
    /// 移除指定識別碼並回傳其原本的分頁位置與筆記。
    pub fn remove(&mut self, id: &NoteId) -> Option<(usize, Rc<Note>)> {
        let index = self.index_of(id)?;
        self.order.remove(index);
        let note = self.map.remove(id);
        debug_assert!(note.is_some());
        self.assert_consistent();
        note.map(|note| (index, note))
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.map.clear();
    }

    /// Identifiers in tab order.
    pub fn ids(&self) -> impl Iterator<Item = &NoteId> {
        self.order.iter()
    }

    /// Notes in tab order.
    pub fn notes(&self) -> impl Iterator<Item = &Rc<Note>> {
        self.order.iter().filter_map(|id| self.map.get(id))
    }

    fn assert_consistent(&self) {
        debug_assert_eq!(self.order.len(), self.map.len());
        debug_assert!(self.order.iter().all(|id| self.map.contains_key(id)));
    }
}
