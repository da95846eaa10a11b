use std::collections::HashMap;

use marknote_note::NoteId;

/// Per-identifier display buffer cache for one editor instance.
/// 單一編輯器實例的顯示緩衝快取，以識別碼為鍵。
///
/// A buffer is constructed lazily on the first open of an identifier and
/// reused on repeat opens; releasing an identifier drops its buffer.
#[derive(Debug, Default)]
pub struct BufferCache<B> {
    buffers: HashMap<NoteId, B>,
}

impl<B> BufferCache<B> {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.buffers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Returns the cached buffer for `id`, building it on first access.
    /// 取得識別碼對應的快取緩衝；首次存取時以 `create` 建立。
    pub fn get_or_insert_with(&mut self, id: &NoteId, create: impl FnOnce() -> B) -> &mut B {
        self.buffers.entry(id.clone()).or_insert_with(create)
    }

    /// Drops the buffer for `id`, returning it when one existed.
    pub fn release(&mut self, id: &NoteId) -> Option<B> {
        self.buffers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn buffer_is_built_once_and_reused() {
        let mut cache: BufferCache<String> = BufferCache::new();
        let id = NoteId::file("/n/a.md");
        let builds = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let counter = Rc::clone(&builds);
            let buffer = cache.get_or_insert_with(&id, move || {
                counter.set(counter.get() + 1);
                "content".to_owned()
            });
            assert_eq!(buffer, "content");
        }
        assert_eq!(builds.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn release_drops_the_buffer() {
        let mut cache: BufferCache<u32> = BufferCache::new();
        let id = NoteId::untitled(0);
        cache.get_or_insert_with(&id, || 7);
        assert_eq!(cache.release(&id), Some(7));
        assert!(cache.is_empty());
        assert_eq!(cache.release(&id), None);
    }
}
