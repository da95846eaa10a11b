use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::note::Note;

const FILE_SCHEME: &str = "file://";
const UNTITLED_SCHEME: &str = "untitled:";

/// Stable resource identifier for a note.
/// 筆記的穩定資源識別碼。
///
/// The identifier is treated as an opaque string; the session layer never
/// parses or normalizes it beyond the two constructors below.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Builds an identifier for a file-backed note.
    /// 建立檔案型筆記的識別碼。
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self(format!("{FILE_SCHEME}{}", path.as_ref().display()))
    }

    /// Builds an identifier for an untitled note occupying `index`.
    /// 建立佔用指定槽位的未命名筆記識別碼。
    pub fn untitled(index: u32) -> Self {
        Self(format!("{UNTITLED_SCHEME}{index}"))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the backing path when this is a file identifier.
    /// 若為檔案識別碼則還原其路徑。
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.0.strip_prefix(FILE_SCHEME).map(PathBuf::from)
    }

    /// Recovers the untitled slot when this is an untitled identifier.
    /// 若為未命名識別碼則還原其槽位編號。
    pub fn untitled_slot(&self) -> Option<u32> {
        self.0.strip_prefix(UNTITLED_SCHEME)?.parse().ok()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit union over "an identifier" and "a resolved note".
/// 「識別碼」與「已解析筆記」的明確聯集型別。
///
/// Session operations accept `impl Into<NoteRef>` and normalize through
/// [`crate::NoteRegistry::resolve`] before touching any state.
#[derive(Clone)]
pub enum NoteRef {
    Id(NoteId),
    Note(Rc<Note>),
}

impl NoteRef {
    pub fn id(&self) -> &NoteId {
        match self {
            NoteRef::Id(id) => id,
            NoteRef::Note(note) => note.id(),
        }
    }
}

impl From<NoteId> for NoteRef {
    fn from(id: NoteId) -> Self {
        NoteRef::Id(id)
    }
}

impl From<&NoteId> for NoteRef {
    fn from(id: &NoteId) -> Self {
        NoteRef::Id(id.clone())
    }
}

impl From<Rc<Note>> for NoteRef {
    fn from(note: Rc<Note>) -> Self {
        NoteRef::Note(note)
    }
}

impl From<&Rc<Note>> for NoteRef {
    fn from(note: &Rc<Note>) -> Self {
        NoteRef::Note(Rc::clone(note))
    }
}
