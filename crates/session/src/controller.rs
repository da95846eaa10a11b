use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use marknote_note::{
    mime, untitled, Emitter, Note, NoteError, NoteEvent, NoteId, NoteRef, NoteRegistry,
    Subscription,
};
use marknote_project::{load_tree, ProjectError, TreeNode};

use crate::open_notes::OpenNotes;

/// Session-level lifecycle events consumed by the view layer.
/// 由檢視層接收的工作階段生命週期事件。
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Session state cleared.
    Reset,
    /// Project tree replaced.
    ProjectChange,
    /// Note inserted into the tab order at `index`.
    OpenNote { note: Rc<Note>, index: usize },
    /// Active note changed; both fields are `None` when the last note closed.
    ActiveNote {
        note: Option<Rc<Note>>,
        index: Option<usize>,
    },
    /// Note removed; `index` was its tab position before removal.
    CloseNote { note: Rc<Note>, index: usize },
    /// Relayed per-note event, tagged with the originating note.
    Note { note: Rc<Note>, event: NoteEvent },
}

/// Errors raised by session operations.
/// 工作階段操作可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum SessionError {
    /// `activate` was called for a note that is not open. Open/close on
    /// unknown identifiers are silent no-ops; this one is a precondition
    /// violation on the caller's side and is never auto-repaired.
    #[error("note {0} is not open in this session")]
    NotOpen(NoteId),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Project(#[from] ProjectError),
}

struct SessionState {
    open: OpenNotes,
    active: Option<NoteId>,
    history: Vec<NoteId>,
    tree: Option<TreeNode>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            open: OpenNotes::new(),
            active: None,
            history: Vec::new(),
            tree: None,
        }
    }

    fn active_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(|id| self.open.index_of(id))
    }

    fn assert_invariants(&self) {
        if let Some(active) = &self.active {
            debug_assert!(
                self.open.contains(active),
                "active note {active} must be open"
            );
        }
    }
}

/// Owner of the open-tab order, the active note and the activation history.
/// 分頁順序、使用中筆記與啟用歷史的唯一擁有者。
///
/// Explicitly constructed and injected into consumers; there is no ambient
/// global session. Every operation finishes mutating state before it emits
/// the corresponding [`SessionEvent`], so listeners may re-enter the
/// controller without observing a half-applied operation.
pub struct SessionController {
    registry: NoteRegistry,
    state: RefCell<SessionState>,
    relays: RefCell<HashMap<NoteId, Subscription<NoteEvent>>>,
    emitter: Emitter<SessionEvent>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            registry: NoteRegistry::new(),
            state: RefCell::new(SessionState::new()),
            relays: RefCell::new(HashMap::new()),
            emitter: Emitter::new(),
        }
    }

    /// Registers a session-level observer.
    /// 註冊工作階段層級的觀察者。
    pub fn subscribe(
        &self,
        callback: impl Fn(&SessionEvent) + 'static,
    ) -> Subscription<SessionEvent> {
        self.emitter.subscribe(callback)
    }

    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }

    /// Identifiers in tab order.
    pub fn open_order(&self) -> Vec<NoteId> {
        self.state.borrow().open.ids().cloned().collect()
    }

    /// Notes in tab order.
    pub fn open_notes(&self) -> Vec<Rc<Note>> {
        self.state.borrow().open.notes().cloned().collect()
    }

    pub fn open_count(&self) -> usize {
        self.state.borrow().open.len()
    }

    pub fn active_id(&self) -> Option<NoteId> {
        self.state.borrow().active.clone()
    }

    pub fn active_note(&self) -> Option<Rc<Note>> {
        let state = self.state.borrow();
        state
            .active
            .as_ref()
            .and_then(|id| state.open.get(id))
            .cloned()
    }

    /// Tab position of `id`, when open.
    pub fn note_index(&self, id: &NoteId) -> Option<usize> {
        self.state.borrow().open.index_of(id)
    }

    /// The project tree loaded by the last [`SessionController::open_project`].
    pub fn tree(&self) -> Option<TreeNode> {
        self.state.borrow().tree.clone()
    }

    /// Creates an untitled note in the smallest free slot and opens it.
    /// 於最小可用槽位建立未命名筆記並開啟。
    pub fn new_note(&self) -> Rc<Note> {
        let taken: Vec<u32> = self
            .state
            .borrow()
            .open
            .notes()
            .filter_map(|note| note.untitled_index())
            .collect();
        let index = untitled::next_index(taken);
        let note = self.registry.create_untitled(index, mime::MARKDOWN_MIME);
        self.open(&note)
    }

    /// Opens a note, inserting its tab next to the active one.
    /// 開啟筆記，新分頁緊鄰目前使用中的分頁。
    ///
    /// Opening the active note is a no-op; opening an already-open note
    /// merely activates it. Otherwise the note is inserted after the active
    /// tab (or at the front when none is active), its events are relayed to
    /// session observers, and it becomes active.
    pub fn open(&self, target: impl Into<NoteRef>) -> Rc<Note> {
        let note = self.registry.resolve(target);

        let already_open = {
            let state = self.state.borrow();
            if state.active.as_ref() == Some(note.id()) {
                return note;
            }
            state.open.contains(note.id())
        };
        if already_open {
            self.activate_open(&note);
            return note;
        }

        let index = {
            let mut state = self.state.borrow_mut();
            let index = state.active_index().map(|i| i + 1).unwrap_or(0);
            state.open.insert(index, Rc::clone(&note));
            index
        };
        self.install_relay(&note);

        tracing::debug!(note = %note.id(), index, "open note");
        self.emitter.emit(&SessionEvent::OpenNote {
            note: Rc::clone(&note),
            index,
        });
        self.activate_open(&note);
        note
    }

    /// Makes an already-open note the active one.
    /// 將已開啟的筆記設為使用中。
    ///
    /// Activating the active note is a no-op. Activating a note that is not
    /// open fails with [`SessionError::NotOpen`].
    pub fn activate(&self, target: impl Into<NoteRef>) -> Result<Rc<Note>, SessionError> {
        let note = self.registry.resolve(target);
        {
            let state = self.state.borrow();
            if state.active.as_ref() == Some(note.id()) {
                return Ok(note);
            }
            if !state.open.contains(note.id()) {
                return Err(SessionError::NotOpen(note.id().clone()));
            }
        }
        self.activate_open(&note);
        Ok(note)
    }

    /// Closes a note; a no-op when it is not open.
    /// 關閉筆記；若未開啟則不做任何事。
    ///
    /// When the active note closes, the activation history is walked
    /// backwards to the most recent note that is still open; with the
    /// history exhausted the session has no active note.
    pub fn close(&self, target: impl Into<NoteRef>) {
        let note = self.registry.resolve(target);
        if !self.state.borrow().open.contains(note.id()) {
            return;
        }

        // Detach the exact relay installed on open, before anything else,
        // so a re-created identity never sees doubled listeners.
        if let Some(relay) = self.relays.borrow_mut().remove(note.id()) {
            relay.cancel();
        }

        let (index, reactivated) = {
            let mut state = self.state.borrow_mut();
            let (index, _) = match state.open.remove(note.id()) {
                Some(removed) => removed,
                None => return,
            };
            state.history.retain(|id| id != note.id());

            let mut reactivated = None;
            if state.active.as_ref() == Some(note.id()) {
                let next = loop {
                    let Some(candidate) = state.history.last().cloned() else {
                        break None;
                    };
                    if state.open.contains(&candidate) {
                        break Some(candidate);
                    }
                    // Stale entry for a note no longer open; keep walking.
                    state.history.pop();
                };
                state.active = next.clone();
                reactivated = Some(next.and_then(|id| {
                    let next_note = state.open.get(&id).cloned()?;
                    Some((next_note, state.open.index_of(&id)))
                }));
            }
            state.assert_invariants();
            (index, reactivated)
        };

        if let Some(next) = reactivated {
            let (next_note, next_index) = match next {
                Some((next_note, next_index)) => (Some(next_note), next_index),
                None => (None, None),
            };
            tracing::debug!(
                note = ?next_note.as_ref().map(|n| n.id().to_string()),
                "reactivate previous note"
            );
            self.emitter.emit(&SessionEvent::ActiveNote {
                note: next_note,
                index: next_index,
            });
        }

        tracing::debug!(note = %note.id(), index, "close note");
        self.emitter.emit(&SessionEvent::CloseNote {
            note: Rc::clone(&note),
            index,
        });
        note.close();
    }

    /// Saves a note's content; defaults to the active note, and is a no-op
    /// when nothing resolves.
    /// 儲存筆記內容；未指定時儲存使用中的筆記，無可儲存對象時不做任何事。
    pub fn save_note(&self, target: Option<NoteRef>) -> Result<(), SessionError> {
        let note = match target {
            Some(target) => Some(self.registry.resolve(target)),
            None => self.active_note(),
        };
        let Some(note) = note else {
            return Ok(());
        };
        note.save()?;
        Ok(())
    }

    /// Clears all session state and the note identity cache.
    /// 清空所有工作階段狀態與筆記識別快取。
    pub fn reset(&self) {
        for (_, relay) in self.relays.borrow_mut().drain() {
            relay.cancel();
        }
        {
            let mut state = self.state.borrow_mut();
            state.open.clear();
            state.active = None;
            state.history.clear();
            state.tree = None;
        }
        self.registry.clear_cache();
        tracing::debug!("session reset");
        self.emitter.emit(&SessionEvent::Reset);
    }

    /// Resets the session and loads the tree for a new project root.
    /// 重設工作階段並載入新專案根目錄的目錄樹。
    pub fn open_project(&self, root: impl AsRef<Path>) -> Result<(), SessionError> {
        self.reset();
        let tree = load_tree(root)?;
        self.state.borrow_mut().tree = Some(tree);
        self.emitter.emit(&SessionEvent::ProjectChange);
        Ok(())
    }

    fn activate_open(&self, note: &Rc<Note>) {
        let index = {
            let mut state = self.state.borrow_mut();
            state.active = Some(note.id().clone());
            state.history.push(note.id().clone());
            let index = state.open.index_of(note.id());
            state.assert_invariants();
            index
        };
        tracing::debug!(note = %note.id(), index, "activate note");
        self.emitter.emit(&SessionEvent::ActiveNote {
            note: Some(Rc::clone(note)),
            index,
        });
    }

    fn install_relay(&self, note: &Rc<Note>) {
        let emitter = self.emitter.clone();
        let relayed = Rc::downgrade(note);
        let relay = note.subscribe(move |event| {
            if let Some(note) = relayed.upgrade() {
                emitter.emit(&SessionEvent::Note {
                    note,
                    event: *event,
                });
            }
        });
        if let Some(stale) = self.relays.borrow_mut().insert(note.id().clone(), relay) {
            stale.cancel();
        }
    }
}
