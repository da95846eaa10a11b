//! End-to-end session lifecycle: event sequences across open/activate/close
//! cycles and project switching.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use marknote_note::{NoteEvent, NoteId, Subscription};
use marknote_session::{SessionController, SessionEvent};
use tempfile::tempdir;

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Reset => "reset".into(),
        SessionEvent::ProjectChange => "projectChange".into(),
        SessionEvent::OpenNote { note, index } => {
            format!("open {} @{index}", note.display_name())
        }
        SessionEvent::ActiveNote { note, index } => match note {
            Some(note) => format!(
                "active {} @{}",
                note.display_name(),
                index.map(|i| i.to_string()).unwrap_or_else(|| "-".into())
            ),
            None => "active none".into(),
        },
        SessionEvent::CloseNote { note, index } => {
            format!("close {} @{index}", note.display_name())
        }
        SessionEvent::Note { note, event } => {
            format!("noteEvent {:?} {}", event, note.display_name())
        }
    }
}

// The returned handle must stay alive: the listener detaches when it drops.
fn recording(
    session: &SessionController,
) -> (Rc<RefCell<Vec<String>>>, Subscription<SessionEvent>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let sub = session.subscribe(move |event| sink.borrow_mut().push(describe(event)));
    (log, sub)
}

#[test]
fn scripted_session_emits_the_expected_sequence() {
    let session = SessionController::new();
    let (log, _events) = recording(&session);

    let a = session.open(NoteId::file("/n/a.md"));
    session.open(NoteId::file("/n/b.md"));
    session.close(NoteId::file("/n/b.md"));
    session.close(&a);

    assert_eq!(
        &*log.borrow(),
        &[
            "open a.md @0",
            "active a.md @0",
            "open b.md @1",
            "active b.md @1",
            "active a.md @0",
            "close b.md @1",
            "active none",
            "close a.md @0",
        ]
    );
}

#[test]
fn reopen_cycle_emits_one_open_per_open_and_relays_once() {
    let session = SessionController::new();
    let (log, _events) = recording(&session);

    let id = NoteId::file("/n/a.md");
    session.open(&id);
    session.close(&id);
    let note = session.open(&id);
    note.update("fresh content");

    let opens = log.borrow().iter().filter(|l| l.starts_with("open ")).count();
    assert_eq!(opens, 2);
    let relays: Vec<String> = log
        .borrow()
        .iter()
        .filter(|l| l.starts_with("noteEvent"))
        .cloned()
        .collect();
    assert_eq!(relays, vec![format!("noteEvent {:?} a.md", NoteEvent::Change)]);
}

#[test]
fn open_project_resets_and_announces_the_new_tree() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "# hi").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/guide.md"), "guide").unwrap();

    let session = SessionController::new();
    session.open(NoteId::file("/elsewhere/old.md"));
    let (log, _events) = recording(&session);

    session.open_project(dir.path()).unwrap();

    assert_eq!(&*log.borrow(), &["reset", "projectChange"]);
    assert_eq!(session.open_count(), 0);
    let tree = session.tree().expect("tree loaded");
    assert_eq!(tree.node_count(), 4);

    // Opening a file straight from the tree resolves through the registry.
    let file_node = tree
        .children
        .iter()
        .find(|node| node.name == "readme.md")
        .unwrap();
    let note = session.open(file_node.note_id.clone().unwrap());
    assert_eq!(note.read_content().unwrap(), "# hi");
}

#[test]
fn save_through_the_session_writes_the_backing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("note.md");
    fs::write(&path, "before").unwrap();

    let session = SessionController::new();
    let note = session.open(NoteId::file(&path));
    note.update("after");
    session.save_note(None).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "after");
    assert!(!note.is_dirty());
}

#[test]
fn saving_an_untitled_note_surfaces_the_error() {
    let session = SessionController::new();
    session.new_note();
    assert!(session.save_note(None).is_err());
}
