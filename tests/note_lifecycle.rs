use tapnotes::lifecycle::ManualClock;
use tapnotes::{Database, FolderId, NewNote, NoteId, NoteLifecycle, NotePatch};

#[test]
fn notes_survive_reopening_the_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("notes.db");

    let (pinned, trashed) = {
        let db = Database::open(&db_path, "local").expect("db");
        let notes = NoteLifecycle::with_clock(db.notes.clone(), ManualClock::starting_at(10_000));

        let pinned = notes
            .create(NewNote::new("Pinned", "keep on top", "u1").with_tags(["a"]))
            .expect("create");
        let trashed = notes
            .create(NewNote::new("Scratch", "", "u1").in_folder(FolderId::from("drafts")))
            .expect("create");
        notes.toggle_pin(pinned).expect("pin");
        notes.trash_note(trashed).expect("trash");
        (pinned, trashed)
    };

    let db = Database::open(&db_path, "local").expect("reopen");
    let notes = NoteLifecycle::new(db.notes.clone());

    let views = notes.views(Some("u1")).expect("views");
    assert_eq!(views.pinned.len(), 1);
    assert_eq!(views.pinned[0].id, pinned);
    assert_eq!(views.pinned[0].tags, ["a"]);
    assert!(views.regular.is_empty());
    assert_eq!(views.trashed.len(), 1);
    assert_eq!(views.trashed[0].id, trashed);

    let drafts = notes
        .get_by_folder("u1", &FolderId::from("drafts"))
        .expect("folder");
    assert_eq!(drafts.len(), 1);
    assert!(notes
        .get_by_folder("u2", &FolderId::from("drafts"))
        .expect("folder")
        .is_empty());
}

#[test]
fn owners_never_see_each_other() {
    let db = Database::in_memory().expect("db");
    let clock = ManualClock::starting_at(1);
    let notes = NoteLifecycle::with_clock(db.notes.clone(), &clock);

    let mine = notes.create(NewNote::new("mine", "", "u1")).expect("create");
    let theirs = notes.create(NewNote::new("theirs", "", "u2")).expect("create");
    notes
        .update(
            theirs,
            NotePatch {
                is_archived: Some(true),
                is_pinned: Some(true),
                ..Default::default()
            },
        )
        .expect("update");

    let listed = notes.get_by_user(Some("u1")).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine);
    assert!(notes.get_archived("u1").expect("archived").is_empty());
    assert!(notes.get_pinned("u1").expect("pinned").is_empty());
    assert_eq!(notes.get_pinned("u2").expect("pinned").len(), 1);
}

#[test]
fn updates_move_a_note_to_the_front() {
    let db = Database::in_memory().expect("db");
    let clock = ManualClock::starting_at(1_000);
    let notes = NoteLifecycle::with_clock(db.notes.clone(), &clock);

    let first = notes.create(NewNote::new("first", "", "u1")).expect("create");
    clock.advance(1_000);
    let second = notes.create(NewNote::new("second", "", "u1")).expect("create");

    let order = || -> Vec<NoteId> {
        notes
            .get_by_user(Some("u1"))
            .expect("list")
            .into_iter()
            .map(|n| n.id)
            .collect()
    };
    assert_eq!(order(), vec![second, first]);

    clock.advance(1_000);
    notes
        .update(
            first,
            NotePatch {
                content: Some("edited".to_string()),
                ..Default::default()
            },
        )
        .expect("update");
    assert_eq!(order(), vec![first, second]);
}
