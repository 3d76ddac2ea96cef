use std::{fs, time::Duration};

use model::{
    amount::Amount,
    attendance::{AttendanceKey, AttendanceLog},
    ids::ParticipantId,
    participant::Participant,
    rent::{effective_rent, DEFAULT_RENT},
    snapshot::StateSnapshot,
};
use storage::{debounce::DebouncedSaver, portable, JsonStore};
use tempfile::tempdir;

#[test]
fn missing_file_seeds_initial_state() {
    let dir = tempdir().expect("tempdir");
    let store = JsonStore::new(dir.path().join("visitflow.json"));

    let snapshot = store.load().expect("load");
    assert_eq!(snapshot.blocks.len(), 5);
    assert!(snapshot.participants.is_empty());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().expect("tempdir");
    let store = JsonStore::new(dir.path().join("visitflow.json"));

    let mut snapshot = StateSnapshot::initial();
    let mut participant = Participant::new("Иванова Мария");
    let id = participant.id;
    participant.payments.push(model::payment::Payment::custom(
        Amount::int(5000),
        3,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    ));
    snapshot.participants.push(participant);
    snapshot
        .attendance
        .set(AttendanceKey::new(id, 2024, 0, 15), true);
    snapshot.rent_amount = Amount::int(60000);

    store.save(&snapshot).expect("save");
    let loaded = store.load().expect("load");

    assert_eq!(loaded.participants.len(), 1);
    assert_eq!(loaded.participants[0].payments.len(), 1);
    assert!(loaded
        .attendance
        .is_marked(&AttendanceKey::new(id, 2024, 0, 15)));
    assert_eq!(loaded.rent_amount, Amount::int(60000));
}

#[test]
fn legacy_document_is_tolerated() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("visitflow.json");
    // A document from the era before snapshots and block types:
    // stringly rent, a malformed attendance key, a payment without
    // snapshot fields.
    fs::write(
        &path,
        r#"{
            "blocks": [{"id": 1, "name": "Блок 10 тренировок", "cost": 25000, "trainingCount": 10}],
            "participants": [{
                "id": 100,
                "name": "Петров Олег",
                "payments": [{"blockId": 1, "paymentDate": "2023-11-02"}]
            }],
            "attendance": {"100-2023-10-2": true, "broken-key": true},
            "rentAmount": "50к"
        }"#,
    )
    .expect("write");

    let snapshot = JsonStore::new(path).load().expect("load");
    assert_eq!(snapshot.attendance.len(), 1);
    assert!(snapshot.rent_amount.is_zero());
    assert_eq!(
        effective_rent(snapshot.rent_amount),
        Amount::new(DEFAULT_RENT)
    );
    let payment = &snapshot.participants[0].payments[0];
    assert_eq!(payment.effective_cost(&snapshot.blocks), Amount::int(25000));
}

#[test]
fn debounced_saver_keeps_only_the_latest_snapshot() {
    let dir = tempdir().expect("tempdir");
    let store = JsonStore::new(dir.path().join("visitflow.json"));
    let saver = DebouncedSaver::with_quiet_period(store.clone(), Duration::from_millis(20));

    for rent in [1000, 2000, 3000] {
        let mut snapshot = StateSnapshot::initial();
        snapshot.rent_amount = Amount::int(rent);
        saver.schedule(snapshot);
    }
    std::thread::sleep(Duration::from_millis(200));

    assert_eq!(store.load().expect("load").rent_amount, Amount::int(3000));
}

#[test]
fn debounced_saver_flushes_pending_write() {
    let dir = tempdir().expect("tempdir");
    let store = JsonStore::new(dir.path().join("visitflow.json"));
    let saver = DebouncedSaver::with_quiet_period(store.clone(), Duration::from_secs(600));

    let mut snapshot = StateSnapshot::initial();
    snapshot.rent_amount = Amount::int(77000);
    saver.schedule(snapshot);
    saver.flush();

    assert_eq!(store.load().expect("load").rent_amount, Amount::int(77000));
    assert_eq!(saver.take_error(), None);
}

#[test]
fn portable_import_validates_top_level_shape() {
    let dir = tempdir().expect("tempdir");

    let incomplete = dir.path().join("incomplete.json");
    fs::write(&incomplete, r#"{"blocks": [], "participants": []}"#).expect("write");
    let err = portable::read_portable(&incomplete).expect_err("shape must be rejected");
    assert!(matches!(
        err,
        portable::ImportError::MissingSection("attendance")
    ));

    let not_object = dir.path().join("array.json");
    fs::write(&not_object, "[1, 2, 3]").expect("write");
    assert!(matches!(
        portable::read_portable(&not_object),
        Err(portable::ImportError::NotAnObject)
    ));

    let exported = dir.path().join("export.json");
    let mut log = AttendanceLog::default();
    log.set(AttendanceKey::new(ParticipantId(5), 2024, 3, 12), true);
    let mut snapshot = StateSnapshot::initial();
    snapshot.attendance = log;
    portable::write_portable(&exported, &snapshot).expect("export");
    let imported = portable::read_portable(&exported).expect("import");
    assert_eq!(imported.attendance.len(), 1);
}
