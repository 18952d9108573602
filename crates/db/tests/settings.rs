use lens_db::{Db, KEY_LAST_RESET_DATE, KEY_SCANS_USED_TODAY, KEY_SUBSCRIPTION_TIER};

fn setup_db() -> (tempfile::TempDir, Db) {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("lens.sqlite")).expect("open db");
    db.migrate().expect("migrate");
    (dir, db)
}

#[test]
fn settings_round_trip() {
    let (_dir, db) = setup_db();

    assert_eq!(db.get_setting("missing").expect("get"), None);

    db.set_setting(KEY_SUBSCRIPTION_TIER, "premium").expect("set");
    assert_eq!(
        db.get_setting(KEY_SUBSCRIPTION_TIER).expect("get"),
        Some("premium".to_string())
    );

    db.set_setting(KEY_SUBSCRIPTION_TIER, "free").expect("overwrite");
    assert_eq!(
        db.get_setting(KEY_SUBSCRIPTION_TIER).expect("get"),
        Some("free".to_string())
    );
}

#[test]
fn replace_settings_writes_every_key() {
    let (_dir, mut db) = setup_db();

    db.replace_settings(&[
        (KEY_SUBSCRIPTION_TIER, "free".to_string()),
        (KEY_SCANS_USED_TODAY, "2".to_string()),
        (KEY_LAST_RESET_DATE, "2026-08-07".to_string()),
    ])
    .expect("replace");

    assert_eq!(
        db.get_setting(KEY_SCANS_USED_TODAY).expect("get"),
        Some("2".to_string())
    );
    assert_eq!(
        db.get_setting(KEY_LAST_RESET_DATE).expect("get"),
        Some("2026-08-07".to_string())
    );
}

#[test]
fn migrate_is_idempotent() {
    let (dir, mut db) = setup_db();
    db.set_setting(KEY_SCANS_USED_TODAY, "3").expect("set");
    db.migrate().expect("second migrate");
    assert_eq!(
        db.get_setting(KEY_SCANS_USED_TODAY).expect("get"),
        Some("3".to_string())
    );

    // Reopen from the same file; data persists across connections.
    drop(db);
    let db = Db::open(dir.path().join("lens.sqlite")).expect("reopen");
    assert_eq!(
        db.get_setting(KEY_SCANS_USED_TODAY).expect("get"),
        Some("3".to_string())
    );
}
