use ccnb_core::storage::secure_store::MAX_PASSWORD_ATTEMPTS;
use ccnb_core::{
    ContactRecord, KdfParams, NoteRecord, Password, SecureStore, SecureStoreError, Snapshot,
    StoreConfig, StoredFormat,
};
use std::io;
use std::path::Path;

const FAST_KDF: KdfParams = KdfParams {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

fn store_at(dir: &Path) -> SecureStore {
    SecureStore::new(StoreConfig::new(dir).with_kdf(FAST_KDF))
}

fn sample_snapshot(contact: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();
    let mut record = ContactRecord::new(contact).unwrap();
    record.add_phone("0671234567").unwrap();
    record.set_birthday("04.08.1995").unwrap();
    snapshot.contacts.add(record).unwrap();
    snapshot
        .notes
        .add(NoteRecord::new("Plan", "top secret plan").unwrap())
        .unwrap();
    snapshot
}

fn no_prompt(_: &str, _: u32) -> io::Result<Password> {
    panic!("password prompt must not be shown")
}

#[test]
fn missing_files_yield_fresh_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());

    let loaded = store.load_snapshot("guest", &mut no_prompt).unwrap();
    assert!(loaded.snapshot.is_empty());
    assert!(loaded.password.is_none());
    assert_eq!(loaded.format, StoredFormat::Missing);
}

#[test]
fn plaintext_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let snapshot = sample_snapshot("John");

    let path = store.save_snapshot("John", &snapshot, None).unwrap();
    assert_eq!(path, dir.path().join("john.snap"));
    assert_eq!(store.stored_format("JOHN").unwrap(), StoredFormat::Plain);

    let loaded = store.load_snapshot("john", &mut no_prompt).unwrap();
    assert_eq!(loaded.snapshot, snapshot);
    assert!(loaded.password.is_none());
    assert_eq!(loaded.format, StoredFormat::Plain);
}

#[test]
fn empty_password_selects_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());

    let empty = Password::new("");
    let path = store
        .save_snapshot("guest", &sample_snapshot("John"), Some(&empty))
        .unwrap();
    assert_eq!(path, store.plain_path("guest").unwrap());
    assert!(!store.encrypted_path("guest").unwrap().exists());
}

#[test]
fn encrypted_round_trip_hides_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let snapshot = sample_snapshot("John");
    let password = Password::new("s3cret");

    let path = store
        .save_snapshot("guest", &snapshot, Some(&password))
        .unwrap();
    assert_eq!(path, dir.path().join("guest.snap.enc"));
    assert!(!store.plain_path("guest").unwrap().exists());

    let raw = std::fs::read(&path).unwrap();
    let haystack = String::from_utf8_lossy(&raw);
    assert!(!haystack.contains("top secret"));
    assert!(!haystack.contains("+380671234567"));

    let mut calls = Vec::new();
    let mut prompt = |user: &str, attempts_left: u32| -> io::Result<Password> {
        calls.push((user.to_string(), attempts_left));
        Ok(Password::new("s3cret"))
    };
    let loaded = store.load_snapshot("guest", &mut prompt).unwrap();
    assert_eq!(loaded.snapshot, snapshot);
    assert_eq!(loaded.password.unwrap().expose(), "s3cret");
    assert_eq!(loaded.format, StoredFormat::Encrypted);
    assert_eq!(calls, [("guest".to_string(), MAX_PASSWORD_ATTEMPTS)]);
}

#[test]
fn three_wrong_passwords_report_corrupted_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    store
        .save_snapshot("guest", &sample_snapshot("John"), Some(&Password::new("right")))
        .unwrap();

    let mut attempts = Vec::new();
    let mut prompt = |_: &str, attempts_left: u32| -> io::Result<Password> {
        attempts.push(attempts_left);
        Ok(Password::new("wrong"))
    };
    let err = store.load_snapshot("guest", &mut prompt).unwrap_err();

    assert!(matches!(err, SecureStoreError::CorruptedFile { .. }));
    assert!(err.to_string().contains("wrong password or file is corrupted"));
    assert_eq!(attempts, [3, 2, 1]);
    assert!(store.encrypted_path("guest").unwrap().exists());
}

#[test]
fn correct_password_on_a_later_attempt_unlocks() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let snapshot = sample_snapshot("John");
    store
        .save_snapshot("guest", &snapshot, Some(&Password::new("right")))
        .unwrap();

    let mut answers = vec!["right", "wrong"];
    let mut prompt = |_: &str, _: u32| -> io::Result<Password> {
        Ok(Password::new(answers.pop().unwrap_or_default()))
    };
    let loaded = store.load_snapshot("guest", &mut prompt).unwrap();
    assert_eq!(loaded.snapshot, snapshot);
}

#[test]
fn damaged_header_fails_without_prompting() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    std::fs::write(store.encrypted_path("guest").unwrap(), b"definitely not sealed").unwrap();

    let err = store.load_snapshot("guest", &mut no_prompt).unwrap_err();
    assert!(matches!(err, SecureStoreError::CorruptedFile { .. }));
}

#[test]
fn excessive_kdf_cost_in_header_fails_without_prompting() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let path = store
        .save_snapshot("guest", &sample_snapshot("John"), Some(&Password::new("pw")))
        .unwrap();

    // Time cost sits after the 8-byte magic and the 4-byte memory cost.
    let mut sealed = std::fs::read(&path).unwrap();
    sealed[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    std::fs::write(&path, sealed).unwrap();

    let err = store.load_snapshot("guest", &mut no_prompt).unwrap_err();
    assert!(matches!(err, SecureStoreError::CorruptedFile { .. }));
}

#[test]
fn tampered_body_exhausts_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let path = store
        .save_snapshot("guest", &sample_snapshot("John"), Some(&Password::new("pw")))
        .unwrap();

    let mut sealed = std::fs::read(&path).unwrap();
    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;
    std::fs::write(&path, sealed).unwrap();

    let mut calls = 0;
    let mut prompt = |_: &str, _: u32| -> io::Result<Password> {
        calls += 1;
        Ok(Password::new("pw"))
    };
    let err = store.load_snapshot("guest", &mut prompt).unwrap_err();
    assert!(matches!(err, SecureStoreError::CorruptedFile { .. }));
    assert_eq!(calls, 3);
}

#[test]
fn encrypted_file_wins_over_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    store
        .save_snapshot("guest", &sample_snapshot("Plain"), None)
        .unwrap();
    let protected = sample_snapshot("Sealed");
    store
        .save_snapshot("guest", &protected, Some(&Password::new("pw")))
        .unwrap();

    let mut prompt = |_: &str, _: u32| -> io::Result<Password> { Ok(Password::new("pw")) };
    let loaded = store.load_snapshot("guest", &mut prompt).unwrap();
    assert_eq!(loaded.snapshot, protected);
}

#[test]
fn prompt_failure_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    store
        .save_snapshot("guest", &sample_snapshot("John"), Some(&Password::new("pw")))
        .unwrap();

    let mut prompt =
        |_: &str, _: u32| -> io::Result<Password> { Err(io::Error::other("no terminal")) };
    let err = store.load_snapshot("guest", &mut prompt).unwrap_err();
    assert!(matches!(err, SecureStoreError::Prompt(_)));
}

#[test]
fn undecodable_plaintext_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    let path = store.plain_path("guest").unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    match store.load_snapshot("guest", &mut no_prompt).unwrap_err() {
        SecureStoreError::Decode { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_base_dir_is_created_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("nested").join("store");
    let store = store_at(&base);

    store
        .save_snapshot("guest", &sample_snapshot("John"), None)
        .unwrap();
    assert!(base.join("guest.snap").is_file());
}

#[test]
fn unusable_base_dir_fails_with_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"x").unwrap();
    let store = store_at(&blocker);

    let err = store
        .save_snapshot("guest", &sample_snapshot("John"), None)
        .unwrap_err();
    assert!(matches!(err, SecureStoreError::Io { .. }));
}

#[test]
fn delete_saves_reports_whether_a_file_existed() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    store
        .save_snapshot("guest", &sample_snapshot("John"), None)
        .unwrap();

    assert!(store.delete_unencrypted_save("guest").unwrap());
    assert!(!store.delete_unencrypted_save("guest").unwrap());
    assert!(!store.delete_encrypted_save("guest").unwrap());
    assert_eq!(store.stored_format("guest").unwrap(), StoredFormat::Missing);
}

#[test]
fn path_like_user_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path());
    assert!(matches!(
        store.save_snapshot("../escape", &Snapshot::new(), None),
        Err(SecureStoreError::InvalidUser(_))
    ));
}
