use core_logic::{KeyStore, PrivateKey};
use std::fs;
use tempfile::tempdir;

const KEY_A: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const KEY_B: &str = "8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

fn non_empty_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_loads_keys_in_file_order_skipping_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    let content = format!(
        "\n0x{}\nnot-a-key\n# comment\n   \n{} {}\n",
        KEY_A,
        &KEY_B[..32],
        &KEY_B[32..]
    );
    fs::write(&path, content).unwrap();

    let keys = KeyStore::new(&path).load_all_private_keys().unwrap();

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].to_hex(), KEY_A);
    assert_eq!(keys[1].to_hex(), KEY_B);
}

#[test]
fn test_empty_file_gets_exactly_one_generated_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    fs::write(&path, "").unwrap();

    let keys = KeyStore::new(&path).load_all_private_keys().unwrap();

    assert_eq!(keys.len(), 1);
    let lines = non_empty_lines(&path);
    assert_eq!(lines, vec![keys[0].to_hex()]);
}

#[test]
fn test_missing_file_is_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let key = KeyStore::new(&path).load_one().unwrap();

    assert!(path.exists());
    assert_eq!(non_empty_lines(&path), vec![key.to_hex()]);
}

#[test]
fn test_invalid_only_file_appends_new_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    fs::write(&path, "garbage").unwrap();

    let keys = KeyStore::new(&path).load_all_private_keys().unwrap();

    let lines = non_empty_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "garbage");
    assert_eq!(PrivateKey::parse(&lines[1]).unwrap(), keys[0]);
}

#[test]
fn test_load_one_returns_first_valid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    fs::write(&path, format!("xyz\n{}\n{}\n", KEY_B, KEY_A)).unwrap();

    let key = KeyStore::new(&path).load_one().unwrap();

    assert_eq!(key.to_hex(), KEY_B);
    assert_eq!(non_empty_lines(&path).len(), 3);
}

#[test]
fn test_reread_picks_up_added_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    fs::write(&path, format!("{}\n", KEY_A)).unwrap();
    let store = KeyStore::new(&path);

    assert_eq!(store.load_all_private_keys().unwrap().len(), 1);

    fs::write(&path, format!("{}\n{}\n", KEY_A, KEY_B)).unwrap();
    assert_eq!(store.load_all_private_keys().unwrap().len(), 2);
}

#[test]
fn test_key_count_and_load_at_follow_file_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    fs::write(&path, format!("{}\nbad\n0x{}\n", KEY_A, KEY_B)).unwrap();
    let store = KeyStore::new(&path);

    assert_eq!(store.key_count().unwrap(), 2);
    assert_eq!(store.load_at(0).unwrap().unwrap().to_hex(), KEY_A);
    assert_eq!(store.load_at(1).unwrap().unwrap().to_hex(), KEY_B);
    assert!(store.load_at(2).unwrap().is_none());
}

#[test]
fn test_key_count_creates_key_for_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pv.txt");
    let store = KeyStore::new(&path);

    assert_eq!(store.key_count().unwrap(), 1);
    let created = non_empty_lines(&path);
    assert_eq!(created.len(), 1);
    assert_eq!(store.load_at(0).unwrap().unwrap().to_hex(), created[0]);
}
