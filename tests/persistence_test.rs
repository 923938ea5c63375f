#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{write_scans, write_seed};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let seed = dir.path().join("seed.json");
    write_seed(&seed, 10_000, &[("ord-1", "60"), ("ord-2", "15")]).unwrap();

    // 1. First run: pay ord-1
    let scans1 = dir.path().join("scans1.csv");
    write_scans(&scans1, &["ord-1"]).unwrap();

    let output1 = Command::new(cargo_bin!("foodcard"))
        .arg("scan")
        .arg(&scans1)
        .arg("--seed")
        .arg(&seed)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    assert!(String::from_utf8_lossy(&output1.stdout).contains("ord-1,ok,40.00"));

    // 2. Second run on the same DB: reseeding must not reset the wallet or the order
    let scans2 = dir.path().join("scans2.csv");
    write_scans(&scans2, &["ord-1", "ord-2"]).unwrap();

    let output2 = Command::new(cargo_bin!("foodcard"))
        .arg("scan")
        .arg(&scans2)
        .arg("--seed")
        .arg(&seed)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout2.contains("ord-1,AlreadySettled,"));
    assert!(stdout2.contains("ord-2,ok,25.00"));
}
