use std::fs;

use adstats::{compare_files, compare_ordered, ComparePolicy, TrailingLines};

#[test]
fn identical_three_line_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.cured");
    let b = dir.path().join("a.cured.com.decom");
    fs::write(&a, "ACGT\nNNNN\nTTTT\n").unwrap();
    fs::write(&b, "ACGT\nNNNN\nTTTT\n").unwrap();
    let mut diag = Vec::new();
    assert!(compare_files(&a, &b, ComparePolicy::default(), &mut diag).unwrap());
    assert!(diag.is_empty());
}

#[test]
fn second_line_differs() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, "ACGT\nNNNN\nTTTT\n").unwrap();
    fs::write(&b, "ACGT\nNNN\nTTTT\n").unwrap();
    let mut diag = Vec::new();
    assert!(!compare_files(&a, &b, ComparePolicy::default(), &mut diag).unwrap());
    let diag = String::from_utf8(diag).unwrap();
    assert!(diag.contains("orig_len : comp_len 5 : 4"));
    assert!(diag.contains("Difference in files"));
}

#[test]
fn trailing_line_handling() {
    let mut diag = Vec::new();
    let (short, long) = ("A\n".as_bytes(), "A\nC\n".as_bytes());
    assert!(!compare_ordered(short, long, TrailingLines::Reject, &mut diag).unwrap());
    assert!(String::from_utf8(diag).unwrap().contains("decompressed"));
    let mut diag = Vec::new();
    assert!(compare_ordered(short, long, TrailingLines::Ignore, &mut diag).unwrap());
    assert!(diag.is_empty());
}

#[test]
fn set_policy_on_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, "X\nY\nX\n").unwrap();
    fs::write(&b, "Y\nX\n").unwrap();
    let mut diag = Vec::new();
    assert!(compare_files(&a, &b, ComparePolicy::Set, &mut diag).unwrap());
    fs::write(&b, "Y\nZ\n").unwrap();
    assert!(!compare_files(&a, &b, ComparePolicy::Set, &mut diag).unwrap());
}
