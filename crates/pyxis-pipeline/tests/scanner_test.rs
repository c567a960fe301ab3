// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use pyxis_pipeline::{Change, ChangeScanner};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn added_paths(changes: &[Change]) -> BTreeSet<String> {
    changes
        .iter()
        .filter_map(|c| match c {
            Change::Added(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap()
}

#[test]
fn first_scan_reports_added_then_diffs_modify_and_remove() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"aaaa").unwrap();
    fs::write(dir.path().join("b.png"), b"bbbb").unwrap();
    fs::write(dir.path().join("c.png"), b"cccc").unwrap();

    let mut scanner = ChangeScanner::new(vec![dir.path().to_path_buf()]);

    // --- First pass: everything is Added ---
    let changes = scanner.scan();
    assert_eq!(changes.len(), 3);
    let added: BTreeSet<String> = added_paths(&changes)
        .iter()
        .map(|p| file_name(p).to_string())
        .collect();
    assert_eq!(
        added,
        ["a.png", "b.png", "c.png"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    );

    // --- Change b's size, delete c ---
    fs::write(dir.path().join("b.png"), b"bbbb-grown").unwrap();
    fs::remove_file(dir.path().join("c.png")).unwrap();

    let changes = scanner.scan();
    assert_eq!(changes.len(), 2, "exactly one Modified and one Removed: {changes:?}");
    assert!(changes
        .iter()
        .any(|c| matches!(c, Change::Modified(p) if file_name(p) == "b.png")));
    assert!(changes
        .iter()
        .any(|c| matches!(c, Change::Removed(p) if file_name(p) == "c.png")));

    // --- Nothing changed: quiet pass ---
    let changes = scanner.scan();
    assert!(changes.is_empty(), "unexpected changes: {changes:?}");
}

#[test]
fn mtime_wobble_within_tolerance_is_not_a_modification() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"aaaa").unwrap();

    let mut scanner = ChangeScanner::new(vec![dir.path().to_path_buf()]);
    assert_eq!(scanner.scan().len(), 1);

    // Rewrite the snapshot with the remembered mtime shifted by one
    // second, simulating a filesystem whose timestamps wobble. The
    // snapshot lives outside the scanned root so it is not picked up
    // as a change itself.
    let snap_dir = tempdir().expect("tempdir");
    let snapshot = snap_dir.path().join("scan.snapshot");
    scanner.save_snapshot(&snapshot).expect("save");
    shift_snapshot_mtimes(&snapshot, -1);
    scanner.load_snapshot(&snapshot).expect("load");
    assert!(
        scanner.scan().is_empty(),
        "a 1s drift with unchanged size must not be Modified"
    );

    // A drift beyond the tolerance is a real modification.
    scanner.save_snapshot(&snapshot).expect("save");
    shift_snapshot_mtimes(&snapshot, -5);
    scanner.load_snapshot(&snapshot).expect("load");
    let changes = scanner.scan();
    assert_eq!(changes.len(), 1);
    assert!(matches!(&changes[0], Change::Modified(_)));
}

/// Rewrites every `path|mtime|size` line with the mtime shifted.
fn shift_snapshot_mtimes(snapshot: &Path, delta: i64) {
    let text = fs::read_to_string(snapshot).unwrap();
    let shifted: String = text
        .lines()
        .map(|line| {
            let mut fields = line.rsplitn(3, '|');
            let size = fields.next().unwrap();
            let mtime: i64 = fields.next().unwrap().parse().unwrap();
            let path = fields.next().unwrap();
            format!("{path}|{}|{size}\n", mtime + delta)
        })
        .collect();
    fs::write(snapshot, shifted).unwrap();
}

#[test]
fn filters_apply_to_extension_hidden_and_ignored() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("keep.png"), b"x").unwrap();
    fs::write(dir.path().join("drop.txt"), b"x").unwrap();
    fs::write(dir.path().join(".hidden.png"), b"x").unwrap();
    fs::create_dir(dir.path().join("cache")).unwrap();
    fs::write(dir.path().join("cache/tmp.png"), b"x").unwrap();

    let mut scanner = ChangeScanner::new(vec![dir.path().to_path_buf()])
        .with_extensions(vec!["png".to_string()])
        .with_ignores(vec!["/cache/".to_string()]);

    let changes = scanner.scan();
    let added = added_paths(&changes);
    assert_eq!(added.len(), 1, "only keep.png should pass: {added:?}");
    assert!(added.iter().all(|p| p.ends_with("keep.png")));
}

#[test]
fn hidden_files_are_scanned_when_opted_in() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join(".hidden.png"), b"x").unwrap();

    let mut scanner =
        ChangeScanner::new(vec![dir.path().to_path_buf()]).include_hidden(true);
    assert_eq!(scanner.scan().len(), 1);
}

#[test]
fn a_missing_root_does_not_abort_the_others() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"x").unwrap();

    let mut scanner = ChangeScanner::new(vec![
        dir.path().join("does-not-exist"),
        dir.path().to_path_buf(),
    ]);
    let changes = scanner.scan();
    assert_eq!(changes.len(), 1, "the healthy root must still be scanned");
}

#[test]
fn snapshot_round_trips_through_disk() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"aaaa").unwrap();
    fs::write(dir.path().join("b.png"), b"bbbb").unwrap();

    let snap_dir = tempdir().expect("tempdir");
    let snapshot = snap_dir.path().join("scan.snapshot");
    let mut scanner = ChangeScanner::new(vec![dir.path().to_path_buf()]);
    scanner.scan();
    scanner.save_snapshot(&snapshot).expect("save");

    // A fresh scanner restored from the snapshot sees a quiet world.
    let mut restored = ChangeScanner::new(vec![dir.path().to_path_buf()]);
    restored.load_snapshot(&snapshot).expect("load");
    assert_eq!(restored.tracked(), 2);
    assert!(restored.scan().is_empty());
}

#[test]
fn corrupt_snapshot_lines_are_skipped_not_fatal() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.png"), b"aaaa").unwrap();

    let snap_dir = tempdir().expect("tempdir");
    let snapshot = snap_dir.path().join("scan.snapshot");
    let mut scanner = ChangeScanner::new(vec![dir.path().to_path_buf()]);
    scanner.scan();
    scanner.save_snapshot(&snapshot).expect("save");

    let mut text = fs::read_to_string(&snapshot).unwrap();
    text.push_str("this line is garbage\n");
    fs::write(&snapshot, text).unwrap();

    let mut restored = ChangeScanner::new(vec![dir.path().to_path_buf()]);
    restored.load_snapshot(&snapshot).expect("load survives garbage");
    assert_eq!(restored.tracked(), 1);
    assert!(restored.scan().is_empty());
}
