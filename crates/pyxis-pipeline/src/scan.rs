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

//! Incremental filesystem change detection.
//!
//! The scanner walks the configured root directories, filters entries by
//! extension and ignore rules, and diffs each file's (size, mtime) stamp
//! against the snapshot persisted by the previous run. The result is one
//! atomic batch of [`Change`]s; the snapshot is updated in place as a side
//! effect of the walk.

use crate::error::PersistError;
use pyxis_core::path::{extension_of, normalize_path};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Modification-time slack, in seconds, below which a file is not
/// considered changed. Filesystems with coarse timestamp resolution (FAT,
/// some network mounts) can report mtimes that wobble by up to a second.
const MTIME_TOLERANCE_SECS: u64 = 1;

/// The scanner's remembered view of one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    /// Last-write time in whole seconds since the Unix epoch.
    pub last_write_secs: u64,
    /// File size in bytes.
    pub size: u64,
}

impl FileStamp {
    /// A cheap stamp-derived signature, recorded on asset records as their
    /// content signature. Not a content hash: two files with the same size
    /// written in the same second produce the same signature.
    pub fn signature(&self) -> u64 {
        let mut x = self.size ^ self.last_write_secs.rotate_left(32);
        x ^= x >> 33;
        x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
        x ^= x >> 33;
        x
    }
}

/// One filesystem change observed by a scan pass.
///
/// Paths are in the normalized form used as identity-store keys. Within a
/// single pass a path appears at most once: it is never reported both
/// Added/Modified and Removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The path was not present in the previous snapshot.
    Added(String),
    /// The path's size or (adjusted) mtime differs from the snapshot.
    Modified(String),
    /// The path was in the snapshot but no longer exists under any root.
    Removed(String),
}

impl Change {
    /// The normalized path this change refers to.
    pub fn path(&self) -> &str {
        match self {
            Change::Added(p) | Change::Modified(p) | Change::Removed(p) => p,
        }
    }
}

/// Walks source roots and diffs them against a persisted snapshot.
///
/// Assumes exclusive access from one tool thread; a scan runs to completion
/// and is not cancellable mid-pass.
pub struct ChangeScanner {
    roots: Vec<PathBuf>,
    /// Allowed lowercase extensions, without dots. Empty means all.
    extensions: Vec<String>,
    /// Substrings that exclude a normalized path when contained in it.
    ignores: Vec<String>,
    include_hidden: bool,
    snapshot: HashMap<String, FileStamp>,
}

impl ChangeScanner {
    /// Creates a scanner over the given root directories.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            extensions: Vec::new(),
            ignores: Vec::new(),
            include_hidden: false,
            snapshot: HashMap::new(),
        }
    }

    /// Restricts scanning to the given extensions (lowercase, no dot).
    /// An empty list admits every extension.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Excludes any path containing one of the given substrings.
    pub fn with_ignores(mut self, ignores: Vec<String>) -> Self {
        self.ignores = ignores;
        self
    }

    /// Includes dot-prefixed files and directories in the walk.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Returns the remembered stamp for a normalized path, if tracked.
    pub fn stamp(&self, path: &str) -> Option<&FileStamp> {
        self.snapshot.get(path)
    }

    /// Number of files currently tracked by the snapshot.
    pub fn tracked(&self) -> usize {
        self.snapshot.len()
    }

    /// Performs one scan pass and returns the batch of observed changes.
    ///
    /// Per-root and per-entry filesystem errors are logged and skipped;
    /// a failing root never aborts the remaining roots. The snapshot is
    /// updated in place: entries are added/refreshed as files are seen,
    /// and entries for vanished files are evicted and reported Removed.
    ///
    /// Known limitation of the (size, mtime) heuristic: an edit that keeps
    /// the size identical and lands within [`MTIME_TOLERANCE_SECS`] of the
    /// remembered mtime is not detected. The identity store's content
    /// signature field is where a hash-based check would hook in.
    pub fn scan(&mut self) -> Vec<Change> {
        let mut changes = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let include_hidden = self.include_hidden;

        let roots = self.roots.clone();
        for root in &roots {
            let walker = WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_entry(move |entry| {
                    include_hidden || entry.depth() == 0 || !is_hidden(entry.file_name())
                });

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("scan: skipping entry under '{}': {err}", root.display());
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = normalize_path(entry.path());
                if self.ignores.iter().any(|s| path.contains(s.as_str())) {
                    continue;
                }
                if !self.extensions.is_empty() {
                    let ext = extension_of(&path);
                    if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                        continue;
                    }
                }

                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        log::warn!("scan: cannot stat '{path}': {err}");
                        continue;
                    }
                };
                let stamp = FileStamp {
                    last_write_secs: metadata
                        .modified()
                        .ok()
                        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                        .map(|d| d.as_secs())
                        .unwrap_or(0),
                    size: metadata.len(),
                };

                // Overlapping roots: first sighting wins.
                if !seen.insert(path.clone()) {
                    continue;
                }

                match self.snapshot.get(&path) {
                    None => {
                        changes.push(Change::Added(path.clone()));
                    }
                    Some(previous) => {
                        let drift = previous.last_write_secs.abs_diff(stamp.last_write_secs);
                        if previous.size != stamp.size || drift > MTIME_TOLERANCE_SECS {
                            changes.push(Change::Modified(path.clone()));
                        }
                    }
                }
                self.snapshot.insert(path, stamp);
            }
        }

        let removed: Vec<String> = self
            .snapshot
            .keys()
            .filter(|path| !seen.contains(*path))
            .cloned()
            .collect();
        for path in removed {
            self.snapshot.remove(&path);
            changes.push(Change::Removed(path));
        }

        changes
    }

    /// Loads the snapshot from its line-oriented `path|mtime|size` file.
    ///
    /// A missing file is a first run, not an error; malformed lines are
    /// logged and skipped.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<(), PersistError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("scan: no snapshot at '{}', first run", path.display());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        self.snapshot.clear();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_snapshot_line(line) {
                Some((file, stamp)) => {
                    self.snapshot.insert(file, stamp);
                }
                None => {
                    log::warn!(
                        "scan: malformed snapshot line {} in '{}', skipped",
                        number + 1,
                        path.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Saves the snapshot as one `path|mtime|size` line per tracked file,
    /// sorted by path so successive saves diff cleanly.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), PersistError> {
        let mut entries: Vec<_> = self.snapshot.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = String::new();
        for (file, stamp) in entries {
            out.push_str(file);
            out.push('|');
            out.push_str(&stamp.last_write_secs.to_string());
            out.push('|');
            out.push_str(&stamp.size.to_string());
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }
}

/// Parses one `path|mtime|size` line. The split runs from the right so the
/// path itself may contain `|`.
fn parse_snapshot_line(line: &str) -> Option<(String, FileStamp)> {
    let mut fields = line.rsplitn(3, '|');
    let size = fields.next()?.parse().ok()?;
    let last_write_secs = fields.next()?.parse().ok()?;
    let path = fields.next()?;
    if path.is_empty() {
        return None;
    }
    Some((
        path.to_string(),
        FileStamp {
            last_write_secs,
            size,
        },
    ))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
