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

//! The persistent identity store: path ↔ id bookkeeping for source assets.
//!
//! The store owns every [`AssetRecord`] and maintains two indexes over
//! them, by id and by normalized source path. The indexes are always
//! mutated together; any future multi-threaded use needs external
//! synchronization around the pair.

use crate::error::PersistError;
use pyxis_core::path::{extension_of, normalize};
use pyxis_core::{AssetKind, AssetRecord, InstanceId};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Bidirectional id ↔ record map with line-oriented persistence.
#[derive(Default)]
pub struct IdentityStore {
    records: HashMap<InstanceId, AssetRecord>,
    by_path: HashMap<String, InstanceId>,
}

impl IdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for a source path, minting one on first sighting.
    ///
    /// This is the invariant the rest of the pipeline depends on: for a
    /// stable path the same id is returned on every call, in the same run
    /// or after a store reload. An asset's identifier never changes while
    /// its logical path is unchanged.
    pub fn ensure_id_for_path(&mut self, path: &str) -> InstanceId {
        let normalized = normalize(path);
        debug_assert!(!normalized.is_empty(), "asset path must not be empty");

        if let Some(&id) = self.by_path.get(&normalized) {
            return id;
        }

        let id = InstanceId::generate();
        let extension = extension_of(&normalized);
        let record = AssetRecord {
            id,
            kind: AssetKind::from_extension(&extension),
            source_path: normalized.clone(),
            extension,
            content_signature: 0,
            last_write_secs: 0,
            valid: true,
        };
        self.records.insert(id, record);
        self.by_path.insert(normalized, id);
        id
    }

    /// Looks up a record by id.
    pub fn find(&self, id: InstanceId) -> Option<&AssetRecord> {
        self.records.get(&id)
    }

    /// Looks up a record by source path (normalized before lookup).
    pub fn find_by_source(&self, path: &str) -> Option<&AssetRecord> {
        let id = self.by_path.get(&normalize(path))?;
        self.records.get(id)
    }

    /// Mutable access to a record for refreshing scan-derived fields.
    ///
    /// The source path must not be edited through this handle; renames go
    /// through [`IdentityStore::remove_by_source`] and
    /// [`IdentityStore::ensure_id_for_path`] so both indexes stay in step.
    pub fn record_mut(&mut self, id: InstanceId) -> Option<&mut AssetRecord> {
        self.records.get_mut(&id)
    }

    /// Removes a record by id, keeping both indexes consistent.
    pub fn remove(&mut self, id: InstanceId) -> Option<AssetRecord> {
        let record = self.records.remove(&id)?;
        self.by_path.remove(&record.source_path);
        Some(record)
    }

    /// Removes a record by source path, keeping both indexes consistent.
    pub fn remove_by_source(&mut self, path: &str) -> Option<AssetRecord> {
        let id = self.by_path.remove(&normalize(path))?;
        self.records.remove(&id)
    }

    /// Number of tracked assets.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store tracks no assets.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.records.values()
    }

    /// Loads the store from its line-oriented file.
    ///
    /// A missing file is a first run, not an error. Leading `#` comment
    /// lines are ignored; unparseable record lines are logged and skipped
    /// so one corrupt line never takes down the rest of the store.
    pub fn load(&mut self, path: &Path) -> Result<(), PersistError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("store: no identity store at '{}', first run", path.display());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        self.records.clear();
        self.by_path.clear();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(record) = parse_record_line(line) else {
                log::warn!(
                    "store: malformed record line {} in '{}', skipped",
                    number + 1,
                    path.display()
                );
                continue;
            };
            if self.by_path.contains_key(&record.source_path) {
                log::warn!(
                    "store: duplicate source path '{}' on line {}, skipped",
                    record.source_path,
                    number + 1
                );
                continue;
            }
            if self.records.contains_key(&record.id) {
                log::warn!(
                    "store: duplicate id {} on line {}, skipped",
                    record.id.to_hex(),
                    number + 1
                );
                continue;
            }
            self.by_path.insert(record.source_path.clone(), record.id);
            self.records.insert(record.id, record);
        }
        Ok(())
    }

    /// Saves the store, one record per line, sorted by source path.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.source_path.cmp(&b.source_path));

        let mut out = String::from(
            "# Pyxis identity store\n# id|type|sourcePath|ext|contentHash|lastWriteTime|valid\n",
        );
        for record in records {
            out.push_str(&format_record_line(record));
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }
}

fn format_record_line(record: &AssetRecord) -> String {
    format!(
        "{}|{}|{}|{}|{:016x}|{}|{}",
        record.id.to_hex(),
        record.kind.tag(),
        record.source_path,
        record.extension,
        record.content_signature,
        record.last_write_secs,
        u8::from(record.valid),
    )
}

/// Parses one `idHex|typeInt|sourcePath|ext|contentHash|lastWriteTime|valid`
/// line. The leading two fields split from the left and the trailing four
/// from the right, so the source path itself may contain `|`.
fn parse_record_line(line: &str) -> Option<AssetRecord> {
    let mut head = line.splitn(3, '|');
    let id = InstanceId::from_hex(head.next()?)?;
    let kind = AssetKind::from_tag(head.next()?.parse().ok()?)?;
    let rest = head.next()?;

    let mut tail = rest.rsplitn(5, '|');
    let valid = match tail.next()? {
        "1" => true,
        "0" => false,
        _ => return None,
    };
    let last_write_secs = tail.next()?.parse().ok()?;
    let content_signature = u64::from_str_radix(tail.next()?, 16).ok()?;
    let extension = tail.next()?.to_string();
    let source_path = tail.next()?;
    if source_path.is_empty() {
        return None;
    }

    Some(AssetRecord {
        id,
        kind,
        source_path: source_path.to_string(),
        extension,
        content_signature,
        last_write_secs,
        valid,
    })
}
