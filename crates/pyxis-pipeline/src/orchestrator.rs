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

//! The pipeline orchestrator: one scan → identify → emit → persist pass.
//!
//! The orchestrator is an explicitly constructed context object threaded
//! through the tool entry point; there is no hidden global instance. A
//! single asset's classification or emission failure is logged and never
//! halts the pass. Persistence of the identity store and the snapshot has
//! no transactional guarantee across the two files.

use crate::descriptor::{CompileSettings, DescriptorEmitter, JsonDescriptorEmitter};
use crate::error::PipelineError;
use crate::scan::{Change, ChangeScanner};
use crate::store::IdentityStore;
use pyxis_core::path::extension_of;
use pyxis_core::AssetKind;
use std::fs;
use std::path::PathBuf;

/// Configuration for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories to scan for source assets.
    pub source_roots: Vec<PathBuf>,
    /// Directory receiving the identity store, snapshot, and descriptors.
    pub output_root: PathBuf,
    /// Allowed extensions (lowercase, no dot); empty admits all.
    pub allowed_extensions: Vec<String>,
    /// Substrings excluding a path from scanning.
    pub ignore_substrings: Vec<String>,
    /// Whether dot-prefixed files and directories are scanned.
    pub include_hidden: bool,
    /// Whether descriptor artifacts are emitted for changed assets.
    pub emit_descriptors: bool,
}

impl PipelineConfig {
    /// A minimal configuration scanning `source_roots` into `output_root`.
    pub fn new(source_roots: Vec<PathBuf>, output_root: PathBuf) -> Self {
        Self {
            source_roots,
            output_root,
            allowed_extensions: Vec::new(),
            ignore_substrings: Vec::new(),
            include_hidden: false,
            emit_descriptors: true,
        }
    }

    /// Path of the persisted scan snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.output_root.join("scan.snapshot")
    }

    /// Path of the persisted identity store.
    pub fn store_path(&self) -> PathBuf {
        self.output_root.join("identity.db")
    }

    /// Root directory for emitted descriptor artifacts.
    pub fn descriptor_root(&self) -> PathBuf {
        self.output_root.join("descriptors")
    }
}

/// Counts of what one pass did, for end-of-task reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Assets seen for the first time.
    pub added: usize,
    /// Assets whose stamp changed since the previous pass.
    pub modified: usize,
    /// Assets whose source file vanished.
    pub removed: usize,
    /// Changes that were logged and skipped (unknown extension, missing
    /// record, emission failure).
    pub skipped: usize,
}

/// Composes the scanner, identity store, and descriptor emitter into one
/// on-demand pass.
pub struct AssetPipeline {
    config: PipelineConfig,
    scanner: ChangeScanner,
    store: IdentityStore,
    emitter: Box<dyn DescriptorEmitter>,
}

impl AssetPipeline {
    /// Builds a pipeline: ensures output directories exist, configures the
    /// scanner, and loads the prior snapshot and identity store.
    ///
    /// Unreadable (as opposed to missing) persisted state is logged and
    /// treated as empty; the pass will then re-report everything as Added,
    /// which is safe because identity assignment is idempotent.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        fs::create_dir_all(&config.output_root)?;
        fs::create_dir_all(config.descriptor_root())?;

        let mut scanner = ChangeScanner::new(config.source_roots.clone())
            .with_extensions(config.allowed_extensions.clone())
            .with_ignores(config.ignore_substrings.clone())
            .include_hidden(config.include_hidden);
        if let Err(err) = scanner.load_snapshot(&config.snapshot_path()) {
            log::warn!("pipeline: could not load snapshot, starting empty: {err}");
        }

        let mut store = IdentityStore::new();
        if let Err(err) = store.load(&config.store_path()) {
            log::warn!("pipeline: could not load identity store, starting empty: {err}");
        }

        let emitter = Box::new(JsonDescriptorEmitter::new(config.descriptor_root()));
        Ok(Self {
            config,
            scanner,
            store,
            emitter,
        })
    }

    /// Replaces the descriptor emitter (tests, alternative artifact formats).
    pub fn with_emitter(mut self, emitter: Box<dyn DescriptorEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Read access to the identity store (inspection and tests).
    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Runs one full pass: scan, classify, assign identities, emit
    /// descriptors, persist. Returns what happened.
    pub fn run_pass(&mut self) -> PassSummary {
        let changes = self.scanner.scan();
        log::info!("pipeline: scan produced {} change(s)", changes.len());

        let mut summary = PassSummary::default();
        for change in changes {
            match change {
                Change::Added(path) => {
                    summary.added += 1;
                    self.ingest(&path, &mut summary);
                }
                Change::Modified(path) => {
                    summary.modified += 1;
                    self.ingest(&path, &mut summary);
                }
                Change::Removed(path) => {
                    self.retire(&path, &mut summary);
                }
            }
        }

        if let Err(err) = self.store.save(&self.config.store_path()) {
            log::error!("pipeline: failed to persist identity store: {err}");
        }
        if let Err(err) = self.scanner.save_snapshot(&self.config.snapshot_path()) {
            log::error!("pipeline: failed to persist snapshot: {err}");
        }

        summary
    }

    /// Handles one Added/Modified path: identity, classification, refresh,
    /// and descriptor emission.
    fn ingest(&mut self, path: &str, summary: &mut PassSummary) {
        let id = self.store.ensure_id_for_path(path);
        let extension = extension_of(path);
        let kind = AssetKind::from_extension(&extension);
        let stamp = self.scanner.stamp(path).copied();

        let Some(record) = self.store.record_mut(id) else {
            // ensure_id_for_path just inserted or found this id.
            log::error!("pipeline: record for '{path}' vanished mid-pass");
            summary.skipped += 1;
            return;
        };
        record.extension = extension;
        record.kind = kind;
        if let Some(stamp) = stamp {
            record.last_write_secs = stamp.last_write_secs;
            record.content_signature = stamp.signature();
        }

        if kind == AssetKind::Unknown {
            record.valid = false;
            log::warn!("pipeline: unknown extension for '{path}', marked invalid and skipped");
            summary.skipped += 1;
            return;
        }
        record.valid = true;

        if self.config.emit_descriptors {
            let settings = CompileSettings::defaults_for(kind);
            if let Some(record) = self.store.find(id) {
                if let Err(err) = self.emitter.emit(record, None, &settings) {
                    log::warn!("pipeline: descriptor emission failed for '{path}': {err}");
                    summary.skipped += 1;
                }
            }
        }
    }

    /// Handles one Removed path: descriptor retraction and record removal.
    fn retire(&mut self, path: &str, summary: &mut PassSummary) {
        let Some(record) = self.store.remove_by_source(path) else {
            log::warn!("pipeline: removed path '{path}' has no identity record, skipped");
            summary.skipped += 1;
            return;
        };
        if let Err(err) = self.emitter.remove(record.id) {
            log::warn!("pipeline: descriptor removal failed for '{path}': {err}");
        }
        summary.removed += 1;
    }
}
