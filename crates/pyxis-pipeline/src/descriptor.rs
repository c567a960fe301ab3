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

//! Descriptor emission: the tool-time metadata/settings artifacts.
//!
//! The pipeline treats emission as an external collaborator behind the
//! [`DescriptorEmitter`] trait; only the contract matters to the
//! orchestrator. The bundled [`JsonDescriptorEmitter`] writes one metadata
//! document and one settings document per asset, under a folder derived
//! deterministically from the identifier's hex digits, so any tool that
//! knows an id can locate its artifacts without an index.

use crate::error::DescriptorError;
use pyxis_core::{AssetKind, AssetRecord, InstanceId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value compile options attached to an asset's settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileSettings {
    /// Option name → value, kept sorted for stable output.
    pub entries: BTreeMap<String, String>,
}

impl CompileSettings {
    /// Type-appropriate default compile options for a freshly seen asset.
    pub fn defaults_for(kind: AssetKind) -> Self {
        let mut entries = BTreeMap::new();
        match kind {
            AssetKind::Texture => {
                entries.insert("mipmaps".into(), "true".into());
                entries.insert("srgb".into(), "true".into());
                entries.insert("compression".into(), "bc7".into());
            }
            AssetKind::Mesh => {
                entries.insert("optimize_vertex_cache".into(), "true".into());
                entries.insert("generate_tangents".into(), "true".into());
            }
            AssetKind::Audio => {
                entries.insert("streaming".into(), "false".into());
                entries.insert("sample_rate".into(), "48000".into());
            }
            AssetKind::Shader => {
                entries.insert("optimize".into(), "true".into());
            }
            AssetKind::Material | AssetKind::Scene | AssetKind::Unknown => {}
        }
        Self { entries }
    }

    /// Sets one option, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

/// Contract for emitting and retracting descriptor artifacts.
///
/// Implementations must be safe to call once per changed asset per pass;
/// emitting the same record twice overwrites the previous artifacts.
pub trait DescriptorEmitter {
    /// Writes (or rewrites) the artifacts for one asset record.
    fn emit(
        &self,
        record: &AssetRecord,
        display_name: Option<&str>,
        settings: &CompileSettings,
    ) -> Result<(), DescriptorError>;

    /// Deletes the artifacts for an id, pruning now-empty folders.
    /// Removing artifacts that were never emitted is not an error.
    fn remove(&self, id: InstanceId) -> Result<(), DescriptorError>;
}

/// The metadata document written alongside each asset's settings.
#[derive(Serialize)]
struct MetadataDoc<'a> {
    name: &'a str,
    id: String,
    kind: String,
    kind_tag: u32,
    source_path: &'a str,
    tags: Vec<String>,
    dependencies: Vec<String>,
}

/// Writes descriptor artifacts as pretty-printed JSON files.
pub struct JsonDescriptorEmitter {
    root: PathBuf,
}

impl JsonDescriptorEmitter {
    /// Creates an emitter rooted at the given descriptor directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The folder holding artifacts for an id: two levels of hex fan-out
    /// derived from the leading digits, then the full hex id.
    fn folder_for(&self, id: InstanceId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[0..2]).join(&hex[2..4]).join(hex)
    }

    /// Removes empty directories from `from` upward, stopping at (and
    /// never removing) the emitter root.
    fn prune_empty_ancestors(&self, from: &Path) {
        let mut current = from.to_path_buf();
        while current.starts_with(&self.root) && current != self.root {
            // remove_dir refuses non-empty directories, which ends the walk.
            if fs::remove_dir(&current).is_err() {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }
    }
}

impl DescriptorEmitter for JsonDescriptorEmitter {
    fn emit(
        &self,
        record: &AssetRecord,
        display_name: Option<&str>,
        settings: &CompileSettings,
    ) -> Result<(), DescriptorError> {
        let folder = self.folder_for(record.id);
        fs::create_dir_all(&folder)?;

        let hex = record.id.to_hex();
        let fallback_name = record
            .source_path
            .rsplit('/')
            .next()
            .unwrap_or(record.source_path.as_str());
        let metadata = MetadataDoc {
            name: display_name.unwrap_or(fallback_name),
            id: hex.clone(),
            kind: format!("{:016x}", record.kind.kind_id().as_raw()),
            kind_tag: record.kind.tag(),
            source_path: &record.source_path,
            tags: vec![record.kind.category_name().to_string()],
            dependencies: Vec::new(),
        };

        let metadata_text = serde_json::to_string_pretty(&metadata)?;
        let settings_text = serde_json::to_string_pretty(settings)?;
        fs::write(folder.join(format!("{hex}.meta.json")), metadata_text)?;
        fs::write(folder.join(format!("{hex}.settings.json")), settings_text)?;
        Ok(())
    }

    fn remove(&self, id: InstanceId) -> Result<(), DescriptorError> {
        let folder = self.folder_for(id);
        let hex = id.to_hex();
        for name in [format!("{hex}.meta.json"), format!("{hex}.settings.json")] {
            match fs::remove_file(folder.join(&name)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("descriptor: '{name}' already absent on removal");
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.prune_empty_ancestors(&folder);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyxis_core::InstanceId;

    fn sample_record() -> AssetRecord {
        AssetRecord {
            id: InstanceId::from_raw(0x8abc_def0_1234_5678),
            kind: AssetKind::Texture,
            source_path: "assets/textures/rock.png".to_string(),
            extension: "png".to_string(),
            content_signature: 1,
            last_write_secs: 2,
            valid: true,
        }
    }

    #[test]
    fn artifact_folder_is_derived_from_hex_digits() {
        let emitter = JsonDescriptorEmitter::new(PathBuf::from("/out"));
        let folder = emitter.folder_for(InstanceId::from_raw(0x8abc_def0_1234_5678));
        assert_eq!(
            folder,
            PathBuf::from("/out/8a/bc/8abcdef012345678")
        );
    }

    #[test]
    fn emit_then_remove_leaves_no_residue() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = JsonDescriptorEmitter::new(dir.path().to_path_buf());
        let record = sample_record();

        emitter
            .emit(&record, Some("Rock"), &CompileSettings::defaults_for(record.kind))
            .expect("emit");
        let folder = emitter.folder_for(record.id);
        assert!(folder.join("8abcdef012345678.meta.json").exists());
        assert!(folder.join("8abcdef012345678.settings.json").exists());

        emitter.remove(record.id).expect("remove");
        assert!(!folder.exists(), "artifact folder should be pruned");
        assert!(!dir.path().join("8a").exists(), "fan-out folders should be pruned");
        assert!(dir.path().exists(), "descriptor root must survive");
    }

    #[test]
    fn removing_never_emitted_artifacts_is_fine() {
        let dir = tempfile::tempdir().expect("tempdir");
        let emitter = JsonDescriptorEmitter::new(dir.path().to_path_buf());
        emitter
            .remove(InstanceId::from_raw(0x8000_0000_0000_0001))
            .expect("remove of absent artifacts must succeed");
    }

    #[test]
    fn default_settings_vary_by_kind() {
        let texture = CompileSettings::defaults_for(AssetKind::Texture);
        let scene = CompileSettings::defaults_for(AssetKind::Scene);
        assert!(texture.entries.contains_key("mipmaps"));
        assert!(scene.entries.is_empty());
    }
}
