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

//! Asset records and extension-based kind classification.

use crate::ident::{InstanceId, KindId};
use serde::{Deserialize, Serialize};

/// The coarse category an asset belongs to, classified from its extension.
///
/// Each kind carries a stable integer tag used in the persisted identity
/// store, and maps to the deterministic [`KindId`] that names the category
/// on both sides of the tool/runtime boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Triangle meshes and model files.
    Mesh,
    /// Images destined for sampling on the GPU.
    Texture,
    /// Sound effects and music.
    Audio,
    /// Shader source or bytecode.
    Shader,
    /// Material definitions referencing textures and shaders.
    Material,
    /// Scene and prefab descriptions.
    Scene,
    /// Anything the pipeline does not know how to classify.
    Unknown,
}

impl AssetKind {
    /// Classifies an asset from its lowercase extension (no dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "obj" | "gltf" | "glb" | "fbx" => AssetKind::Mesh,
            "png" | "jpg" | "jpeg" | "bmp" | "tga" | "dds" | "ktx2" => AssetKind::Texture,
            "wav" | "ogg" | "mp3" | "flac" => AssetKind::Audio,
            "wgsl" | "glsl" | "hlsl" | "spv" => AssetKind::Shader,
            "mat" => AssetKind::Material,
            "scene" | "prefab" => AssetKind::Scene,
            _ => AssetKind::Unknown,
        }
    }

    /// Returns the stable integer tag persisted in the identity store.
    pub const fn tag(self) -> u32 {
        match self {
            AssetKind::Mesh => 1,
            AssetKind::Texture => 2,
            AssetKind::Audio => 3,
            AssetKind::Shader => 4,
            AssetKind::Material => 5,
            AssetKind::Scene => 6,
            AssetKind::Unknown => 0,
        }
    }

    /// Reconstructs a kind from its persisted tag.
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(AssetKind::Mesh),
            2 => Some(AssetKind::Texture),
            3 => Some(AssetKind::Audio),
            4 => Some(AssetKind::Shader),
            5 => Some(AssetKind::Material),
            6 => Some(AssetKind::Scene),
            0 => Some(AssetKind::Unknown),
            _ => None,
        }
    }

    /// The category name used to derive the deterministic [`KindId`].
    pub const fn category_name(self) -> &'static str {
        match self {
            AssetKind::Mesh => "mesh",
            AssetKind::Texture => "texture",
            AssetKind::Audio => "audio",
            AssetKind::Shader => "shader",
            AssetKind::Material => "material",
            AssetKind::Scene => "scene",
            AssetKind::Unknown => "unknown",
        }
    }

    /// Returns the deterministic category id for this kind.
    pub const fn kind_id(self) -> KindId {
        KindId::from_name(self.category_name())
    }
}

/// The identity card for one tracked source asset.
///
/// Owned by the identity store: created on first sighting of a path,
/// refreshed on re-scan, removed when the source vanishes. The id it holds
/// is always the logical (serializable) form, never a transient handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// The stable instance id assigned to this source path.
    pub id: InstanceId,
    /// The classified category.
    pub kind: AssetKind,
    /// The normalized source path (forward slashes, no trailing slash).
    pub source_path: String,
    /// Lowercase extension without the dot, best-guess at creation time.
    pub extension: String,
    /// A cheap content signature derived from the file stamp. Not a content
    /// hash; see the scanner's change heuristic.
    pub content_signature: u64,
    /// Last-write time of the source, in whole seconds since the epoch.
    pub last_write_secs: u64,
    /// Whether the asset classified successfully on the last pass.
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_classification_covers_known_kinds() {
        assert_eq!(AssetKind::from_extension("png"), AssetKind::Texture);
        assert_eq!(AssetKind::from_extension("gltf"), AssetKind::Mesh);
        assert_eq!(AssetKind::from_extension("wav"), AssetKind::Audio);
        assert_eq!(AssetKind::from_extension("wgsl"), AssetKind::Shader);
        assert_eq!(AssetKind::from_extension("xyz"), AssetKind::Unknown);
    }

    #[test]
    fn tags_round_trip() {
        for kind in [
            AssetKind::Mesh,
            AssetKind::Texture,
            AssetKind::Audio,
            AssetKind::Shader,
            AssetKind::Material,
            AssetKind::Scene,
            AssetKind::Unknown,
        ] {
            assert_eq!(AssetKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(AssetKind::from_tag(99), None);
    }

    #[test]
    fn kind_ids_are_distinct_per_category() {
        assert_ne!(AssetKind::Mesh.kind_id(), AssetKind::Texture.kind_id());
        assert_eq!(AssetKind::Texture.kind_id(), KindId::from_name("texture"));
    }
}
