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

//! Path normalization for identity-store keys.
//!
//! Every path that enters the identity store or the scanner snapshot is
//! normalized to the same textual form first, so that the same file always
//! maps to the same key no matter which separator style the caller used.

use std::path::Path;

/// Normalizes a path to forward-slash separators with no trailing slash.
///
/// This is the canonical form used as the identity-store and snapshot key.
/// It is a purely textual transformation: no filesystem access, no symlink
/// resolution.
pub fn normalize(path: &str) -> String {
    let mut out = path.replace('\\', "/");
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Normalizes a `Path`, lossily converting non-UTF-8 components.
pub fn normalize_path(path: &Path) -> String {
    normalize(&path.to_string_lossy())
}

/// Extracts the lowercase extension from a normalized path, without the dot.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_become_forward_slashes() {
        assert_eq!(normalize(r"assets\textures\rock.png"), "assets/textures/rock.png");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(normalize("assets/meshes/"), "assets/meshes");
        assert_eq!(normalize("assets//"), "assets");
        // A bare root stays a root.
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn extensions_are_lowercased() {
        assert_eq!(extension_of("a/b/Rock.PNG"), "png");
        assert_eq!(extension_of("a/b/noext"), "");
    }
}
