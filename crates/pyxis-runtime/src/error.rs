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

//! Error types for the resource cache.

use pyxis_core::FullId;
use std::fmt;

/// A recoverable acquire failure.
///
/// The caller's reference is left unresolved so a later retry is possible.
/// Programming errors (acquiring an unregistered kind, releasing past a
/// zero refcount) are not represented here; those panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireError {
    /// The registered loader returned no data for this identifier.
    LoadFailed(FullId),
    /// The bookkeeping pool is at capacity; nothing could be admitted.
    PoolExhausted(FullId),
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::LoadFailed(id) => {
                write!(
                    f,
                    "loader failed for resource {:016x} of kind {:016x}",
                    id.instance.as_raw(),
                    id.kind.as_raw()
                )
            }
            AcquireError::PoolExhausted(id) => {
                write!(
                    f,
                    "cache pool exhausted while admitting resource {:016x}",
                    id.instance.as_raw()
                )
            }
        }
    }
}

impl std::error::Error for AcquireError {}
