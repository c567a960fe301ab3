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

//! Resource references: logical ids that memoize their resolution.
//!
//! A [`ResourceRef`] starts out `Unresolved`, holding only the portable
//! [`FullId`]. Once the resource cache resolves it, the reference is
//! rewritten in place to `Resolved`, carrying the cache slot handle so
//! every later acquire through the same reference is O(1) with no map
//! lookup. The logical id is retained alongside the handle, so a reference
//! can always be demoted back to its serializable form.

use crate::ident::FullId;
use serde::{Deserialize, Serialize};

/// A generational index into the resource cache's slot pool.
///
/// Combining the index with a generation count solves the ABA problem: when
/// a slot is freed and recycled for another resource, its generation is
/// incremented, so stale handles pointing at the old occupant can be
/// detected instead of silently aliasing the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    /// The index of the slot in the cache's pool.
    pub index: u32,
    /// A generation counter, incremented each time the slot is recycled.
    pub generation: u32,
}

/// A reference to a resource, either by portable id or by live cache slot.
///
/// Only the `Unresolved` form is ever serialized: slot handles are
/// meaningless outside the process that created them, so serialization
/// always demotes a reference to its logical [`FullId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FullId", from = "FullId")]
pub enum ResourceRef {
    /// A portable logical id, not yet resolved against the cache.
    Unresolved(FullId),
    /// A live handle into the cache, memoized by a successful acquire.
    Resolved {
        /// The cache slot holding the loaded resource.
        slot: SlotHandle,
        /// The logical id, retained for release and re-serialization.
        id: FullId,
    },
}

impl ResourceRef {
    /// Creates a fresh unresolved reference to the given id.
    pub const fn new(id: FullId) -> Self {
        ResourceRef::Unresolved(id)
    }

    /// Returns the logical id, regardless of resolution state.
    pub const fn id(&self) -> FullId {
        match *self {
            ResourceRef::Unresolved(id) => id,
            ResourceRef::Resolved { id, .. } => id,
        }
    }

    /// Returns `true` if the reference currently carries a live slot handle.
    pub const fn is_resolved(&self) -> bool {
        matches!(self, ResourceRef::Resolved { .. })
    }
}

impl From<FullId> for ResourceRef {
    fn from(id: FullId) -> Self {
        ResourceRef::Unresolved(id)
    }
}

impl From<ResourceRef> for FullId {
    fn from(reference: ResourceRef) -> Self {
        reference.id()
    }
}
