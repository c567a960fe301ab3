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

//! Per-kind resource loaders and their type-erased registry.
//!
//! Loaders are registered explicitly at startup against a [`KindId`]; there
//! is no self-registration through static initializers, so the registry's
//! contents never depend on link order. A typed [`ResourceLoader`] is
//! wrapped in an erased adapter so the cache can store heterogeneous
//! loaders behind one interface, the same way a loader registry erases
//! typed asset loaders behind `Any`.

use pyxis_core::{FullId, KindId};
use std::any::Any;
use std::collections::HashMap;

/// A typed loader for one resource category.
///
/// `load` must signal failure only by returning `None` — never by
/// panicking across the cache boundary. A broken or missing backing file
/// yields "resource unavailable" to the caller, which handles it
/// gracefully; a single bad asset never brings down the host process.
pub trait ResourceLoader {
    /// The in-memory representation this loader produces.
    type Resource: 'static;

    /// Loads the resource named by `id`, typically from a compiled binary
    /// file located by convention from the kind and instance hex digits.
    fn load(&self, id: FullId) -> Option<Self::Resource>;

    /// Tears down a loaded resource. The default drops it.
    fn destroy(&self, resource: Self::Resource, id: FullId) {
        let _ = (resource, id);
    }
}

/// Object-safe facade over a typed [`ResourceLoader`].
pub(crate) trait ErasedLoader {
    fn load_any(&self, id: FullId) -> Option<Box<dyn Any>>;
    fn destroy_any(&self, data: Box<dyn Any>, id: FullId);
}

struct LoaderAdapter<L: ResourceLoader>(L);

impl<L: ResourceLoader> ErasedLoader for LoaderAdapter<L> {
    fn load_any(&self, id: FullId) -> Option<Box<dyn Any>> {
        self.0.load(id).map(|resource| Box::new(resource) as Box<dyn Any>)
    }

    fn destroy_any(&self, data: Box<dyn Any>, id: FullId) {
        match data.downcast::<L::Resource>() {
            Ok(resource) => self.0.destroy(*resource, id),
            Err(_) => {
                // The cache only ever hands a slot's data back to the
                // loader that produced it; a mismatch is a bookkeeping bug.
                log::error!("loader received data of a foreign type on destroy");
                debug_assert!(false, "destroy_any type mismatch");
            }
        }
    }
}

/// One registered loader plus its static metadata.
pub(crate) struct LoaderEntry {
    pub name: &'static str,
    pub deferred: bool,
    pub loader: Box<dyn ErasedLoader>,
}

/// The explicit kind → loader table, populated at startup.
#[derive(Default)]
pub(crate) struct LoaderRegistry {
    entries: HashMap<KindId, LoaderEntry>,
}

impl LoaderRegistry {
    pub fn register<L: ResourceLoader + 'static>(
        &mut self,
        kind: KindId,
        name: &'static str,
        deferred: bool,
        loader: L,
    ) {
        let entry = LoaderEntry {
            name,
            deferred,
            loader: Box::new(LoaderAdapter(loader)),
        };
        if self.entries.insert(kind, entry).is_some() {
            log::warn!("loader '{name}' replaced an existing registration for its kind");
        }
    }

    pub fn get(&self, kind: KindId) -> Option<&LoaderEntry> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: KindId) -> bool {
        self.entries.contains_key(&kind)
    }
}
