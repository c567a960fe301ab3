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

//! The reference-counted resource cache.
//!
//! Bookkeeping lives in a fixed-capacity arena of slots; free slots are
//! recycled through an index free list, and each slot carries a generation
//! counter so recycled indices invalidate stale handles instead of
//! aliasing their new occupant. The forward map (id → slot), the free
//! list, and the slot array are always mutated together; multi-threaded
//! use would need external synchronization around the triple.

use crate::error::AcquireError;
use crate::loader::{LoaderRegistry, ResourceLoader};
use pyxis_core::{FullId, KindId, ResourceRef, SlotHandle};
use std::any::Any;
use std::collections::HashMap;

/// Construction-time tuning for a [`ResourceCache`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of simultaneously live (or pending) resources.
    pub capacity: usize,
    /// Depth of the deferred-destruction ring. A resource released by a
    /// deferred kind survives this many `on_end_frame` calls before its
    /// destroy runs.
    pub destruction_buckets: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            destruction_buckets: 2,
        }
    }
}

/// Point-in-time occupancy counters, for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Resources currently resident (referenced or pending destruction).
    pub live: usize,
    /// Slots ready for reuse without growing the arena.
    pub free: usize,
    /// Resident resources with a zero refcount awaiting their bucket.
    pub pending_destruction: usize,
    /// Frames elapsed, i.e. `on_end_frame` calls so far.
    pub frame: u64,
}

struct Slot {
    id: FullId,
    generation: u32,
    refcount: u32,
    data: Option<Box<dyn Any>>,
    /// Set while the slot sits in a destruction bucket with refcount 0.
    pending: bool,
    /// The bucket the slot was enqueued into, to ignore stale entries
    /// when the slot was resurrected and re-released into a later bucket.
    pending_bucket: usize,
}

/// Maps full identifiers to loaded, reference-counted resources.
///
/// Each resolved identifier has exactly one slot with refcount ≥ 1; a
/// refcount reaching zero destroys the resource immediately, or parks it
/// in the current frame's destruction bucket if its kind opted into
/// deferred teardown. Re-acquiring a parked resource resurrects it without
/// a reload.
pub struct ResourceCache {
    slots: Vec<Slot>,
    free: Vec<u32>,
    lookup: HashMap<FullId, u32>,
    loaders: LoaderRegistry,
    buckets: Vec<Vec<SlotHandle>>,
    current_bucket: usize,
    frame: u64,
    capacity: usize,
}

impl ResourceCache {
    /// Creates a cache with the given pool capacity and ring depth.
    pub fn new(config: CacheConfig) -> Self {
        assert!(config.capacity > 0, "cache capacity must be nonzero");
        assert!(
            config.destruction_buckets > 0,
            "destruction ring needs at least one bucket"
        );
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            lookup: HashMap::new(),
            loaders: LoaderRegistry::default(),
            buckets: (0..config.destruction_buckets).map(|_| Vec::new()).collect(),
            current_bucket: 0,
            frame: 0,
            capacity: config.capacity,
        }
    }

    /// Registers the loader for a resource kind. Must happen before any
    /// acquire of that kind. `deferred` opts the kind into grace-period
    /// destruction; cheap data should leave it off.
    pub fn register_loader<L: ResourceLoader + 'static>(
        &mut self,
        kind: KindId,
        name: &'static str,
        deferred: bool,
        loader: L,
    ) {
        self.loaders.register(kind, name, deferred, loader);
    }

    /// Resolves a reference to a live handle, loading on first use.
    ///
    /// A reference that already carries a handle is bumped in O(1) with no
    /// lookup. Otherwise the id is looked up and, on a miss, the kind's
    /// loader runs; on success the reference is rewritten in place so
    /// subsequent acquires through it skip the lookup. On failure the
    /// reference stays unresolved so the caller may retry later.
    ///
    /// # Panics
    /// If no loader is registered for the reference's kind, or if the
    /// reference carries a handle to an already-destroyed slot. Both are
    /// programming errors.
    pub fn acquire(&mut self, reference: &mut ResourceRef) -> Result<SlotHandle, AcquireError> {
        if let ResourceRef::Resolved { slot, .. } = *reference {
            let index = self.checked_index(slot);
            let entry = &mut self.slots[index];
            entry.refcount += 1;
            entry.pending = false;
            return Ok(slot);
        }

        let id = reference.id();
        assert!(
            self.loaders.contains(id.kind),
            "acquire of unregistered resource kind {:016x}",
            id.kind.as_raw()
        );

        if let Some(&index) = self.lookup.get(&id) {
            let entry = &mut self.slots[index as usize];
            entry.refcount += 1;
            entry.pending = false;
            let handle = SlotHandle {
                index,
                generation: entry.generation,
            };
            *reference = ResourceRef::Resolved { slot: handle, id };
            return Ok(handle);
        }

        let loaded = self
            .loaders
            .get(id.kind)
            .and_then(|entry| entry.loader.load_any(id));
        let Some(data) = loaded else {
            log::warn!(
                "cache: load failed for resource {:016x}, reference left unresolved",
                id.instance.as_raw()
            );
            return Err(AcquireError::LoadFailed(id));
        };

        let Some(index) = self.allocate_slot() else {
            log::warn!(
                "cache: pool exhausted at {} slots, cannot admit resource {:016x}",
                self.capacity,
                id.instance.as_raw()
            );
            if let Some(entry) = self.loaders.get(id.kind) {
                entry.loader.destroy_any(data, id);
            }
            return Err(AcquireError::PoolExhausted(id));
        };

        let slot = &mut self.slots[index as usize];
        slot.id = id;
        slot.refcount = 1;
        slot.data = Some(data);
        slot.pending = false;
        let handle = SlotHandle {
            index,
            generation: slot.generation,
        };
        self.lookup.insert(id, index);
        *reference = ResourceRef::Resolved { slot: handle, id };
        Ok(handle)
    }

    /// Drops one reference. A no-op for unresolved references.
    ///
    /// At refcount zero the reference is demoted back to its logical id
    /// (so it remains serializable) and the resource is destroyed — either
    /// immediately, or after its kind's grace period.
    ///
    /// # Panics
    /// If the handle is stale (the resource was already destroyed) or the
    /// refcount is already zero; releasing more than was acquired is a
    /// programming error.
    pub fn release(&mut self, reference: &mut ResourceRef) {
        let ResourceRef::Resolved { slot, id } = *reference else {
            return;
        };
        let index = self.checked_index(slot);
        let entry = &mut self.slots[index];
        assert!(entry.refcount > 0, "release past zero refcount");
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return;
        }

        *reference = ResourceRef::Unresolved(id);
        let deferred = self
            .loaders
            .get(id.kind)
            .map(|entry| entry.deferred)
            .unwrap_or(false);
        if deferred {
            let entry = &mut self.slots[index];
            entry.pending = true;
            entry.pending_bucket = self.current_bucket;
            self.buckets[self.current_bucket].push(slot);
        } else {
            self.destroy_slot(index);
        }
    }

    /// Advances the frame and destroys everything whose grace period
    /// elapsed. Resources re-acquired since their release are left alone.
    pub fn on_end_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.current_bucket = (self.current_bucket + 1) % self.buckets.len();
        let due = std::mem::take(&mut self.buckets[self.current_bucket]);
        for handle in due {
            let index = handle.index as usize;
            let Some(slot) = self.slots.get(index) else {
                continue;
            };
            // Generation mismatch: the slot was destroyed and recycled.
            // Bucket mismatch: resurrected, then re-released into a later
            // bucket; that entry owns the teardown now.
            if slot.generation != handle.generation
                || !slot.pending
                || slot.refcount != 0
                || slot.pending_bucket != self.current_bucket
            {
                continue;
            }
            self.destroy_slot(index);
        }
    }

    /// Typed access to a loaded resource. Returns `None` for stale handles
    /// or a type mismatch.
    pub fn get<T: 'static>(&self, handle: SlotHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.data.as_ref()?.downcast_ref::<T>()
    }

    /// The current refcount behind a handle, if it is still live.
    pub fn ref_count(&self, handle: SlotHandle) -> Option<u32> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation || slot.data.is_none() {
            return None;
        }
        Some(slot.refcount)
    }

    /// Point-in-time occupancy counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            live: self.lookup.len(),
            free: self.free.len() + (self.capacity - self.slots.len()),
            pending_destruction: self.slots.iter().filter(|s| s.pending).count(),
            frame: self.frame,
        }
    }

    /// Pops a free slot, growing the arena up to its capacity.
    fn allocate_slot(&mut self) -> Option<u32> {
        if let Some(index) = self.free.pop() {
            return Some(index);
        }
        if self.slots.len() < self.capacity {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                id: FullId::new(
                    pyxis_core::InstanceId::from_raw(0),
                    KindId::from_raw(0),
                ),
                generation: 0,
                refcount: 0,
                data: None,
                pending: false,
                pending_bucket: 0,
            });
            return Some(index);
        }
        None
    }

    /// Validates a resolved handle, panicking on staleness.
    fn checked_index(&self, handle: SlotHandle) -> usize {
        let index = handle.index as usize;
        let slot = self
            .slots
            .get(index)
            .unwrap_or_else(|| panic!("resolved reference to out-of-range slot {index}"));
        assert!(
            slot.generation == handle.generation && slot.data.is_some(),
            "resolved reference to a destroyed resource (slot {index})"
        );
        index
    }

    /// Tears a slot down: runs the loader's destroy, evicts the forward
    /// map entry, bumps the generation, and returns the index to the free
    /// list.
    fn destroy_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        let id = slot.id;
        let data = match slot.data.take() {
            Some(data) => data,
            None => {
                debug_assert!(false, "destroy of an empty slot");
                return;
            }
        };
        slot.refcount = 0;
        slot.pending = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.lookup.remove(&id);
        self.free.push(index as u32);

        if let Some(entry) = self.loaders.get(id.kind) {
            entry.loader.destroy_any(data, id);
        } else {
            debug_assert!(false, "destroy with no registered loader");
        }
    }
}
