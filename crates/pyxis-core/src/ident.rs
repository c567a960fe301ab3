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

//! Stable 64-bit identifiers for assets and resource categories.
//!
//! Instance ids name a logical asset independently of its file path; kind ids
//! name a resource category. Both are plain 64-bit values so they stay cheap
//! to copy, hash, and persist as hex text. Generated ids mix a per-thread
//! counter, a coarse timestamp, per-thread and per-process salts, and a
//! random value; this gives a negligible collision probability at the scale
//! of tens of thousands of assets per process, and makes no cryptographic
//! claim. The magnitude of an id carries no ordering meaning.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// The reserved bit tagging a value as an instance id.
///
/// Kind ids never carry this bit, so an instance id can never be mistaken
/// for a kind id after a round trip through text. Persisted instance ids are
/// always in this logical form; resolution state lives in
/// [`crate::ResourceRef`], never in the id itself.
const INSTANCE_BIT: u64 = 1 << 63;

/// A globally unique, persistent identifier for a logical asset.
///
/// This id represents the "idea" of an asset, completely decoupled from its
/// physical file path. Assets can be moved or renamed without breaking
/// references to them, because the identity store keys everything off this
/// value rather than the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Generates a new process-wide unique instance id.
    pub fn generate() -> Self {
        Self(compose_unique() | INSTANCE_BIT)
    }

    /// Reconstructs an id from its raw persisted value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Formats the id as the fixed-width lowercase hex used in persisted
    /// stores and descriptor folder names.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parses an id from its fixed-width hex form.
    pub fn from_hex(text: &str) -> Option<Self> {
        u64::from_str_radix(text, 16).ok().map(Self)
    }
}

/// A 64-bit identifier naming a resource category (mesh, texture, ...).
///
/// Kind ids are produced either at run time via [`KindId::generate`] or
/// derived deterministically from a literal category name via
/// [`KindId::from_name`], so independently built components (the offline
/// pipeline and the runtime loader registry) agree on well-known categories
/// without any coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(u64);

impl KindId {
    /// Generates a new unique kind id.
    pub fn generate() -> Self {
        Self(compose_unique() & !INSTANCE_BIT)
    }

    /// Derives a kind id from a literal category name.
    ///
    /// This is a `const fn` so category ids can be baked into statics on
    /// both sides of the tool/runtime boundary. The hash is FNV-1a with an
    /// avalanche finisher; it is stable across builds and platforms.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            i += 1;
        }
        Self(mix64(hash) & !INSTANCE_BIT)
    }

    /// Reconstructs a kind id from its raw persisted value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// The portable, comparable, serializable key naming one resource of one
/// category: an (instance id, kind id) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullId {
    /// The instance id of the resource.
    pub instance: InstanceId,
    /// The category the resource belongs to.
    pub kind: KindId,
}

impl FullId {
    /// Creates a full id from its parts.
    pub const fn new(instance: InstanceId, kind: KindId) -> Self {
        Self { instance, kind }
    }
}

/// Finalizing mixer (splitmix64 style) spreading input entropy across all
/// 64 output bits.
const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x
}

/// Per-process salt, initialized lazily on first id generation.
fn process_salt() -> u64 {
    static SALT: OnceLock<u64> = OnceLock::new();
    *SALT.get_or_init(rand::random)
}

thread_local! {
    static THREAD_SALT: u64 = rand::random();
    static THREAD_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Composes one raw unique value from counter, timestamp, salts, and noise.
fn compose_unique() -> u64 {
    let count = THREAD_COUNTER.with(|c| {
        let v = c.get();
        c.set(v.wrapping_add(1));
        v
    });
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let noise: u64 = rand::random();
    let mixed = mix64(
        noise
            ^ THREAD_SALT.with(|s| *s).rotate_left(17)
            ^ process_salt().rotate_left(33)
            ^ (secs << 20)
            ^ count,
    );
    // The counter is folded back in unmixed so that two calls in the same
    // thread and second can never collide even if the random source repeats.
    mixed ^ count.rotate_left(43)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn instance_ids_are_unique_and_tagged() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let id = InstanceId::generate();
            assert!(id.as_raw() & INSTANCE_BIT != 0, "instance bit must be set");
            assert!(seen.insert(id), "duplicate instance id generated");
        }
    }

    #[test]
    fn kind_ids_never_carry_the_instance_bit() {
        for _ in 0..1_000 {
            let id = KindId::generate();
            assert_eq!(id.as_raw() & INSTANCE_BIT, 0);
        }
        assert_eq!(KindId::from_name("texture").as_raw() & INSTANCE_BIT, 0);
    }

    #[test]
    fn name_derived_kind_ids_are_deterministic() {
        const TEXTURE: KindId = KindId::from_name("texture");
        assert_eq!(TEXTURE, KindId::from_name("texture"));
        assert_ne!(TEXTURE, KindId::from_name("mesh"));
        assert_ne!(TEXTURE, KindId::from_name("Texture"));
    }

    #[test]
    fn hex_round_trip() {
        let id = InstanceId::generate();
        let text = id.to_hex();
        assert_eq!(text.len(), 16);
        assert_eq!(InstanceId::from_hex(&text), Some(id));
        assert_eq!(InstanceId::from_hex("not hex"), None);
    }
}
