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

//! # Pyxis Runtime
//!
//! The run-time half of the Pyxis asset system: a type-erased,
//! reference-counted resource cache that resolves logical identifiers into
//! loaded in-memory objects exactly once while referenced, with optional
//! grace-period destruction across frame buckets.
//!
//! The cache assumes exclusive access from one thread (the main loop);
//! `acquire`, `release`, and `on_end_frame` must all be called from that
//! thread.

pub mod cache;
pub mod error;
pub mod loader;

pub use cache::{CacheConfig, CacheStats, ResourceCache};
pub use error::AcquireError;
pub use loader::ResourceLoader;
