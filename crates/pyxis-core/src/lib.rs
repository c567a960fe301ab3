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

//! # Pyxis Core
//!
//! Foundational crate for the Pyxis asset system: stable identifiers, asset
//! records, and the resource-reference type shared by the tool-time pipeline
//! and the run-time resource cache.

#![warn(missing_docs)]

pub mod ident;
pub mod path;
pub mod record;
pub mod reference;

pub use ident::{FullId, InstanceId, KindId};
pub use record::{AssetKind, AssetRecord};
pub use reference::{ResourceRef, SlotHandle};
