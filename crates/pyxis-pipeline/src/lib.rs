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

//! # Pyxis Pipeline
//!
//! The tool-time half of the Pyxis asset system. One pipeline pass walks the
//! configured source roots, diffs the filesystem against the previous
//! snapshot, assigns (or confirms) a stable identity for every changed
//! asset, emits descriptor artifacts, and persists both the identity store
//! and the scan snapshot.
//!
//! Everything here assumes exclusive access from a single tool thread; a
//! pass runs to completion and delivers one atomic batch of changes.

pub mod descriptor;
pub mod error;
pub mod orchestrator;
pub mod scan;
pub mod store;

pub use descriptor::{CompileSettings, DescriptorEmitter, JsonDescriptorEmitter};
pub use error::{DescriptorError, PersistError, PipelineError};
pub use orchestrator::{AssetPipeline, PassSummary, PipelineConfig};
pub use scan::{Change, ChangeScanner, FileStamp};
pub use store::IdentityStore;
