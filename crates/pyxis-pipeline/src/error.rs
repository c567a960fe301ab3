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

//! Error types for the tool-time pipeline.
//!
//! I/O and parse failures never cross component boundaries as panics: they
//! surface as these typed errors (or are logged and skipped inside the
//! component, for per-line and per-root failures), and callers decide
//! whether to retry.

use thiserror::Error;

/// Failure to persist or load a snapshot / identity store file.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The underlying filesystem operation failed.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to emit or remove a descriptor artifact.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The underlying filesystem operation failed.
    #[error("descriptor I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The descriptor document could not be serialized.
    #[error("descriptor serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to construct the pipeline itself (output directories, mainly).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An output directory could not be created.
    #[error("pipeline setup I/O error: {0}")]
    Io(#[from] std::io::Error),
}
