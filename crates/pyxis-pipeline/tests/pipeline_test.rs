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

use pyxis_core::AssetKind;
use pyxis_pipeline::{AssetPipeline, PipelineConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn sample_tree(src: &Path) {
    fs::create_dir_all(src.join("textures")).unwrap();
    fs::create_dir_all(src.join("models")).unwrap();
    fs::write(src.join("textures/rock.png"), b"png-bytes").unwrap();
    fs::write(src.join("models/ship.gltf"), b"gltf-bytes").unwrap();
    fs::write(src.join("notes.mystery"), b"???").unwrap();
}

fn pipeline_for(src: &Path, out: &Path) -> AssetPipeline {
    AssetPipeline::new(PipelineConfig::new(
        vec![src.to_path_buf()],
        out.to_path_buf(),
    ))
    .expect("pipeline construction")
}

#[test]
fn one_pass_identifies_classifies_emits_and_persists() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    sample_tree(&src);

    let mut pipeline = pipeline_for(&src, &out);
    let summary = pipeline.run_pass();

    assert_eq!(summary.added, 3);
    assert_eq!(summary.modified, 0);
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.skipped, 1, "the unknown extension is skipped");

    // Every file got a record; the unknown one is marked invalid.
    assert_eq!(pipeline.store().len(), 3);
    let rock = pipeline
        .store()
        .find_by_source(&src.join("textures/rock.png").to_string_lossy())
        .expect("rock record");
    assert_eq!(rock.kind, AssetKind::Texture);
    assert!(rock.valid);
    assert!(rock.last_write_secs > 0);
    assert_ne!(rock.content_signature, 0);

    let mystery = pipeline
        .store()
        .find_by_source(&src.join("notes.mystery").to_string_lossy())
        .expect("mystery record");
    assert_eq!(mystery.kind, AssetKind::Unknown);
    assert!(!mystery.valid);

    // Descriptors exist for the valid asset, keyed by its id's hex digits.
    let hex = rock.id.to_hex();
    let folder = out
        .join("descriptors")
        .join(&hex[0..2])
        .join(&hex[2..4])
        .join(&hex);
    assert!(folder.join(format!("{hex}.meta.json")).exists());
    assert!(folder.join(format!("{hex}.settings.json")).exists());

    // Both persistence files landed.
    assert!(out.join("identity.db").exists());
    assert!(out.join("scan.snapshot").exists());
}

#[test]
fn identifiers_survive_process_restarts() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    sample_tree(&src);

    let rock_path = src.join("textures/rock.png");
    let first_id = {
        let mut pipeline = pipeline_for(&src, &out);
        pipeline.run_pass();
        pipeline
            .store()
            .find_by_source(&rock_path.to_string_lossy())
            .expect("rock record")
            .id
    };

    // A fresh pipeline over the same state sees a quiet world and keeps
    // every identifier.
    let mut pipeline = pipeline_for(&src, &out);
    let summary = pipeline.run_pass();
    assert_eq!(summary.added, 0);
    assert_eq!(summary.modified, 0);
    assert_eq!(summary.removed, 0);
    let second_id = pipeline
        .store()
        .find_by_source(&rock_path.to_string_lossy())
        .expect("rock record")
        .id;
    assert_eq!(first_id, second_id, "identity must be stable across restarts");
}

#[test]
fn modification_refreshes_the_record() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    sample_tree(&src);

    let mut pipeline = pipeline_for(&src, &out);
    pipeline.run_pass();
    let rock_path = src.join("textures/rock.png");
    let before = pipeline
        .store()
        .find_by_source(&rock_path.to_string_lossy())
        .unwrap()
        .clone();

    fs::write(&rock_path, b"png-bytes-but-longer-now").unwrap();
    let summary = pipeline.run_pass();
    assert_eq!(summary.modified, 1);
    assert_eq!(summary.added, 0);

    let after = pipeline
        .store()
        .find_by_source(&rock_path.to_string_lossy())
        .unwrap();
    assert_eq!(after.id, before.id, "modification must not re-mint the id");
    assert_ne!(
        after.content_signature, before.content_signature,
        "a size change must move the signature"
    );
}

#[test]
fn removal_retires_record_and_descriptors() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    sample_tree(&src);

    let mut pipeline = pipeline_for(&src, &out);
    pipeline.run_pass();
    let ship_path = src.join("models/ship.gltf");
    let ship_id = pipeline
        .store()
        .find_by_source(&ship_path.to_string_lossy())
        .unwrap()
        .id;
    let hex = ship_id.to_hex();
    let folder = out
        .join("descriptors")
        .join(&hex[0..2])
        .join(&hex[2..4])
        .join(&hex);
    assert!(folder.exists());

    fs::remove_file(&ship_path).unwrap();
    let summary = pipeline.run_pass();
    assert_eq!(summary.removed, 1);
    assert!(pipeline.store().find(ship_id).is_none());
    assert!(!folder.exists(), "descriptor artifacts must be retired");
    assert!(
        out.join("descriptors").exists(),
        "the descriptor root itself must survive"
    );
}

#[test]
fn emission_can_be_disabled() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    sample_tree(&src);

    let mut config = PipelineConfig::new(vec![src.clone()], out.clone());
    config.emit_descriptors = false;
    let mut pipeline = AssetPipeline::new(config).expect("pipeline construction");
    let summary = pipeline.run_pass();

    assert_eq!(summary.added, 3);
    let descriptors: Vec<_> = fs::read_dir(out.join("descriptors"))
        .expect("descriptor root exists")
        .collect();
    assert!(descriptors.is_empty(), "no artifacts when emission is off");
}
