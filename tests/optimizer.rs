mod common;

use gltf_merge::io::gltf::scene_io::write_scene_to_file;
use gltf_merge::optimizer::Err;
use gltf_merge::prelude::*;

use common::*;

fn optimizer_for(name: &str) -> (GltfOptimizer, std::path::PathBuf) {
    let root = temp_dir(name);
    let config = OptimizerConfig {
        input_dir: root.join("input"),
        output_dir: root.join("output"),
        ..Default::default()
    };
    std::fs::create_dir_all(&config.input_dir).unwrap();
    (GltfOptimizer::with_progress(config, Box::new(NoProgress)), root)
}

#[tokio::test]
async fn optimize_writes_a_reduced_copy() {
    let (optimizer, root) = optimizer_for("single");
    let input = optimizer.config().input_dir.join("cubes.gltf");
    write_scene_to_file(&input, &ten_cubes(), &EncodeOptions::default()).await.unwrap();

    let report = optimizer.optimize("cubes.gltf").await.unwrap();
    assert_eq!(report.before.mesh_count, 10);
    assert_eq!(report.after.mesh_count, 1);
    assert_eq!(report.mesh_label(), "reduced by 90.0%");
    assert_eq!(report.vertex_label(), "no change");
    assert!(report.output.exists());

    let written = gltf_merge::io::gltf::scene_io::read_scene_from_file(&report.output, &NoProgress).await.unwrap();
    assert_eq!(analyze(&written).mesh_count, 1);
    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn batch_continues_past_failures() {
    let (optimizer, root) = optimizer_for("batch");
    let input_dir = optimizer.config().input_dir.clone();
    write_scene_to_file(&input_dir.join("good.glb"), &ten_cubes(), &EncodeOptions::default()).await.unwrap();
    std::fs::write(input_dir.join("broken.gltf"), b"{ not json").unwrap();

    let files = ["broken.gltf", "missing.gltf", "good.glb"];
    let outcomes = optimizer.optimize_multiple(&files).await.unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(!outcomes[0].is_success());
    assert!(matches!(outcomes[1].result, Err(Err::InputNotFound(_))));
    assert!(outcomes[2].is_success());
    assert!(optimizer.config().output_dir.join("good.glb").exists());
    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn available_files_match_extensions_case_insensitively() {
    let (optimizer, root) = optimizer_for("listing");
    let input_dir = optimizer.config().input_dir.clone();
    for name in ["a.gltf", "B.GLB", "c.Gltf", "notes.txt", "model.obj"] {
        std::fs::write(input_dir.join(name), b"").unwrap();
    }
    std::fs::create_dir_all(input_dir.join("nested.gltf")).unwrap();

    let files = optimizer.available_files().await.unwrap();
    assert_eq!(files, vec!["B.GLB", "a.gltf", "c.Gltf"]);
    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn optimize_all_and_clear_output() {
    let (optimizer, root) = optimizer_for("all");
    let input_dir = optimizer.config().input_dir.clone();
    write_scene_to_file(&input_dir.join("one.gltf"), &ten_cubes(), &EncodeOptions::default()).await.unwrap();
    write_scene_to_file(&input_dir.join("two.gltf"), &skinned_and_static(30), &EncodeOptions::default()).await.unwrap();

    let outcomes = optimizer.optimize_all().await.unwrap();
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(outcomes.len(), 2);

    assert!(optimizer.clear_output().await.unwrap());
    assert!(!optimizer.config().output_dir.exists());
    assert!(!optimizer.clear_output().await.unwrap());
    std::fs::remove_dir_all(root).unwrap();
}

#[tokio::test]
async fn missing_input_directory_lists_nothing() {
    let config = OptimizerConfig {
        input_dir: std::env::temp_dir().join("gltf-merge-no-such-dir"),
        ..Default::default()
    };
    let optimizer = GltfOptimizer::with_progress(config, Box::new(NoProgress));
    assert!(optimizer.available_files().await.unwrap().is_empty());
}
