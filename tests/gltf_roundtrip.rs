mod common;

use approx::assert_abs_diff_eq;
use gltf_merge::io::gltf::decode::GltfDecoder;
use gltf_merge::io::gltf::encode::GltfEncoder;
use gltf_merge::io::gltf::scene_io::{read_scene_from_file, write_scene_to_file};
use gltf_merge::prelude::*;

use common::*;

fn assert_same_positions(a: &Scene, b: &Scene) {
    let (a, b) = (world_positions(a), world_positions(b));
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(&b) {
        for c in 0..3 {
            assert_abs_diff_eq!(p[c], q[c], epsilon = 1e-5);
        }
    }
}

#[tokio::test]
async fn embedded_gltf_keeps_counts_and_positions() {
    let scene = skinned_and_static(60);
    let bytes = GltfEncoder::new().encode_scene_to_gltf(&scene).unwrap();
    let decoded = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await.unwrap();

    assert_eq!(analyze(&decoded), analyze(&scene));
    assert_same_positions(&decoded, &scene);
    assert_eq!(decoded.material_library().num_materials(), 2);
    assert_eq!(decoded.skins().len(), 1);
    assert_eq!(decoded.skins()[0].inverse_bind_matrices.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn glb_keeps_counts_and_positions() {
    let merged = merge(&ten_cubes(), &MergeOptions::default()).unwrap().scene;
    let bytes = GltfEncoder::new().encode_scene_to_glb(&merged).unwrap();
    let decoded = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await.unwrap();

    assert_eq!(analyze(&decoded), analyze(&merged));
    assert_same_positions(&decoded, &merged);
    let geometry = &decoded.geometries()[0];
    assert_eq!(geometry.indices().unwrap().len(), 360);
}

#[tokio::test]
async fn separate_buffer_files_are_resolved_on_read() {
    let dir = temp_dir("separate");
    let path = dir.join("cubes.gltf");
    let options = EncodeOptions { buffer_output: BufferOutput::Separate, ..Default::default() };
    write_scene_to_file(&path, &ten_cubes(), &options).await.unwrap();
    assert!(dir.join("cubes.bin").exists());

    let decoded = read_scene_from_file(&path, &NoProgress).await.unwrap();
    assert_eq!(analyze(&decoded).mesh_count, 10);
    // instancing survives: one geometry drawn ten times
    assert_eq!(decoded.num_geometries(), 1);
    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn hidden_nodes_survive_when_requested() {
    let mut scene = ten_cubes();
    scene.get_node_mut(3).unwrap().set_visible(false);
    let options = EncodeOptions { only_visible: false, ..Default::default() };
    let bytes = GltfEncoder::with_options(options).encode_scene_to_gltf(&scene).unwrap();
    let decoded = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await.unwrap();
    assert_eq!(analyze(&decoded).mesh_count, 10);
    assert_eq!(analyze_with_options(&decoded, AnalyzeOptions { only_visible: true }).mesh_count, 9);

    let bytes = GltfEncoder::new().encode_scene_to_gltf(&scene).unwrap();
    let decoded = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await.unwrap();
    assert_eq!(analyze(&decoded).mesh_count, 9);
}
