#![allow(dead_code)]

use gltf_merge::core::scene::Skin;
use gltf_merge::prelude::*;
use serde_json::json;

pub const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
];

pub const CUBE_INDICES: [u32; 36] = [
    0, 2, 1, 0, 3, 2, // back
    4, 5, 6, 4, 6, 7, // front
    0, 1, 5, 0, 5, 4, // bottom
    3, 7, 6, 3, 6, 2, // top
    0, 4, 7, 0, 7, 3, // left
    1, 2, 6, 1, 6, 5, // right
];

/// Indexed 8-vertex cube with normals pointing away from the center.
pub fn cube(with_uv: bool) -> Geometry {
    let normals: Vec<[f32; 3]> = CUBE_POSITIONS.iter()
        .map(|p| {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            [p[0] / len, p[1] / len, p[2] / len]
        })
        .collect();
    let mut builder = GeometryBuilder::new(Topology::Triangles);
    builder.add_positions(&CUBE_POSITIONS)
        .add_normals(&normals)
        .set_indices(CUBE_INDICES.to_vec());
    if with_uv {
        let uvs: Vec<[f32; 2]> = CUBE_POSITIONS.iter().map(|p| [p[0] + 0.5, p[1] + 0.5]).collect();
        builder.add_tex_coords(0, &uvs);
    }
    builder.build().unwrap()
}

/// Indexed triangle fan of `vertex_count` vertices around the origin.
pub fn fan(vertex_count: usize) -> Geometry {
    let positions: Vec<[f32; 3]> = (0..vertex_count)
        .map(|i| {
            let angle = i as f32 * 0.01;
            [angle.cos() * (1.0 + i as f32 * 0.001), angle.sin(), 0.0]
        })
        .collect();
    let indices = (1..vertex_count.saturating_sub(1) as u32).flat_map(|i| [0, i, i + 1]).collect();
    GeometryBuilder::new(Topology::Triangles)
        .add_positions(&positions)
        .set_indices(indices)
        .build()
        .unwrap()
}

pub fn polyline(points: &[[f32; 3]]) -> Geometry {
    let indices = (0..points.len().saturating_sub(1) as u32).flat_map(|i| [i, i + 1]).collect();
    GeometryBuilder::new(Topology::Lines)
        .add_positions(points)
        .set_indices(indices)
        .build()
        .unwrap()
}

pub fn add_material(scene: &mut Scene, name: &str, color: [f32; 4]) -> usize {
    scene.material_library_mut().add_material(Material::new(json!({
        "name": name,
        "pbrMetallicRoughness": {"baseColorFactor": color},
    })))
}

pub fn translation(x: f64, y: f64, z: f64) -> TrsMatrix {
    let mut trs = TrsMatrix::new();
    trs.set_translation(Vector3d::new(x, y, z));
    trs
}

/// Scene with a single group root. Returns the scene and the root index.
pub fn scene_with_root() -> (Scene, usize) {
    let mut scene = Scene::new();
    let root = scene.add_node(SceneNode::new(NodeKind::Group));
    scene.add_root_node_index(root);
    (scene, root)
}

pub fn add_child(scene: &mut Scene, parent: usize, kind: NodeKind, trs: TrsMatrix) -> usize {
    let mut node = SceneNode::new(kind);
    node.set_trs_matrix(trs);
    let idx = scene.add_node(node);
    scene.add_child(parent, idx).unwrap();
    idx
}

pub fn add_mesh(scene: &mut Scene, parent: usize, geometry: usize, material: Option<usize>, trs: TrsMatrix) -> usize {
    add_child(scene, parent, NodeKind::Mesh(Drawable::new(geometry, material)), trs)
}

/// Ten unit cubes in a row sharing one material.
pub fn ten_cubes() -> Scene {
    let (mut scene, root) = scene_with_root();
    let material = add_material(&mut scene, "white", [1.0, 1.0, 1.0, 1.0]);
    let geometry = scene.add_geometry(cube(false));
    for i in 0..10 {
        add_mesh(&mut scene, root, geometry, Some(material), translation(i as f64 * 2.0, 0.0, 0.0));
    }
    scene
}

/// A skinned mesh of `vertices` vertices bound to a two-joint skeleton, next
/// to a static cube with a material of its own.
pub fn skinned_and_static(vertices: usize) -> Scene {
    let (mut scene, root) = scene_with_root();
    let skinned_material = add_material(&mut scene, "skin", [0.8, 0.6, 0.5, 1.0]);
    let static_material = add_material(&mut scene, "crate", [0.4, 0.3, 0.1, 1.0]);

    let hip = add_child(&mut scene, root, NodeKind::Group, translation(0.0, 1.0, 0.0));
    let knee = add_child(&mut scene, hip, NodeKind::Group, translation(0.0, -0.5, 0.0));
    let skin = scene.add_skin(Skin {
        name: Some("legs".to_string()),
        joints: vec![hip, knee],
        inverse_bind_matrices: Some(vec![Matrix4d::identity(), Matrix4d::identity()]),
        skeleton: Some(hip),
    });

    let body = scene.add_geometry(fan(vertices));
    let mut drawable = Drawable::new(body, Some(skinned_material));
    drawable.skin = Some(skin);
    add_child(&mut scene, root, NodeKind::Mesh(drawable), TrsMatrix::new());

    let crate_geometry = scene.add_geometry(box_24());
    add_mesh(&mut scene, root, crate_geometry, Some(static_material), translation(3.0, 0.0, 0.0));
    scene
}

/// Cube with split faces: 24 vertices, 4 per face.
pub fn box_24() -> Geometry {
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    for (n, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            positions.push([
                n[0] * 0.5 + u[0] * su + v[0] * sv,
                n[1] * 0.5 + u[1] * su + v[1] * sv,
                n[2] * 0.5 + u[2] * su + v[2] * sv,
            ]);
            normals.push(n);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    GeometryBuilder::new(Topology::Triangles)
        .add_positions(&positions)
        .add_normals(&normals)
        .set_indices(indices)
        .build()
        .unwrap()
}

/// World-space positions of every drawable vertex, quantized and sorted so
/// two scenes can be compared regardless of node layout.
pub fn world_positions(scene: &Scene) -> Vec<[f64; 3]> {
    let mut out = Vec::new();
    for visit in scene.pre_order() {
        let node = scene.get_node(visit.node).unwrap();
        let Some(geometry) = scene.geometry_of(node) else {
            continue;
        };
        let rows = geometry.position().unwrap().f32_rows::<3>().unwrap();
        for p in rows {
            out.push(visit.world.transform_point([p[0] as f64, p[1] as f64, p[2] as f64]));
        }
    }
    let key = |p: &[f64; 3]| p.map(|c| (c * 1e4).round() as i64);
    out.sort_by_key(key);
    out
}

pub fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("gltf-merge-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
