use std::collections::HashMap;

use crate::core::geometry::{Geometry, Topology};
use crate::core::scene::{Drawable, MaterialIdx, NodeKind, Scene, SceneNode, SceneNodeIdx, TrsMatrix};
use super::group::PassThrough;
use super::Err;

/// Concatenated geometry of one bucket, already in root space.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMesh {
    pub geometry: Geometry,
    pub material: Option<MaterialIdx>,
    pub topology: Topology,
}

/// Builds the flattened output scene: a root group holding the merged meshes
/// first and then the pass-through nodes, each with its world transform as
/// local transform. Materials, textures, cameras and lights are carried over
/// with their indices unchanged. Skins are rewritten to the new node ids.
pub fn assemble(source: &Scene, merged: Vec<MergedMesh>, pass_through: &[PassThrough]) -> Result<Scene, Err> {
    let mut out = Scene::new();
    out.set_name(source.get_name().map(str::to_string));
    *out.material_library_mut() = source.material_library().clone();
    for camera in source.cameras() {
        out.add_camera(camera.clone());
    }
    for light in source.lights() {
        out.add_light(light.clone());
    }
    for extension in source.extensions_used() {
        out.add_extension_used(extension.as_str());
    }
    for extension in source.extensions_required() {
        out.add_extension_required(extension.as_str());
    }

    let root = out.add_node(SceneNode::new(NodeKind::Group));
    out.add_root_node_index(root);

    for (i, mesh) in merged.into_iter().enumerate() {
        let geometry = out.add_geometry(mesh.geometry);
        let drawable = Drawable::new(geometry, mesh.material);
        let kind = match mesh.topology {
            Topology::Triangles => NodeKind::Mesh(drawable),
            Topology::Lines => NodeKind::Line(drawable),
            Topology::Points => NodeKind::Points(drawable),
        };
        let mut node = SceneNode::new(kind);
        node.set_name(Some(format!("merged_{}", i)));
        let idx = out.add_node(node);
        out.add_child(root, idx)?;
    }

    // Instanced geometry stays shared between pass-through nodes.
    let mut geometry_map: HashMap<usize, usize> = HashMap::new();
    let mut node_map: HashMap<SceneNodeIdx, SceneNodeIdx> = HashMap::new();
    for pass in pass_through {
        let Some(src) = source.get_node(pass.node) else {
            continue;
        };
        let mut kind = src.kind().clone();
        if let Some(src_geometry) = kind.drawable().map(|d| d.geometry) {
            match source.get_geometry(src_geometry) {
                Some(geometry) => {
                    let idx = *geometry_map.entry(src_geometry)
                        .or_insert_with(|| out.add_geometry(geometry.clone()));
                    if let Some(drawable) = kind.drawable_mut() {
                        drawable.geometry = idx;
                    }
                }
                // The node keeps its place and transform without a payload.
                None => kind = NodeKind::Group,
            }
        }

        let mut node = SceneNode::new(kind);
        node.set_name(src.get_name().map(str::to_string));
        node.set_visible(pass.visible);
        if !pass.world.is_identity() {
            node.set_trs_matrix(TrsMatrix::from_matrix(pass.world));
        }
        let idx = out.add_node(node);
        out.add_child(root, idx)?;
        node_map.insert(pass.node, idx);
    }

    for skin in source.skins() {
        out.add_skin(skin.remapped(|joint| node_map.get(&joint).copied()));
    }
    Ok(out)
}
