use std::fmt;

use serde::Serialize;

use crate::core::scene::{NodeKind, Scene};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Err {
    #[error("Cannot compute a relative change against a baseline of zero")]
    ZeroBaseline,
}

/// Draw-call related counts of a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub line_count: usize,
}

impl fmt::Display for SceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meshes: {}, vertices: {}, lines: {}", self.mesh_count, self.vertex_count, self.line_count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Skip hidden nodes together with their subtrees.
    pub only_visible: bool,
}

/// Counts every drawable node reachable from the scene roots. Mesh nodes
/// count as meshes, line and point nodes as lines; both add their position
/// row count to the vertex total.
pub fn analyze(scene: &Scene) -> SceneStats {
    analyze_with_options(scene, AnalyzeOptions::default())
}

pub fn analyze_with_options(scene: &Scene, options: AnalyzeOptions) -> SceneStats {
    let mut stats = SceneStats::default();
    for visit in scene.pre_order() {
        if options.only_visible && !visit.visible {
            continue;
        }
        let Some(node) = scene.get_node(visit.node) else {
            continue;
        };
        let Some(geometry) = scene.geometry_of(node) else {
            continue;
        };
        match node.kind() {
            NodeKind::Mesh(_) => stats.mesh_count += 1,
            NodeKind::Line(_) | NodeKind::Points(_) => stats.line_count += 1,
            NodeKind::Group | NodeKind::Camera(_) | NodeKind::Light(_) => continue,
        }
        stats.vertex_count += geometry.vertex_count();
    }
    stats
}

/// Human readable relative change from `before` to `after`, e.g.
/// `"reduced by 90.0%"`.
pub fn reduction_label(before: usize, after: usize) -> Result<String, Err> {
    if before == 0 {
        return Err(Err::ZeroBaseline);
    }
    let reduction = (before as f64 - after as f64) / before as f64 * 100.0;
    let label = if reduction > 0.0 {
        format!("reduced by {:.1}%", reduction)
    } else if reduction < 0.0 {
        format!("increased by {:.1}%", reduction.abs())
    } else {
        "no change".to_string()
    };
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::builder::GeometryBuilder;
    use crate::core::geometry::Topology;
    use crate::core::scene::{Drawable, SceneNode};

    fn scene_with_hidden_line() -> Scene {
        let mut scene = Scene::new();
        let tri = GeometryBuilder::new(Topology::Triangles)
            .add_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .build()
            .unwrap();
        let seg = GeometryBuilder::new(Topology::Lines)
            .add_positions(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
            .build()
            .unwrap();
        let tri = scene.add_geometry(tri);
        let seg = scene.add_geometry(seg);

        let root = scene.add_node(SceneNode::new(NodeKind::Group));
        let mesh = scene.add_node(SceneNode::new(NodeKind::Mesh(Drawable::new(tri, None))));
        let mut line = SceneNode::new(NodeKind::Line(Drawable::new(seg, None)));
        line.set_visible(false);
        let line = scene.add_node(line);
        scene.add_root_node_index(root);
        scene.add_child(root, mesh).unwrap();
        scene.add_child(mesh, line).unwrap();
        scene
    }

    #[test]
    fn counts_nested_meshes_and_lines() {
        let stats = analyze(&scene_with_hidden_line());
        assert_eq!(stats, SceneStats { mesh_count: 1, vertex_count: 5, line_count: 1 });
    }

    #[test]
    fn visibility_filter_skips_hidden_nodes() {
        let stats = analyze_with_options(&scene_with_hidden_line(), AnalyzeOptions { only_visible: true });
        assert_eq!(stats, SceneStats { mesh_count: 1, vertex_count: 3, line_count: 0 });
    }

    #[test]
    fn empty_scene_has_zero_counts() {
        assert_eq!(analyze(&Scene::new()), SceneStats::default());
    }

    #[test]
    fn labels() {
        assert_eq!(reduction_label(10, 1).unwrap(), "reduced by 90.0%");
        assert_eq!(reduction_label(2, 3).unwrap(), "increased by 50.0%");
        assert_eq!(reduction_label(2, 2).unwrap(), "no change");
        assert_eq!(reduction_label(3, 2).unwrap(), "reduced by 33.3%");
        assert_eq!(reduction_label(0, 5), Err(Err::ZeroBaseline));
    }
}
