pub mod transform;

use serde_json::Value;

use crate::core::geometry::Geometry;
use crate::core::material::MaterialLibrary;
pub use transform::{Matrix4d, Quaterniond, TrsMatrix, Vector3d};

pub type SceneNodeIdx = usize;
pub type GeometryIdx = usize;
pub type MaterialIdx = usize;
pub type SkinIdx = usize;
pub type CameraIdx = usize;
pub type LightIdx = usize;


#[derive(Debug, Clone, thiserror::Error)]
pub enum Err {
    #[error("Scene node index out of range: the index {0} is greater than the number of scene nodes {1}")]
    SceneNodeIndexOutOfRange(usize, usize),
    #[error("Geometry index out of range: the index {0} is greater than the number of geometries {1}")]
    GeometryIndexOutOfRange(usize, usize),
    #[error("Skin index out of range: the index {0} is greater than the number of skins {1}")]
    SkinIndexOutOfRange(usize, usize),
    #[error("Scene node {0} already has a parent")]
    AlreadyParented(usize),
}


/// Renderable payload of a mesh, line or point node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawable {
    pub geometry: GeometryIdx,
    pub material: Option<MaterialIdx>,
    pub skin: Option<SkinIdx>,
    /// Morph target weights of the owning node, if any.
    pub weights: Option<Vec<f32>>,
}

impl Drawable {
    pub fn new(geometry: GeometryIdx, material: Option<MaterialIdx>) -> Self {
        Self { geometry, material, skin: None, weights: None }
    }
}


#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    Mesh(Drawable),
    Line(Drawable),
    Points(Drawable),
    #[default]
    Group,
    Camera(CameraIdx),
    Light(LightIdx),
}

impl NodeKind {
    pub fn drawable(&self) -> Option<&Drawable> {
        match self {
            NodeKind::Mesh(d) | NodeKind::Line(d) | NodeKind::Points(d) => Some(d),
            NodeKind::Group | NodeKind::Camera(_) | NodeKind::Light(_) => None,
        }
    }

    pub fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        match self {
            NodeKind::Mesh(d) | NodeKind::Line(d) | NodeKind::Points(d) => Some(d),
            NodeKind::Group | NodeKind::Camera(_) | NodeKind::Light(_) => None,
        }
    }
}


/// Joints and bind matrices of a skinned mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    pub name: Option<String>,
    pub joints: Vec<SceneNodeIdx>,
    pub inverse_bind_matrices: Option<Vec<Matrix4d>>,
    pub skeleton: Option<SceneNodeIdx>,
}

impl Skin {
    /// Rewrites joint and skeleton ids through `map`. Joints that `map`
    /// rejects are dropped together with their inverse bind matrix.
    pub fn remapped(&self, map: impl Fn(SceneNodeIdx) -> Option<SceneNodeIdx>) -> Skin {
        let mut joints = Vec::with_capacity(self.joints.len());
        let mut inverse_bind_matrices = self.inverse_bind_matrices.as_ref().map(|m| Vec::with_capacity(m.len()));
        for (i, &joint) in self.joints.iter().enumerate() {
            let Some(new_joint) = map(joint) else {
                log::warn!("Skin joint {} has no counterpart; dropping it", joint);
                continue;
            };
            joints.push(new_joint);
            if let (Some(out), Some(src)) = (inverse_bind_matrices.as_mut(), self.inverse_bind_matrices.as_ref()) {
                if let Some(m) = src.get(i) {
                    out.push(*m);
                }
            }
        }
        Skin {
            name: self.name.clone(),
            joints,
            inverse_bind_matrices,
            skeleton: self.skeleton.and_then(&map),
        }
    }
}


// This struct is used to create a scene hierarchy from geometries in their
// local space transformed into scene space.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    name: Option<String>,
    trs_matrix: TrsMatrix,
    parent: Option<SceneNodeIdx>,
    children: Vec<SceneNodeIdx>,
    visible: bool,
    kind: NodeKind,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: None,
            trs_matrix: TrsMatrix::new(),
            parent: None,
            children: Vec::new(),
            visible: true,
            kind: NodeKind::Group,
        }
    }
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // Set transformation from local space to parent space.
    pub fn set_trs_matrix(&mut self, trs_matrix: TrsMatrix) {
        self.trs_matrix = trs_matrix;
    }

    pub fn get_trs_matrix(&self) -> &TrsMatrix {
        &self.trs_matrix
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Visibility of this node alone. Hidden ancestors hide it too, see
    /// [`NodeVisit::visible`].
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub fn parent(&self) -> Option<SceneNodeIdx> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNodeIdx] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }
}


/// A node reached by [`Scene::pre_order`] together with what its ancestors
/// contribute.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisit {
    pub node: SceneNodeIdx,
    pub world: Matrix4d,
    /// False when the node or any ancestor is hidden.
    pub visible: bool,
}


// Holds everything needed to describe a glTF scene. Geometries are stored in
// an arena and referenced by index from the nodes, so one geometry may be
// drawn by several nodes. Cameras and lights are passed through as their
// JSON definitions.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    name: Option<String>,
    nodes: Vec<SceneNode>,
    root_node_indices: Vec<SceneNodeIdx>,
    geometries: Vec<Geometry>,
    skins: Vec<Skin>,
    cameras: Vec<Value>,
    lights: Vec<Value>,
    material_library: MaterialLibrary,
    extensions_used: Vec<String>,
    extensions_required: Vec<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn add_node(&mut self, node: SceneNode) -> SceneNodeIdx {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn get_node(&self, index: SceneNodeIdx) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    pub fn get_node_mut(&mut self, index: SceneNodeIdx) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index)
    }

    /// Attaches `child` under `parent`. A node can only have one parent.
    pub fn add_child(&mut self, parent: SceneNodeIdx, child: SceneNodeIdx) -> Result<(), Err> {
        let n = self.nodes.len();
        if parent >= n {
            return Err(Err::SceneNodeIndexOutOfRange(parent, n));
        }
        if child >= n {
            return Err(Err::SceneNodeIndexOutOfRange(child, n));
        }
        if self.nodes[child].parent.is_some() {
            return Err(Err::AlreadyParented(child));
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    pub fn add_root_node_index(&mut self, index: SceneNodeIdx) {
        self.root_node_indices.push(index);
    }

    pub fn root_node_indices(&self) -> &[SceneNodeIdx] {
        &self.root_node_indices
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryIdx {
        self.geometries.push(geometry);
        self.geometries.len() - 1
    }

    pub fn get_geometry(&self, index: GeometryIdx) -> Option<&Geometry> {
        self.geometries.get(index)
    }

    pub fn num_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn add_skin(&mut self, skin: Skin) -> SkinIdx {
        self.skins.push(skin);
        self.skins.len() - 1
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn get_skin(&self, index: SkinIdx) -> Result<&Skin, Err> {
        self.skins.get(index).ok_or(Err::SkinIndexOutOfRange(index, self.skins.len()))
    }

    pub fn add_camera(&mut self, camera: Value) -> CameraIdx {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn cameras(&self) -> &[Value] {
        &self.cameras
    }

    pub fn add_light(&mut self, light: Value) -> LightIdx {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn lights(&self) -> &[Value] {
        &self.lights
    }

    pub fn material_library(&self) -> &MaterialLibrary {
        &self.material_library
    }

    pub fn material_library_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.material_library
    }

    pub fn extensions_used(&self) -> &[String] {
        &self.extensions_used
    }

    pub fn add_extension_used(&mut self, extension: impl Into<String>) {
        let extension = extension.into();
        if !self.extensions_used.contains(&extension) {
            self.extensions_used.push(extension);
        }
    }

    pub fn extensions_required(&self) -> &[String] {
        &self.extensions_required
    }

    pub fn add_extension_required(&mut self, extension: impl Into<String>) {
        let extension = extension.into();
        if !self.extensions_required.contains(&extension) {
            self.extensions_required.push(extension);
        }
    }

    /// Geometry drawn by `node`, if the node is drawable.
    pub fn geometry_of(&self, node: &SceneNode) -> Option<&Geometry> {
        node.kind.drawable().and_then(|d| self.geometries.get(d.geometry))
    }

    /// Depth-first pre-order walk over every node reachable from the roots,
    /// with accumulated world transforms. Roots and children are visited in
    /// their stored order. A node reachable twice is only visited the first
    /// time.
    pub fn pre_order(&self) -> Vec<NodeVisit> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(SceneNodeIdx, Matrix4d, bool)> = self.root_node_indices.iter()
            .rev()
            .map(|&idx| (idx, Matrix4d::identity(), true))
            .collect();

        while let Some((idx, parent_world, parent_visible)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let world = &parent_world * &node.trs_matrix.compute_transformation_matrix();
            let visible = parent_visible && node.visible;
            for &child in node.children.iter().rev() {
                stack.push((child, world, visible));
            }
            out.push(NodeVisit { node: idx, world, visible });
        }
        out
    }

    /// World transform of a single node, composed from its parent chain.
    pub fn world_transform(&self, index: SceneNodeIdx) -> Result<Matrix4d, Err> {
        let n = self.nodes.len();
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            let node = self.nodes.get(idx).ok_or(Err::SceneNodeIndexOutOfRange(idx, n))?;
            chain.push(idx);
            if chain.len() > n {
                // parent links form a loop; stop at what we have
                break;
            }
            current = node.parent;
        }
        Ok(chain.iter().rev().fold(Matrix4d::identity(), |acc, &idx| {
            &acc * &self.nodes[idx].trs_matrix.compute_transformation_matrix()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translated(kind: NodeKind, x: f64) -> SceneNode {
        let mut node = SceneNode::new(kind);
        let mut trs = TrsMatrix::new();
        trs.set_translation(Vector3d::new(x, 0.0, 0.0));
        node.set_trs_matrix(trs);
        node
    }

    #[test]
    fn pre_order_follows_child_order_and_composes_transforms() {
        let mut scene = Scene::new();
        let root = scene.add_node(translated(NodeKind::Group, 1.0));
        let a = scene.add_node(translated(NodeKind::Group, 2.0));
        let b = scene.add_node(translated(NodeKind::Group, 4.0));
        let c = scene.add_node(translated(NodeKind::Group, 8.0));
        scene.add_root_node_index(root);
        scene.add_child(root, a).unwrap();
        scene.add_child(a, c).unwrap();
        scene.add_child(root, b).unwrap();

        let visits = scene.pre_order();
        let order = visits.iter().map(|v| v.node).collect::<Vec<_>>();
        assert_eq!(order, vec![root, a, c, b]);
        assert_eq!(visits[2].world.data[0][3], 11.0);
        assert_eq!(visits[3].world.data[0][3], 5.0);
        assert_eq!(scene.world_transform(c).unwrap(), visits[2].world);
    }

    #[test]
    fn hidden_ancestor_hides_subtree() {
        let mut scene = Scene::new();
        let mut hidden = SceneNode::new(NodeKind::Group);
        hidden.set_visible(false);
        let root = scene.add_node(hidden);
        let child = scene.add_node(SceneNode::new(NodeKind::Group));
        scene.add_root_node_index(root);
        scene.add_child(root, child).unwrap();

        let visits = scene.pre_order();
        assert!(visits.iter().all(|v| !v.visible));
        assert!(scene.get_node(child).unwrap().is_visible());
    }

    #[test]
    fn node_reachable_twice_is_visited_once() {
        let mut scene = Scene::new();
        let a = scene.add_node(SceneNode::new(NodeKind::Group));
        scene.add_root_node_index(a);
        scene.add_root_node_index(a);
        assert_eq!(scene.pre_order().len(), 1);
    }

    #[test]
    fn remapped_skin_keeps_matrices_aligned() {
        let skin = Skin {
            name: Some("rig".to_string()),
            joints: vec![7, 5, 4],
            inverse_bind_matrices: Some(vec![
                Matrix4d::from_scale(Vector3d::new(7.0, 7.0, 7.0)),
                Matrix4d::from_scale(Vector3d::new(5.0, 5.0, 5.0)),
                Matrix4d::from_scale(Vector3d::new(4.0, 4.0, 4.0)),
            ]),
            skeleton: Some(7),
        };
        let remapped = skin.remapped(|j| match j {
            4 => Some(1),
            7 => Some(2),
            _ => None,
        });
        assert_eq!(remapped.joints, vec![2, 1]);
        let matrices = remapped.inverse_bind_matrices.unwrap();
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[1].data[0][0], 4.0);
        assert_eq!(remapped.skeleton, Some(2));
    }

    #[test]
    fn second_parent_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.add_node(SceneNode::new(NodeKind::Group));
        let b = scene.add_node(SceneNode::new(NodeKind::Group));
        let c = scene.add_node(SceneNode::new(NodeKind::Group));
        scene.add_child(a, c).unwrap();
        assert!(matches!(scene.add_child(b, c), Err(Err::AlreadyParented(_))));
    }
}
