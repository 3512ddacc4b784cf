use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

use crate::core::attribute::AttributeSchema;
use crate::core::geometry::Topology;
use crate::core::material::MaterialSignature;
use crate::core::scene::transform::SINGULAR_EPSILON;
use crate::core::scene::{GeometryIdx, MaterialIdx, Matrix4d, NodeKind, Scene, SceneNodeIdx};
use super::Err;

/// Nodes with equal keys may be concatenated into one geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub material: MaterialSignature,
    pub topology: Topology,
    pub schema: AttributeSchema,
}

/// One node's share of a merge group.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub node: SceneNodeIdx,
    pub geometry: GeometryIdx,
    pub world: Matrix4d,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeGroup {
    pub key: MergeKey,
    /// Material of the first contribution. All members share its signature.
    pub material: Option<MaterialIdx>,
    pub contributions: Vec<Contribution>,
}

/// Why a node is copied to the output instead of being merged.
#[derive(Debug, Clone, PartialEq)]
pub enum PassReason {
    Skinned,
    Morphed,
    SkinJoint,
    Hidden,
    Camera,
    Light,
    /// The geometry is inconsistent with itself, e.g. attribute row counts
    /// differ.
    InvalidGeometry(String),
    DegenerateTransform,
    /// A group node without children, such as an attachment point.
    Empty,
    /// No other node shares the merge key.
    Unmatched,
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassReason::Skinned => f.write_str("skinned"),
            PassReason::Morphed => f.write_str("has morph targets"),
            PassReason::SkinJoint => f.write_str("skin joint"),
            PassReason::Hidden => f.write_str("hidden"),
            PassReason::Camera => f.write_str("camera"),
            PassReason::Light => f.write_str("light"),
            PassReason::InvalidGeometry(e) => write!(f, "invalid geometry ({})", e),
            PassReason::DegenerateTransform => f.write_str("singular world transform"),
            PassReason::Empty => f.write_str("empty node"),
            PassReason::Unmatched => f.write_str("no merge partner"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassThrough {
    pub node: SceneNodeIdx,
    pub world: Matrix4d,
    /// Effective visibility, including hidden ancestors.
    pub visible: bool,
    pub reason: PassReason,
}

#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Groups with at least two contributions, ordered by first appearance.
    pub groups: Vec<MergeGroup>,
    /// Ineligible or unmatched nodes in traversal order.
    pub pass_through: Vec<PassThrough>,
    /// Number of groups left with a single contribution.
    pub dropped_groups: usize,
}

/// Sorts every node of `scene` into a merge group or the pass-through list.
/// Group nodes with children are left out: their transforms live on in the
/// world matrices of their descendants.
pub fn classify(scene: &Scene) -> Classification {
    let joints = joint_nodes(scene);
    let library = scene.material_library();

    let mut order: Vec<(usize, PassThrough)> = Vec::new();
    let mut groups: IndexMap<MergeKey, (Option<MaterialIdx>, Vec<(usize, PassThrough, GeometryIdx)>)> = IndexMap::new();

    for (position, visit) in scene.pre_order().into_iter().enumerate() {
        let Some(node) = scene.get_node(visit.node) else {
            continue;
        };
        let pass = |reason: PassReason| PassThrough {
            node: visit.node,
            world: visit.world,
            visible: visit.visible,
            reason,
        };

        let reason = if joints.contains(&visit.node) {
            Some(PassReason::SkinJoint)
        } else {
            match node.kind() {
                NodeKind::Group if node.num_children() == 0 => Some(PassReason::Empty),
                NodeKind::Group => continue,
                NodeKind::Camera(_) => Some(PassReason::Camera),
                NodeKind::Light(_) => Some(PassReason::Light),
                NodeKind::Mesh(_) | NodeKind::Line(_) | NodeKind::Points(_) => None,
            }
        };
        if let Some(reason) = reason {
            order.push((position, pass(reason)));
            continue;
        }

        let Some(drawable) = node.kind().drawable() else {
            continue;
        };
        let Some(geometry) = scene.get_geometry(drawable.geometry) else {
            let reason = format!("missing geometry {}", drawable.geometry);
            log::warn!("{}", Err::SchemaMismatch { node: visit.node, reason: reason.clone() });
            order.push((position, pass(PassReason::InvalidGeometry(reason))));
            continue;
        };

        let reason = if drawable.skin.is_some() {
            Some(PassReason::Skinned)
        } else if drawable.weights.is_some() || geometry.has_morph_targets() {
            Some(PassReason::Morphed)
        } else if !visit.visible {
            Some(PassReason::Hidden)
        } else if let Err(e) = geometry.validate() {
            log::warn!("{}", Err::SchemaMismatch { node: visit.node, reason: e.to_string() });
            Some(PassReason::InvalidGeometry(e.to_string()))
        } else if visit.world.linear_determinant().abs() < SINGULAR_EPSILON {
            Some(PassReason::DegenerateTransform)
        } else {
            None
        };
        if let Some(reason) = reason {
            order.push((position, pass(reason)));
            continue;
        }

        let key = MergeKey {
            material: library.signature_of(drawable.material),
            topology: geometry.topology(),
            schema: geometry.schema(),
        };
        groups.entry(key)
            .or_insert_with(|| (drawable.material, Vec::new()))
            .1
            .push((position, pass(PassReason::Unmatched), drawable.geometry));
    }

    let mut out = Classification::default();
    for (key, (material, members)) in groups {
        if members.len() < 2 {
            out.dropped_groups += 1;
            order.extend(members.into_iter().map(|(position, pass, _)| (position, pass)));
            continue;
        }
        let contributions = members.into_iter()
            .map(|(_, pass, geometry)| Contribution { node: pass.node, geometry, world: pass.world })
            .collect();
        out.groups.push(MergeGroup { key, material, contributions });
    }
    order.sort_by_key(|(position, _)| *position);
    out.pass_through = order.into_iter().map(|(_, pass)| pass).collect();
    out
}

/// Every node a skin refers to, either as a joint or as its skeleton root.
fn joint_nodes(scene: &Scene) -> HashSet<SceneNodeIdx> {
    scene.skins().iter()
        .flat_map(|skin| skin.joints.iter().copied().chain(skin.skeleton))
        .collect()
}

/// Cuts a sequence of per-contribution vertex counts into consecutive ranges
/// whose totals do not exceed `limit`. A single count above the limit gets a
/// range of its own.
pub fn split_into_buckets(counts: &[usize], limit: usize) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut total = 0usize;
    for (i, &count) in counts.iter().enumerate() {
        if i > start && total + count > limit {
            out.push(start..i);
            start = i;
            total = 0;
        }
        total += count;
    }
    if start < counts.len() {
        out.push(start..counts.len());
    }
    out
}
