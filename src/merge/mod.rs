//! Draw-call reduction: nodes that share a material, a topology and an
//! attribute schema are baked into root space and concatenated into one
//! geometry per group.
//!
//! The engine runs in four steps:
//! 1. [`group::classify`] walks the scene in depth-first pre-order and sorts
//!    every node into a merge group or the pass-through list.
//! 2. [`group::split_into_buckets`] cuts groups whose vertex total does not
//!    fit the configured index width.
//! 3. [`bake::bake`] moves each contribution into root space and
//!    [`concat::concat`] joins the baked geometries of a bucket.
//! 4. [`assemble::assemble`] builds the flattened output scene.
//!
//! Merging never mutates the input scene.

pub mod assemble;
pub mod bake;
pub mod concat;
pub mod group;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{attribute, geometry, scene};
use crate::core::geometry::Geometry;
use crate::core::scene::Scene;
use group::{Classification, MergeGroup};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Err {
    #[error("Node {node} is excluded from merging: {reason}")]
    SchemaMismatch { node: usize, reason: String },
    #[error("{vertices} vertices exceed the {limit} addressable with the configured index width")]
    MergeOverflow { vertices: usize, limit: usize },
    #[error("Cannot concatenate geometry with schema {found} onto {expected}")]
    IncompatibleParts { expected: String, found: String },
    #[error("Attribute {0} cannot be moved into root space")]
    UntransformableAttribute(String),
    #[error("Geometry Error: {0}")]
    GeometryError(#[from] geometry::Err),
    #[error("Attribute Error: {0}")]
    AttributeError(#[from] attribute::Err),
    #[error("Scene Error: {0}")]
    SceneError(#[from] scene::Err),
}

/// Element width of the index buffers of merged geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexWidth {
    U16,
    #[default]
    U32,
}

impl IndexWidth {
    /// Largest vertex count a bucket may hold. The all-ones index value is
    /// reserved by glTF as primitive restart, so `n` bits address `2^n - 1`
    /// vertices.
    pub fn max_vertices(self) -> usize {
        match self {
            IndexWidth::U16 => u16::MAX as usize,
            IndexWidth::U32 => u32::MAX as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub index_width: IndexWidth,
    /// Bake and concatenate buckets on the rayon thread pool. The output is
    /// identical to the sequential run.
    pub parallel: bool,
}

/// What the merge engine did to a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub groups: usize,
    pub merged_meshes: usize,
    pub merged_nodes: usize,
    pub pass_through: usize,
    pub dropped_groups: usize,
}

pub struct MergeOutput {
    pub scene: Scene,
    pub summary: MergeSummary,
}

/// Produces the draw-call reduced equivalent of `scene`.
pub fn merge(scene: &Scene, options: &MergeOptions) -> Result<MergeOutput, Err> {
    let Classification { groups, pass_through, dropped_groups } = group::classify(scene);

    let limit = options.index_width.max_vertices();
    let mut buckets: Vec<&[group::Contribution]> = Vec::new();
    let mut bucket_groups: Vec<&MergeGroup> = Vec::new();
    for g in &groups {
        let counts = g.contributions.iter()
            .map(|c| scene.get_geometry(c.geometry).map_or(0, Geometry::vertex_count))
            .collect::<Vec<_>>();
        for range in group::split_into_buckets(&counts, limit) {
            let vertices: usize = counts[range.clone()].iter().sum();
            if vertices > limit {
                log::warn!("{}; emitting the contribution with 32-bit indices", Err::MergeOverflow { vertices, limit });
            }
            buckets.push(&g.contributions[range]);
            bucket_groups.push(g);
        }
    }
    log::debug!("{} merge groups split into {} buckets", groups.len(), buckets.len());

    let build = |contributions: &&[group::Contribution]| -> Result<Geometry, Err> {
        let baked = contributions.iter()
            .map(|c| bake::bake(scene, c))
            .collect::<Result<Vec<_>, _>>()?;
        concat::concat(&baked)
    };
    let merged = if options.parallel {
        buckets.par_iter().map(build).collect::<Result<Vec<_>, _>>()?
    } else {
        buckets.iter().map(build).collect::<Result<Vec<_>, _>>()?
    };

    let merged_nodes = groups.iter().map(|g| g.contributions.len()).sum();
    let summary = MergeSummary {
        groups: groups.len(),
        merged_meshes: merged.len(),
        merged_nodes,
        pass_through: pass_through.len(),
        dropped_groups,
    };
    let merged = merged.into_iter()
        .zip(bucket_groups)
        .map(|(geometry, g)| assemble::MergedMesh { geometry, material: g.material, topology: g.key.topology })
        .collect::<Vec<_>>();
    let scene = assemble::assemble(scene, merged, &pass_through)?;
    Ok(MergeOutput { scene, summary })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_width_limits() {
        assert_eq!(IndexWidth::U16.max_vertices(), 65_535);
        assert_eq!(IndexWidth::U32.max_vertices(), 4_294_967_295);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: MergeOptions = serde_json::from_str(r#"{"index_width": "u16"}"#).unwrap();
        assert_eq!(options.index_width, IndexWidth::U16);
        assert!(!options.parallel);
    }
}
