use crate::core::attribute::Attribute;
use crate::core::geometry::{Geometry, Topology};
use super::bake::BakedGeometry;
use super::Err;

/// Joins baked geometries that share a schema and a topology. Attribute rows
/// are appended in input order. The index buffer of each part is offset by
/// the number of vertices before it; non-indexed parts get sequential
/// indices. Triangles of mirrored parts have their winding reversed.
pub fn concat(parts: &[BakedGeometry]) -> Result<Geometry, Err> {
    let Some(first) = parts.first() else {
        return Ok(Geometry::from_parts(Topology::Triangles, Vec::new(), Some(Vec::new())));
    };
    let topology = first.geometry.topology();

    let mut attributes: Vec<Attribute> = first.geometry.attributes().to_vec();
    for part in &parts[1..] {
        if part.geometry.schema() != first.geometry.schema() || part.geometry.topology() != topology {
            return Err(Err::IncompatibleParts {
                expected: first.geometry.schema().to_string(),
                found: part.geometry.schema().to_string(),
            });
        }
        for (dst, src) in attributes.iter_mut().zip(part.geometry.attributes()) {
            dst.extend_from(src)?;
        }
    }

    let total_elements = parts.iter().map(|p| p.geometry.element_count()).sum();
    let mut indices = Vec::with_capacity(total_elements);
    let mut offset = 0u32;
    for part in parts {
        let start = indices.len();
        match part.geometry.indices() {
            Some(local) => indices.extend(local.iter().map(|&i| i + offset)),
            None => {
                let count = part.geometry.vertex_count() as u32;
                indices.extend(offset..offset + count);
            }
        }
        if part.flips_winding && topology == Topology::Triangles {
            for tri in indices[start..].chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
        offset += part.geometry.vertex_count() as u32;
    }

    let geometry = Geometry::from_parts(topology, attributes, Some(indices));
    geometry.validate()?;
    Ok(geometry)
}
