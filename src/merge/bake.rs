use crate::core::attribute::{self, Attribute};
use crate::core::geometry::Geometry;
use crate::core::scene::transform::normalize;
use crate::core::scene::{Matrix4d, Scene};
use super::group::Contribution;
use super::Err;

/// A contribution moved into root space.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedGeometry {
    pub geometry: Geometry,
    /// The world transform mirrors, so triangle winding must be reversed to
    /// keep front faces.
    pub flips_winding: bool,
}

pub fn bake(scene: &Scene, contribution: &Contribution) -> Result<BakedGeometry, Err> {
    let geometry = scene.get_geometry(contribution.geometry)
        .ok_or(crate::core::scene::Err::GeometryIndexOutOfRange(contribution.geometry, scene.num_geometries()))?;
    bake_geometry(geometry, &contribution.world)
}

/// Applies `world` to positions, normals and tangents of `geometry`. Every
/// other attribute is copied unchanged.
pub fn bake_geometry(geometry: &Geometry, world: &Matrix4d) -> Result<BakedGeometry, Err> {
    let det = world.linear_determinant();
    let normal_matrix = world.normal_matrix();

    let mut attributes = Vec::with_capacity(geometry.attributes().len());
    for att in geometry.attributes() {
        let baked = match att.name() {
            attribute::POSITION => att.f32_rows::<3>().map(|rows| {
                let rows = rows.into_iter()
                    .map(|p| to_f32(world.transform_point(to_f64(p))))
                    .collect::<Vec<_>>();
                Attribute::from_f32_rows(attribute::POSITION, &rows)
            }),
            attribute::NORMAL => match (&normal_matrix, att.f32_rows::<3>()) {
                (Some(nm), Some(rows)) => {
                    let rows = rows.into_iter()
                        .map(|n| to_f32(nm.transform_normal(to_f64(n))))
                        .collect::<Vec<_>>();
                    Some(Attribute::from_f32_rows(attribute::NORMAL, &rows))
                }
                _ => None,
            },
            attribute::TANGENT => att.f32_rows::<4>().map(|rows| {
                let sign = if det < 0.0 { -1.0 } else { 1.0 };
                let rows = rows.into_iter()
                    .map(|t| {
                        let v = normalize(world.transform_vector([t[0] as f64, t[1] as f64, t[2] as f64]));
                        [v[0] as f32, v[1] as f32, v[2] as f32, t[3] * sign]
                    })
                    .collect::<Vec<_>>();
                Attribute::from_f32_rows(attribute::TANGENT, &rows)
            }),
            _ => Some(att.clone()),
        };
        // Geometry that passed validation always has float layouts here.
        let baked = baked.ok_or_else(|| Err::UntransformableAttribute(att.name().to_string()))?;
        attributes.push(baked);
    }

    let indices = geometry.indices().map(<[u32]>::to_vec);
    Ok(BakedGeometry {
        geometry: Geometry::from_parts(geometry.topology(), attributes, indices),
        flips_winding: det < 0.0,
    })
}

#[inline]
fn to_f64(v: [f32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

#[inline]
fn to_f32(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}
