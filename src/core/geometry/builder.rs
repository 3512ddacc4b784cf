use crate::core::attribute::{self, Attribute};
use super::{Err, Geometry, MorphTarget, Topology};

/// Collects attributes and indices and produces a validated [`Geometry`].
pub struct GeometryBuilder {
    topology: Topology,
    attributes: Vec<Attribute>,
    indices: Option<Vec<u32>>,
    morph_targets: Vec<MorphTarget>,
}

impl GeometryBuilder {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            attributes: Vec::new(),
            indices: None,
            morph_targets: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn add_positions(&mut self, positions: &[[f32; 3]]) -> &mut Self {
        self.add_attribute(Attribute::from_f32_rows(attribute::POSITION, positions))
    }

    pub fn add_normals(&mut self, normals: &[[f32; 3]]) -> &mut Self {
        self.add_attribute(Attribute::from_f32_rows(attribute::NORMAL, normals))
    }

    pub fn add_tex_coords(&mut self, set: u32, tex_coords: &[[f32; 2]]) -> &mut Self {
        self.add_attribute(Attribute::from_f32_rows(format!("TEXCOORD_{}", set), tex_coords))
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) -> &mut Self {
        self.indices = Some(indices);
        self
    }

    pub fn add_morph_target(&mut self, attributes: Vec<Attribute>) -> &mut Self {
        self.morph_targets.push(MorphTarget { attributes });
        self
    }

    pub fn build(&mut self) -> Result<Geometry, Err> {
        let mut geometry = Geometry::from_parts(
            self.topology,
            std::mem::take(&mut self.attributes),
            self.indices.take(),
        );
        geometry.set_morph_targets(std::mem::take(&mut self.morph_targets));
        geometry.validate()?;
        Ok(geometry)
    }
}
