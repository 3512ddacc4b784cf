pub mod builder;

use crate::core::attribute::{self, Attribute, AttributeLayout, AttributeSchema};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Err {
    #[error("Geometry has no POSITION attribute")]
    MissingPosition,
    #[error("Attribute {name} has layout {found:?}, expected {expected:?}")]
    UnexpectedLayout { name: String, expected: AttributeLayout, found: AttributeLayout },
    #[error("Attribute {name} has {found} rows but the geometry has {expected} vertices")]
    RowCountMismatch { name: String, expected: usize, found: usize },
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("{count} indices do not form complete {topology:?} primitives")]
    IncompletePrimitive { count: usize, topology: Topology },
    #[error("Attribute {0} appears more than once")]
    DuplicateAttribute(String),
    #[error("Attribute Error: {0}")]
    AttributeError(#[from] attribute::Err),
}

/// Primitive category of a geometry. Strip, loop and fan modes are expanded
/// to their list equivalents on load, so only list topologies remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

impl Topology {
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            Topology::Triangles => 3,
            Topology::Lines => 2,
            Topology::Points => 1,
        }
    }

    /// The primitive `mode` value used in glTF JSON.
    pub fn gltf_mode(self) -> u32 {
        match self {
            Topology::Points => 0,
            Topology::Lines => 1,
            Topology::Triangles => 4,
        }
    }
}

/// Attribute deltas of one morph target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphTarget {
    pub attributes: Vec<Attribute>,
}

/// Co-indexed vertex attributes plus optional indices. Attributes are kept
/// sorted by name so that equal attribute sets produce equal schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    attributes: Vec<Attribute>,
    indices: Option<Vec<u32>>,
    topology: Topology,
    morph_targets: Vec<MorphTarget>,
}

impl Geometry {
    /// Assembles a geometry without validating it. Use [`Geometry::validate`]
    /// or [`builder::GeometryBuilder`] when consistency matters.
    pub fn from_parts(topology: Topology, mut attributes: Vec<Attribute>, indices: Option<Vec<u32>>) -> Self {
        attributes.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            attributes,
            indices,
            topology,
            morph_targets: Vec::new(),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|att| att.name() == name)
    }

    pub fn position(&self) -> Option<&Attribute> {
        self.attribute(attribute::POSITION)
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn morph_targets(&self) -> &[MorphTarget] {
        &self.morph_targets
    }

    pub fn set_morph_targets(&mut self, morph_targets: Vec<MorphTarget>) {
        self.morph_targets = morph_targets;
    }

    pub fn has_morph_targets(&self) -> bool {
        !self.morph_targets.is_empty()
    }

    /// Number of position rows; zero without a position attribute.
    pub fn vertex_count(&self) -> usize {
        self.position().map_or(0, |att| att.len())
    }

    /// Number of elements the primitive draws: the index count, or the
    /// vertex count for non-indexed geometry.
    pub fn element_count(&self) -> usize {
        self.indices.as_ref().map_or_else(|| self.vertex_count(), |i| i.len())
    }

    pub fn schema(&self) -> AttributeSchema {
        AttributeSchema::of(&self.attributes)
    }

    /// Checks that the attributes agree with each other and with the index
    /// buffer.
    pub fn validate(&self) -> Result<(), Err> {
        let position = self.position().ok_or(Err::MissingPosition)?;
        Self::expect_layout(position, AttributeLayout::f32(3))?;
        if let Some(normal) = self.attribute(attribute::NORMAL) {
            Self::expect_layout(normal, AttributeLayout::f32(3))?;
        }
        if let Some(tangent) = self.attribute(attribute::TANGENT) {
            Self::expect_layout(tangent, AttributeLayout::f32(4))?;
        }

        let vertex_count = position.len();
        for pair in self.attributes.windows(2) {
            if pair[0].name() == pair[1].name() {
                return Err(Err::DuplicateAttribute(pair[0].name().to_string()));
            }
        }
        for att in &self.attributes {
            if att.len() != vertex_count {
                return Err(Err::RowCountMismatch {
                    name: att.name().to_string(),
                    expected: vertex_count,
                    found: att.len(),
                });
            }
        }

        let count = self.element_count();
        if count % self.topology.vertices_per_primitive() != 0 {
            return Err(Err::IncompletePrimitive { count, topology: self.topology });
        }
        if let Some(indices) = &self.indices {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Err::IndexOutOfRange { index, vertex_count });
            }
        }
        Ok(())
    }

    fn expect_layout(att: &Attribute, expected: AttributeLayout) -> Result<(), Err> {
        if att.layout() != expected {
            return Err(Err::UnexpectedLayout {
                name: att.name().to_string(),
                expected,
                found: att.layout(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::{Attribute, NORMAL, POSITION};

    fn triangle() -> Vec<Attribute> {
        vec![
            Attribute::from_f32_rows(POSITION, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            Attribute::from_f32_rows(NORMAL, &[[0.0, 0.0, 1.0]; 3]),
        ]
    }

    #[test]
    fn attributes_are_sorted_by_name() {
        let mut atts = triangle();
        atts.reverse();
        let geometry = Geometry::from_parts(Topology::Triangles, atts, None);
        let names = geometry.attributes().iter().map(|a| a.name()).collect::<Vec<_>>();
        assert_eq!(names, vec![NORMAL, POSITION]);
    }

    #[test]
    fn validate_accepts_consistent_geometry() {
        let geometry = Geometry::from_parts(Topology::Triangles, triangle(), Some(vec![0, 1, 2]));
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.vertex_count(), 3);
    }

    #[test]
    fn validate_rejects_inconsistent_rows() {
        let mut atts = triangle();
        atts[1] = Attribute::from_f32_rows(NORMAL, &[[0.0, 0.0, 1.0]; 2]);
        let geometry = Geometry::from_parts(Topology::Triangles, atts, None);
        assert!(matches!(geometry.validate(), Err(Err::RowCountMismatch { expected: 3, found: 2, .. })));
    }

    #[test]
    fn validate_rejects_out_of_range_indices() {
        let geometry = Geometry::from_parts(Topology::Triangles, triangle(), Some(vec![0, 1, 3]));
        assert!(matches!(geometry.validate(), Err(Err::IndexOutOfRange { index: 3, .. })));
    }

    #[test]
    fn validate_rejects_incomplete_lines() {
        let geometry = Geometry::from_parts(Topology::Lines, triangle(), None);
        assert!(matches!(geometry.validate(), Err(Err::IncompletePrimitive { count: 3, .. })));
    }

    #[test]
    fn missing_position_counts_zero_vertices() {
        let geometry = Geometry::from_parts(
            Topology::Points,
            vec![Attribute::from_f32_rows(NORMAL, &[[0.0, 1.0, 0.0]])],
            None,
        );
        assert_eq!(geometry.vertex_count(), 0);
        assert!(matches!(geometry.validate(), Err(Err::MissingPosition)));
    }
}
