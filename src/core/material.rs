use std::fmt;

use serde_json::Value;

use crate::core::texture::TextureLibrary;

/// Materials of a scene plus the textures they reference. Material and
/// texture indices are stable: the merge engine carries the library over to
/// its output unchanged.
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    texture_library: TextureLibrary,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn get_material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Adds a material to the library and returns its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn get_texture_library(&self) -> &TextureLibrary {
        &self.texture_library
    }

    pub fn get_texture_library_mut(&mut self) -> &mut TextureLibrary {
        &mut self.texture_library
    }

    /// Signature of the material at `index`, or of the default material when
    /// `index` is `None`. Unknown indices get a signature of their own so
    /// they never merge with anything else.
    pub fn signature_of(&self, index: Option<usize>) -> MaterialSignature {
        match index {
            None => MaterialSignature::default_material(),
            Some(i) => match self.get_material(i) {
                Some(material) => material.signature(),
                None => MaterialSignature(format!("missing:{}", i)),
            },
        }
    }
}


/// A glTF material kept as its JSON definition. The merge engine only needs
/// to compare materials, never to interpret them.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    definition: Value,
}

impl Material {
    pub fn new(definition: Value) -> Self {
        Self { definition }
    }

    pub fn name(&self) -> Option<&str> {
        self.definition.get("name").and_then(Value::as_str)
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Everything except the name: shading model, factors, texture
    /// references, alpha mode and double-sidedness.
    pub fn signature(&self) -> MaterialSignature {
        let mut definition = self.definition.clone();
        if let Value::Object(map) = &mut definition {
            map.remove("name");
            map.remove("extras");
        }
        // serde_json maps are ordered by key, which makes this canonical.
        MaterialSignature(definition.to_string())
    }
}


/// Equality token for materials. See [`Material::signature`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialSignature(String);

impl MaterialSignature {
    /// Signature shared by every primitive without a material.
    pub fn default_material() -> Self {
        MaterialSignature("default".to_string())
    }
}

impl fmt::Display for MaterialSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_ignores_name() {
        let a = Material::new(json!({"name": "a", "pbrMetallicRoughness": {"baseColorFactor": [1, 0, 0, 1]}}));
        let b = Material::new(json!({"pbrMetallicRoughness": {"baseColorFactor": [1, 0, 0, 1]}, "name": "b"}));
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn signature_sees_blend_and_side_modes() {
        let opaque = Material::new(json!({"alphaMode": "OPAQUE"}));
        let blend = Material::new(json!({"alphaMode": "BLEND"}));
        let double_sided = Material::new(json!({"alphaMode": "OPAQUE", "doubleSided": true}));
        assert_ne!(opaque.signature(), blend.signature());
        assert_ne!(opaque.signature(), double_sided.signature());
    }

    #[test]
    fn library_signatures() {
        let mut library = MaterialLibrary::new();
        let idx = library.add_material(Material::new(json!({"name": "red"})));
        assert_eq!(library.get_material(idx).unwrap().name(), Some("red"));
        assert_eq!(library.signature_of(None), MaterialSignature::default_material());
        assert_ne!(library.signature_of(Some(7)), library.signature_of(Some(8)));
    }
}
