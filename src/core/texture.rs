use serde_json::Value;

/// An image referenced by a texture. Images stored inside a binary buffer
/// keep their encoded bytes so the encoder can copy them into the output
/// buffer. Images with a `uri` only keep their JSON definition.
#[derive(Clone, PartialEq, Debug)]
pub struct Image {
    definition: Value,
    encoded_data: Option<Vec<u8>>,
}

impl Image {
    pub fn from_definition(definition: Value) -> Self {
        Self { definition, encoded_data: None }
    }

    /// `definition` must no longer carry its `bufferView`; the encoder assigns
    /// a new one.
    pub fn with_encoded_data(mut definition: Value, mime_type: &str, encoded_data: Vec<u8>) -> Self {
        if let Value::Object(map) = &mut definition {
            map.remove("bufferView");
            map.insert("mimeType".to_string(), Value::String(mime_type.to_string()));
        }
        Self { definition, encoded_data: Some(encoded_data) }
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    pub fn get_encoded_data(&self) -> Option<&[u8]> {
        self.encoded_data.as_deref()
    }

    pub fn get_mime_type(&self) -> Option<&str> {
        self.definition.get("mimeType").and_then(Value::as_str)
    }
}


/// Textures, samplers and images of a scene, carried as-is from input to
/// output so that material texture references keep pointing at the same
/// entries.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TextureLibrary {
    textures: Vec<Value>,
    samplers: Vec<Value>,
    images: Vec<Image>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // Pushes a new texture into the library. Returns an index of the newly inserted texture.
    pub fn push_texture(&mut self, texture: Value) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn push_sampler(&mut self, sampler: Value) -> usize {
        self.samplers.push(sampler);
        self.samplers.len() - 1
    }

    pub fn push_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn num_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn textures(&self) -> &[Value] {
        &self.textures
    }

    pub fn samplers(&self) -> &[Value] {
        &self.samplers
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.samplers.is_empty() && self.images.is_empty()
    }
}
