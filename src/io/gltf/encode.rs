use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::attribute::{self, Attribute};
use crate::core::geometry::Geometry;
use crate::core::scene::{GeometryIdx, MaterialIdx, NodeKind, Scene, SceneNode, SceneNodeIdx, TrsMatrix};

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const GENERATOR: &str = "gltf-merge";

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Encoding Error: {0}")]
    EncodingError(String),
    #[error("IO Error: {0}")]
    IoError(String),
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    #[error("std io Error: {0}")]
    StdIoError(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Where the binary buffer of a `.gltf` output goes. `.glb` output always
/// stores it in the GLB binary chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferOutput {
    /// Base64 `data:` URI inside the JSON document.
    #[default]
    Embedded,
    /// `<stem>.bin` next to the JSON document.
    Separate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonOutputMode {
    /// Pretty-printed JSON.
    #[default]
    Readable,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub buffer_output: BufferOutput,
    pub json_output_mode: JsonOutputMode,
    /// Leave hidden nodes and their subtrees out of the output.
    pub only_visible: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            buffer_output: BufferOutput::default(),
            json_output_mode: JsonOutputMode::default(),
            only_visible: true,
        }
    }
}

/// A glTF document whose binary data has not been attached to a buffer yet.
/// Every buffer view in `json` refers to buffer 0, which is `binary`.
#[derive(Debug, Clone, PartialEq)]
pub struct GltfAsset {
    pub json: Map<String, Value>,
    pub binary: Vec<u8>,
}

impl GltfAsset {
    /// Declares buffer 0, optionally with a URI. Documents without binary
    /// data get no buffer.
    fn attach_buffer(&mut self, uri: Option<String>) {
        if self.binary.is_empty() {
            return;
        }
        let mut buffer = Map::new();
        buffer.insert("byteLength".to_string(), json!(self.binary.len()));
        if let Some(uri) = uri {
            buffer.insert("uri".to_string(), Value::String(uri));
        }
        self.json.insert("buffers".to_string(), Value::Array(vec![Value::Object(buffer)]));
    }
}


/// Encodes a [`Scene`] into glTF 2.0. Drawables sharing a geometry share its
/// accessors, and drawables sharing geometry and material share one mesh.
#[derive(Debug, Clone, Default)]
pub struct GltfEncoder {
    options: EncodeOptions,
}

impl GltfEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Writes the scene to `path`. A `.glb` extension selects the binary
    /// container; anything else is written as `.gltf` JSON.
    pub async fn encode_scene_to_file(&self, scene: &Scene, path: &Path) -> Result<(), Err> {
        let is_glb = path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));

        if is_glb {
            let bytes = self.encode_scene_to_glb(scene)?;
            tokio::fs::write(path, bytes).await
                .map_err(|e| Err::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
            return Ok(());
        }

        let mut asset = self.encode_scene_to_asset(scene)?;
        match self.options.buffer_output {
            BufferOutput::Embedded => {
                let uri = Self::data_uri(&asset.binary);
                asset.attach_buffer(Some(uri));
            }
            BufferOutput::Separate => {
                let stem = path.file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| Err::InvalidInput(format!("Output path {} has no file name", path.display())))?;
                let bin_name = format!("{}.bin", stem);
                if !asset.binary.is_empty() {
                    let bin_path = path.with_file_name(&bin_name);
                    tokio::fs::write(&bin_path, &asset.binary).await
                        .map_err(|e| Err::IoError(format!("Failed to write {}: {}", bin_path.display(), e)))?;
                }
                asset.attach_buffer(Some(bin_name));
            }
        }
        let json = self.serialize_json(&asset.json)?;
        tokio::fs::write(path, json).await
            .map_err(|e| Err::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
        log::debug!("Wrote {} ({} bytes of binary data)", path.display(), asset.binary.len());
        Ok(())
    }

    /// Encodes the scene into a GLB container.
    pub fn encode_scene_to_glb(&self, scene: &Scene) -> Result<Vec<u8>, Err> {
        let mut asset = self.encode_scene_to_asset(scene)?;
        asset.attach_buffer(None);
        let json = self.serialize_json(&asset.json)?;
        let mut out = Vec::with_capacity(json.len() + asset.binary.len() + 28);
        self.write_glb_format(&mut out, &json, &asset.binary)?;
        Ok(out)
    }

    /// Encodes the scene into a `.gltf` document with the binary data
    /// embedded as a base64 `data:` URI.
    pub fn encode_scene_to_gltf(&self, scene: &Scene) -> Result<Vec<u8>, Err> {
        let mut asset = self.encode_scene_to_asset(scene)?;
        let uri = Self::data_uri(&asset.binary);
        asset.attach_buffer(Some(uri));
        self.serialize_json(&asset.json)
    }

    pub fn encode_scene_to_asset(&self, scene: &Scene) -> Result<GltfAsset, Err> {
        AssetBuilder::new(scene, &self.options).build()
    }

    fn serialize_json(&self, json: &Map<String, Value>) -> Result<Vec<u8>, Err> {
        Ok(match self.options.json_output_mode {
            JsonOutputMode::Readable => serde_json::to_vec_pretty(json)?,
            JsonOutputMode::Compact => serde_json::to_vec(json)?,
        })
    }

    fn data_uri(binary: &[u8]) -> String {
        use base64::Engine;
        format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(binary)
        )
    }

    fn write_glb_format<W: std::io::Write>(&self, writer: &mut W, json_data: &[u8], binary_data: &[u8]) -> Result<(), Err> {
        // GLB header: magic (4 bytes) + version (4 bytes) + length (4 bytes)
        writer.write_all(b"glTF")
            .map_err(|e| Err::IoError(format!("Failed to write GLB magic: {}", e)))?;
        writer.write_all(&2u32.to_le_bytes())
            .map_err(|e| Err::IoError(format!("Failed to write GLB version: {}", e)))?;

        let json_length = json_data.len();
        let json_padded_length = (json_length + 3) & !3;
        let binary_length = binary_data.len();
        let binary_padded_length = (binary_length + 3) & !3;

        let total_length = 12 + 8 + json_padded_length
            + if binary_padded_length > 0 { 8 + binary_padded_length } else { 0 };
        let total_length = u32::try_from(total_length)
            .map_err(|_| Err::EncodingError(format!("GLB output of {} bytes is too large", total_length)))?;
        writer.write_all(&total_length.to_le_bytes())
            .map_err(|e| Err::IoError(format!("Failed to write GLB length: {}", e)))?;

        writer.write_all(&(json_padded_length as u32).to_le_bytes())
            .map_err(|e| Err::IoError(format!("Failed to write JSON chunk length: {}", e)))?;
        writer.write_all(b"JSON")
            .map_err(|e| Err::IoError(format!("Failed to write JSON chunk type: {}", e)))?;
        writer.write_all(json_data)
            .map_err(|e| Err::IoError(format!("Failed to write JSON data: {}", e)))?;
        // JSON is padded with spaces
        writer.write_all(&vec![b' '; json_padded_length - json_length])
            .map_err(|e| Err::IoError(format!("Failed to write JSON padding: {}", e)))?;

        if binary_padded_length > 0 {
            writer.write_all(&(binary_padded_length as u32).to_le_bytes())
                .map_err(|e| Err::IoError(format!("Failed to write BIN chunk length: {}", e)))?;
            writer.write_all(b"BIN\0")
                .map_err(|e| Err::IoError(format!("Failed to write BIN chunk type: {}", e)))?;
            writer.write_all(binary_data)
                .map_err(|e| Err::IoError(format!("Failed to write binary data: {}", e)))?;
            writer.write_all(&vec![0u8; binary_padded_length - binary_length])
                .map_err(|e| Err::IoError(format!("Failed to write binary padding: {}", e)))?;
        }
        Ok(())
    }
}


/// Accessor indices written for one geometry.
#[derive(Debug, Clone)]
struct GeometryAccessors {
    attributes: Map<String, Value>,
    indices: Option<usize>,
    targets: Vec<Map<String, Value>>,
}

struct AssetBuilder<'a> {
    scene: &'a Scene,
    options: &'a EncodeOptions,
    binary: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    geometry_accessors: HashMap<GeometryIdx, GeometryAccessors>,
    mesh_cache: HashMap<(GeometryIdx, Option<MaterialIdx>), usize>,
    extensions_used: Vec<String>,
}

impl<'a> AssetBuilder<'a> {
    fn new(scene: &'a Scene, options: &'a EncodeOptions) -> Self {
        Self {
            scene,
            options,
            binary: Vec::new(),
            buffer_views: Vec::new(),
            accessors: Vec::new(),
            meshes: Vec::new(),
            geometry_accessors: HashMap::new(),
            mesh_cache: HashMap::new(),
            extensions_used: scene.extensions_used().to_vec(),
        }
    }

    fn build(mut self) -> Result<GltfAsset, Err> {
        // Emitted nodes in pre-order; hidden subtrees are left out on request.
        let emitted: Vec<SceneNodeIdx> = self.scene.pre_order()
            .into_iter()
            .filter(|visit| visit.visible || !self.options.only_visible)
            .map(|visit| visit.node)
            .collect();
        let node_map: HashMap<SceneNodeIdx, usize> = emitted.iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();

        let mut nodes = Vec::with_capacity(emitted.len());
        for &idx in &emitted {
            let Some(node) = self.scene.get_node(idx) else {
                continue;
            };
            nodes.push(self.encode_node(node, &node_map)?);
        }

        let skins = self.encode_skins(&node_map)?;
        let images = self.encode_images();

        let mut json = Map::new();
        json.insert("asset".to_string(), json!({"version": "2.0", "generator": GENERATOR}));

        let mut gltf_scene = Map::new();
        if let Some(name) = self.scene.get_name() {
            gltf_scene.insert("name".to_string(), json!(name));
        }
        let roots: Vec<usize> = self.scene.root_node_indices().iter()
            .filter_map(|idx| node_map.get(idx).copied())
            .collect();
        gltf_scene.insert("nodes".to_string(), json!(roots));
        json.insert("scene".to_string(), json!(0));
        json.insert("scenes".to_string(), json!([Value::Object(gltf_scene)]));

        let library = self.scene.material_library();
        let textures = library.get_texture_library();
        let materials: Vec<Value> = library.materials().iter().map(|m| m.definition().clone()).collect();

        insert_array(&mut json, "nodes", nodes);
        insert_array(&mut json, "meshes", std::mem::take(&mut self.meshes));
        insert_array(&mut json, "materials", materials);
        insert_array(&mut json, "textures", textures.textures().to_vec());
        insert_array(&mut json, "samplers", textures.samplers().to_vec());
        insert_array(&mut json, "images", images);
        insert_array(&mut json, "skins", skins);
        insert_array(&mut json, "cameras", self.scene.cameras().to_vec());

        if !self.scene.lights().is_empty() {
            json.insert(
                "extensions".to_string(),
                json!({"KHR_lights_punctual": {"lights": self.scene.lights()}}),
            );
            self.use_extension("KHR_lights_punctual");
        }

        insert_array(&mut json, "accessors", std::mem::take(&mut self.accessors));
        insert_array(&mut json, "bufferViews", std::mem::take(&mut self.buffer_views));
        insert_array(&mut json, "extensionsUsed", self.extensions_used.iter().map(|e| json!(e)).collect());
        insert_array(
            &mut json,
            "extensionsRequired",
            self.scene.extensions_required().iter().map(|e| json!(e)).collect(),
        );

        Ok(GltfAsset { json, binary: self.binary })
    }

    fn encode_node(&mut self, node: &SceneNode, node_map: &HashMap<SceneNodeIdx, usize>) -> Result<Value, Err> {
        let mut out = Map::new();
        if let Some(name) = node.get_name() {
            out.insert("name".to_string(), json!(name));
        }
        let children: Vec<usize> = node.children().iter()
            .filter_map(|child| node_map.get(child).copied())
            .collect();
        if !children.is_empty() {
            out.insert("children".to_string(), json!(children));
        }
        encode_transform(node.get_trs_matrix(), &mut out);

        let mut extensions = Map::new();
        match node.kind() {
            NodeKind::Mesh(drawable) | NodeKind::Line(drawable) | NodeKind::Points(drawable) => {
                let mesh = self.mesh_for(drawable.geometry, drawable.material)?;
                out.insert("mesh".to_string(), json!(mesh));
                if let Some(skin) = drawable.skin {
                    out.insert("skin".to_string(), json!(skin));
                }
                if let Some(weights) = &drawable.weights {
                    out.insert("weights".to_string(), json!(weights));
                }
            }
            NodeKind::Camera(camera) => {
                out.insert("camera".to_string(), json!(camera));
            }
            NodeKind::Light(light) => {
                extensions.insert("KHR_lights_punctual".to_string(), json!({"light": light}));
            }
            NodeKind::Group => {}
        }
        if !node.is_visible() {
            extensions.insert("KHR_node_visibility".to_string(), json!({"visible": false}));
            self.use_extension("KHR_node_visibility");
        }
        if !extensions.is_empty() {
            out.insert("extensions".to_string(), Value::Object(extensions));
        }
        Ok(Value::Object(out))
    }

    fn mesh_for(&mut self, geometry: GeometryIdx, material: Option<MaterialIdx>) -> Result<usize, Err> {
        if let Some(&mesh) = self.mesh_cache.get(&(geometry, material)) {
            return Ok(mesh);
        }
        let source = self.scene.get_geometry(geometry)
            .ok_or_else(|| Err::InvalidInput(format!("Drawable refers to missing geometry {}", geometry)))?;
        let accessors = match self.geometry_accessors.get(&geometry) {
            Some(accessors) => accessors.clone(),
            None => {
                let accessors = self.encode_geometry(source)?;
                self.geometry_accessors.insert(geometry, accessors.clone());
                accessors
            }
        };

        let mut primitive = Map::new();
        primitive.insert("attributes".to_string(), Value::Object(accessors.attributes));
        if let Some(indices) = accessors.indices {
            primitive.insert("indices".to_string(), json!(indices));
        }
        if let Some(material) = material {
            primitive.insert("material".to_string(), json!(material));
        }
        primitive.insert("mode".to_string(), json!(source.topology().gltf_mode()));
        if !accessors.targets.is_empty() {
            primitive.insert("targets".to_string(), json!(accessors.targets));
        }

        self.meshes.push(json!({"primitives": [Value::Object(primitive)]}));
        let mesh = self.meshes.len() - 1;
        self.mesh_cache.insert((geometry, material), mesh);
        Ok(mesh)
    }

    fn encode_geometry(&mut self, geometry: &Geometry) -> Result<GeometryAccessors, Err> {
        let mut attributes = Map::new();
        for attribute in geometry.attributes() {
            let accessor = self.push_vertex_attribute(attribute, Some(ARRAY_BUFFER))?;
            attributes.insert(attribute.name().to_string(), json!(accessor));
        }

        let indices = match geometry.indices() {
            Some(indices) => Some(self.push_indices(indices, geometry.vertex_count())),
            None => None,
        };

        let mut targets = Vec::with_capacity(geometry.morph_targets().len());
        for target in geometry.morph_targets() {
            let mut map = Map::new();
            for attribute in &target.attributes {
                let accessor = self.push_vertex_attribute(attribute, None)?;
                map.insert(attribute.name().to_string(), json!(accessor));
            }
            targets.push(map);
        }
        Ok(GeometryAccessors { attributes, indices, targets })
    }

    /// Writes one attribute into its own buffer view. Elements whose size is
    /// not a multiple of four are padded and get an explicit byte stride.
    fn push_vertex_attribute(&mut self, attribute: &Attribute, target: Option<u32>) -> Result<usize, Err> {
        let elem_size = attribute.stride();
        let padded = (elem_size + 3) & !3;
        let type_name = accessor_type(attribute.num_components())
            .ok_or_else(|| Err::InvalidInput(format!(
                "Attribute {} has {} components", attribute.name(), attribute.num_components()
            )))?;

        let view = if padded == elem_size || target.is_none() {
            self.push_buffer_view(attribute.as_bytes(), target, None)
        } else {
            let mut bytes = Vec::with_capacity(attribute.len() * padded);
            for elem in attribute.as_bytes().chunks_exact(elem_size) {
                bytes.extend_from_slice(elem);
                bytes.resize(bytes.len() + padded - elem_size, 0);
            }
            self.push_buffer_view(&bytes, target, Some(padded))
        };

        let mut accessor = Map::new();
        accessor.insert("bufferView".to_string(), json!(view));
        accessor.insert("componentType".to_string(), json!(attribute.component_type().gltf_code()));
        accessor.insert("count".to_string(), json!(attribute.len()));
        accessor.insert("type".to_string(), json!(type_name));
        if attribute.normalized() {
            accessor.insert("normalized".to_string(), json!(true));
        }
        if attribute.name() == attribute::POSITION {
            // glTF requires bounds on POSITION accessors
            if let Some((min, max)) = attribute.f32_bounds() {
                accessor.insert("min".to_string(), json!(min));
                accessor.insert("max".to_string(), json!(max));
            }
        }
        self.accessors.push(Value::Object(accessor));
        Ok(self.accessors.len() - 1)
    }

    fn push_indices(&mut self, indices: &[u32], vertex_count: usize) -> usize {
        let (bytes, component_type) = if vertex_count <= u16::MAX as usize {
            let bytes: Vec<u8> = indices.iter().flat_map(|&i| (i as u16).to_le_bytes()).collect();
            (bytes, 5123)
        } else {
            let bytes: Vec<u8> = indices.iter().flat_map(|&i| i.to_le_bytes()).collect();
            (bytes, 5125)
        };
        let view = self.push_buffer_view(&bytes, Some(ELEMENT_ARRAY_BUFFER), None);
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": component_type,
            "count": indices.len(),
            "type": "SCALAR",
        }));
        self.accessors.len() - 1
    }

    /// Appends `bytes` to the binary buffer at a 4-byte aligned offset.
    fn push_buffer_view(&mut self, bytes: &[u8], target: Option<u32>, stride: Option<usize>) -> usize {
        let offset = (self.binary.len() + 3) & !3;
        self.binary.resize(offset, 0);
        self.binary.extend_from_slice(bytes);

        let mut view = Map::new();
        view.insert("buffer".to_string(), json!(0));
        view.insert("byteOffset".to_string(), json!(offset));
        view.insert("byteLength".to_string(), json!(bytes.len()));
        if let Some(stride) = stride {
            view.insert("byteStride".to_string(), json!(stride));
        }
        if let Some(target) = target {
            view.insert("target".to_string(), json!(target));
        }
        self.buffer_views.push(Value::Object(view));
        self.buffer_views.len() - 1
    }

    fn encode_skins(&mut self, node_map: &HashMap<SceneNodeIdx, usize>) -> Result<Vec<Value>, Err> {
        let mut out = Vec::with_capacity(self.scene.skins().len());
        for skin in self.scene.skins() {
            let skin = skin.remapped(|joint| node_map.get(&joint).copied());
            let mut json = Map::new();
            if let Some(name) = &skin.name {
                json.insert("name".to_string(), json!(name));
            }
            json.insert("joints".to_string(), json!(skin.joints));
            if let Some(skeleton) = skin.skeleton {
                json.insert("skeleton".to_string(), json!(skeleton));
            }
            if let Some(matrices) = &skin.inverse_bind_matrices {
                let bytes: Vec<u8> = matrices.iter()
                    .flat_map(|m| m.to_column_major())
                    .flat_map(f32::to_le_bytes)
                    .collect();
                let view = self.push_buffer_view(&bytes, None, None);
                self.accessors.push(json!({
                    "bufferView": view,
                    "componentType": 5126,
                    "count": matrices.len(),
                    "type": "MAT4",
                }));
                json.insert("inverseBindMatrices".to_string(), json!(self.accessors.len() - 1));
            }
            out.push(Value::Object(json));
        }
        Ok(out)
    }

    /// Image definitions, with image bytes moved into new buffer views.
    fn encode_images(&mut self) -> Vec<Value> {
        let images = self.scene.material_library().get_texture_library().images();
        let mut out = Vec::with_capacity(images.len());
        for image in images {
            let mut definition = image.definition().clone();
            if let Some(data) = image.get_encoded_data() {
                let view = self.push_buffer_view(data, None, None);
                if let Value::Object(map) = &mut definition {
                    map.insert("bufferView".to_string(), json!(view));
                }
            }
            out.push(definition);
        }
        out
    }

    fn use_extension(&mut self, name: &str) {
        if !self.extensions_used.iter().any(|e| e == name) {
            self.extensions_used.push(name.to_string());
        }
    }
}

fn encode_transform(trs: &TrsMatrix, out: &mut Map<String, Value>) {
    if let Some(matrix) = trs.matrix() {
        if !matrix.is_identity() {
            out.insert("matrix".to_string(), json!(matrix.to_column_major()));
        }
        return;
    }
    if let Some(t) = trs.translation() {
        out.insert("translation".to_string(), json!([t.x, t.y, t.z]));
    }
    if let Some(r) = trs.rotation() {
        out.insert("rotation".to_string(), json!([r.x, r.y, r.z, r.w]));
    }
    if let Some(s) = trs.scale() {
        out.insert("scale".to_string(), json!([s.x, s.y, s.z]));
    }
}

fn accessor_type(num_components: usize) -> Option<&'static str> {
    match num_components {
        1 => Some("SCALAR"),
        2 => Some("VEC2"),
        3 => Some("VEC3"),
        4 => Some("VEC4"),
        16 => Some("MAT4"),
        _ => None,
    }
}

fn insert_array(json: &mut Map<String, Value>, key: &str, values: Vec<Value>) {
    if !values.is_empty() {
        json.insert(key.to_string(), Value::Array(values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{builder::GeometryBuilder, Topology};
    use crate::core::material::Material;
    use crate::core::scene::{Drawable, Matrix4d, Vector3d};

    fn scene_with_two_instances(second_visible: bool) -> Scene {
        let mut scene = Scene::new();
        scene.material_library_mut().add_material(Material::new(json!({"name": "grey"})));
        let geometry = GeometryBuilder::new(Topology::Triangles)
            .add_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .build()
            .unwrap();
        let geometry = scene.add_geometry(geometry);

        let root = scene.add_node(SceneNode::new(NodeKind::Group));
        scene.add_root_node_index(root);
        for (i, visible) in [true, second_visible].into_iter().enumerate() {
            let mut node = SceneNode::new(NodeKind::Mesh(Drawable::new(geometry, Some(0))));
            node.set_trs_matrix(TrsMatrix::from_matrix(Matrix4d::from_translation(Vector3d::new(i as f64, 0.0, 0.0))));
            node.set_visible(visible);
            let node = scene.add_node(node);
            scene.add_child(root, node).unwrap();
        }
        scene
    }

    #[test]
    fn shared_geometry_is_written_once() {
        let asset = GltfEncoder::new().encode_scene_to_asset(&scene_with_two_instances(true)).unwrap();
        assert_eq!(asset.json["meshes"].as_array().unwrap().len(), 1);
        assert_eq!(asset.json["accessors"].as_array().unwrap().len(), 1);
        assert_eq!(asset.json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(asset.json["accessors"][0]["max"], json!([1.0, 1.0, 0.0]));
        assert_eq!(asset.binary.len(), 36);
    }

    #[test]
    fn hidden_nodes_are_skipped_only_when_requested() {
        let scene = scene_with_two_instances(false);
        let asset = GltfEncoder::new().encode_scene_to_asset(&scene).unwrap();
        assert_eq!(asset.json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(asset.json["nodes"][0]["children"], json!([1]));

        let options = EncodeOptions { only_visible: false, ..Default::default() };
        let asset = GltfEncoder::with_options(options).encode_scene_to_asset(&scene).unwrap();
        assert_eq!(asset.json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(asset.json["nodes"][2]["extensions"]["KHR_node_visibility"]["visible"], json!(false));
        assert_eq!(asset.json["extensionsUsed"], json!(["KHR_node_visibility"]));
    }

    #[test]
    fn glb_chunks_are_aligned() {
        let glb = GltfEncoder::new().encode_scene_to_glb(&scene_with_two_instances(true)).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        let json_len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        assert_eq!(json_len % 4, 0);
        assert_eq!(&glb[20 + json_len + 4..20 + json_len + 8], b"BIN\0");
    }

    #[test]
    fn encode_options_default_to_embedded_readable_visible() {
        let options: EncodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EncodeOptions::default());
        assert!(options.only_visible);
        let options: EncodeOptions = serde_json::from_str(r#"{"buffer_output": "separate"}"#).unwrap();
        assert_eq!(options.buffer_output, BufferOutput::Separate);
    }
}
