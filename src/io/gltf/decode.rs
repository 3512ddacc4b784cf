use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use gltf::mesh::Mode;
use serde_json::Value;

use crate::core::attribute::{self, Attribute};
use crate::core::geometry::{self, Geometry, MorphTarget, Topology};
use crate::core::material::Material;
use crate::core::scene::{
    self, Drawable, GeometryIdx, Matrix4d, NodeKind, Quaterniond, Scene, SceneNode, SceneNodeIdx, Skin, TrsMatrix, Vector3d,
};
use crate::core::texture::Image;
use crate::io::progress::LoadProgress;
use super::accessor::{self, AccessorData};

/// Extensions whose payloads this decoder cannot read.
const COMPRESSION_EXTENSIONS: [&str; 2] = ["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Input file not found: {0}")]
    InputNotFound(String),
    #[error("Failed to parse glTF: {0}")]
    ParseError(String),
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Attribute Error: {0}")]
    AttributeError(#[from] attribute::Err),
    #[error("Geometry Error: {0}")]
    GeometryError(#[from] geometry::Err),
    #[error("Scene Error: {0}")]
    SceneError(#[from] scene::Err),
}

/// Decodes glTF 2.0 files (`.gltf` or `.glb`) into a [`Scene`].
///
/// Buffers may live in the GLB binary chunk, in base64 `data:` URIs, or in
/// external files next to the input. Strip, loop and fan primitives are
/// converted to lists. Mesh primitives shared between nodes decode to one
/// shared geometry.
#[derive(Debug, Clone, Default)]
pub struct GltfDecoder {}

impl GltfDecoder {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn decode_from_file_to_scene(&self, path: &Path, progress: &dyn LoadProgress) -> Result<Scene, Err> {
        let label = path.display().to_string();
        progress.on_start(&label);
        let result = self.load_file(path, &label, progress).await;
        match &result {
            Ok(_) => progress.on_complete(&label),
            Err(e) => progress.on_error(&label, e),
        }
        result
    }

    /// Decodes an in-memory `.gltf` or `.glb` file. External buffers are
    /// resolved against `base_dir`; without one only embedded buffers work.
    pub async fn decode_from_buffer_to_scene(
        &self,
        bytes: &[u8],
        base_dir: Option<&Path>,
        progress: &dyn LoadProgress,
    ) -> Result<Scene, Err> {
        let (document, json, bin) = Self::parse(bytes)?;
        let buffers = Self::load_buffers(&document, bin, base_dir, "<memory>", progress).await?;
        DocumentDecoder::new(&document, &json, &buffers).decode()
    }

    async fn load_file(&self, path: &Path, label: &str, progress: &dyn LoadProgress) -> Result<Scene, Err> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Err::InputNotFound(label.to_string())),
            Err(e) => return Err(Err::IoError(e)),
        };
        let (document, json, bin) = Self::parse(&bytes)?;
        let buffers = Self::load_buffers(&document, bin, path.parent(), label, progress).await?;
        let scene = DocumentDecoder::new(&document, &json, &buffers).decode()?;
        log::debug!("{}: {} nodes, {} geometries", label, scene.num_nodes(), scene.num_geometries());
        Ok(scene)
    }

    /// Splits a GLB container and parses the JSON chunk. Documents that fail
    /// glTF validation are rejected, so every index the decoder follows later
    /// is in range.
    fn parse(bytes: &[u8]) -> Result<(gltf::Document, Value, Option<Vec<u8>>), Err> {
        let (json_bytes, bin): (Cow<[u8]>, Option<Vec<u8>>) = if bytes.starts_with(b"glTF") {
            let glb = gltf::Glb::from_slice(bytes)
                .map_err(|e| Err::ParseError(format!("Failed to parse GLB: {}", e)))?;
            (Cow::Owned(glb.json.into_owned()), glb.bin.map(Cow::into_owned))
        } else {
            (Cow::Borrowed(bytes), None)
        };

        let json: Value = serde_json::from_slice(&json_bytes)
            .map_err(|e| Err::ParseError(e.to_string()))?;
        let used = string_list(&json["extensionsUsed"]);
        if let Some(ext) = COMPRESSION_EXTENSIONS.iter().find(|ext| used.iter().any(|u| u == *ext)) {
            return Err(Err::ParseError(format!("{} compressed input is not supported", ext)));
        }
        check_position_accessors(&json)?;

        let document = gltf::Gltf::from_slice(&json_bytes)
            .map_err(|e| Err::ParseError(format!("Invalid glTF: {}", e)))?
            .document;
        Ok((document, json, bin))
    }

    async fn load_buffers(
        document: &gltf::Document,
        mut bin: Option<Vec<u8>>,
        base_dir: Option<&Path>,
        label: &str,
        progress: &dyn LoadProgress,
    ) -> Result<Vec<Vec<u8>>, Err> {
        let total = document.buffers().len() + 1;
        progress.on_progress(label, 1, total);

        let mut out = Vec::with_capacity(total - 1);
        for (i, buffer) in document.buffers().enumerate() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => bin.take()
                    .ok_or_else(|| Err::InvalidInput("Buffer refers to a missing GLB binary chunk".to_string()))?,
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
                gltf::buffer::Source::Uri(uri) => {
                    let dir = base_dir.ok_or_else(|| {
                        Err::InvalidInput(format!("External buffer {} cannot be resolved without a base directory", uri))
                    })?;
                    let path = dir.join(uri);
                    match tokio::fs::read(&path).await {
                        Ok(data) => data,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            return Err(Err::InputNotFound(path.display().to_string()))
                        }
                        Err(e) => return Err(Err::IoError(e)),
                    }
                }
            };
            if data.len() < buffer.length() {
                return Err(Err::InvalidInput(format!(
                    "Buffer {} holds {} bytes but declares {}", i, data.len(), buffer.length()
                )));
            }
            out.push(data);
            progress.on_progress(label, i + 2, total);
        }
        Ok(out)
    }
}


/// Builds a [`Scene`] from a parsed document and its loaded buffers. The
/// typed document drives traversal and accessor reads; the raw JSON supplies
/// what the scene keeps as opaque definitions.
struct DocumentDecoder<'a> {
    document: &'a gltf::Document,
    json: &'a Value,
    buffers: &'a [Vec<u8>],
    // (mesh index, primitive index) to decoded geometry
    geometries: HashMap<(usize, usize), GeometryIdx>,
    scene: Scene,
}

impl<'a> DocumentDecoder<'a> {
    fn new(document: &'a gltf::Document, json: &'a Value, buffers: &'a [Vec<u8>]) -> Self {
        Self {
            document,
            json,
            buffers,
            geometries: HashMap::new(),
            scene: Scene::new(),
        }
    }

    fn decode(mut self) -> Result<Scene, Err> {
        self.copy_materials_to_scene();
        self.copy_textures_to_scene()?;
        for camera in array(&self.json["cameras"]) {
            self.scene.add_camera(camera.clone());
        }
        for light in array(&self.json["extensions"]["KHR_lights_punctual"]["lights"]) {
            self.scene.add_light(light.clone());
        }
        for ext in string_list(&self.json["extensionsUsed"]) {
            self.scene.add_extension_used(ext);
        }
        for ext in string_list(&self.json["extensionsRequired"]) {
            self.scene.add_extension_required(ext);
        }

        let node_map = self.decode_scene_nodes()?;
        self.decode_skins(&node_map)?;

        let gltf_scene = self.document.default_scene().or_else(|| self.document.scenes().next());
        match gltf_scene {
            Some(gltf_scene) => {
                self.scene.set_name(gltf_scene.name().map(str::to_string));
                for node in gltf_scene.nodes() {
                    self.scene.add_root_node_index(node_map[node.index()]);
                }
            }
            None => {
                // Without a scene every parentless node is a root.
                let roots = node_map.iter()
                    .copied()
                    .filter(|&idx| self.scene.get_node(idx).is_some_and(|n| n.parent().is_none()))
                    .collect::<Vec<_>>();
                for idx in roots {
                    self.scene.add_root_node_index(idx);
                }
            }
        }
        Ok(self.scene)
    }

    fn copy_materials_to_scene(&mut self) {
        let library = self.scene.material_library_mut();
        for material in array(&self.json["materials"]) {
            library.add_material(Material::new(material.clone()));
        }
    }

    fn copy_textures_to_scene(&mut self) -> Result<(), Err> {
        let mut images = Vec::new();
        for (i, image) in array(&self.json["images"]).iter().enumerate() {
            let decoded = match image.get("bufferView").and_then(Value::as_u64) {
                Some(view_index) => {
                    let view = self.document.views().nth(view_index as usize)
                        .ok_or_else(|| Err::InvalidInput(format!("Image {} refers to missing buffer view {}", i, view_index)))?;
                    let bytes = accessor::view_bytes(&view, self.buffers)?;
                    let mime_type = image.get("mimeType").and_then(Value::as_str).unwrap_or("application/octet-stream");
                    Image::with_encoded_data(image.clone(), mime_type, bytes.to_vec())
                }
                None => Image::from_definition(image.clone()),
            };
            images.push(decoded);
        }

        let textures = self.scene.material_library_mut().get_texture_library_mut();
        for texture in array(&self.json["textures"]) {
            textures.push_texture(texture.clone());
        }
        for sampler in array(&self.json["samplers"]) {
            textures.push_sampler(sampler.clone());
        }
        for image in images {
            textures.push_image(image);
        }
        Ok(())
    }

    /// Adds one scene node per glTF node, plus child nodes when a glTF node
    /// carries more than one payload (several primitives, a camera, a light).
    /// Returns the scene node of every glTF node.
    fn decode_scene_nodes(&mut self) -> Result<Vec<SceneNodeIdx>, Err> {
        let mut node_map = Vec::with_capacity(self.document.nodes().len());
        for node in self.document.nodes() {
            let payloads = self.node_payloads(&node)?;
            let node_json = &self.json["nodes"][node.index()];
            let visible = node_json["extensions"]["KHR_node_visibility"]["visible"].as_bool().unwrap_or(true);

            let mut scene_node = SceneNode::new(NodeKind::Group);
            scene_node.set_name(node.name().map(str::to_string));
            scene_node.set_trs_matrix(Self::get_node_transformation_matrix(&node));
            scene_node.set_visible(visible);

            if payloads.len() == 1 {
                let (_, kind) = payloads.into_iter().next().unwrap_or((None, NodeKind::Group));
                scene_node.set_kind(kind);
                node_map.push(self.scene.add_node(scene_node));
                continue;
            }
            let idx = self.scene.add_node(scene_node);
            for (name, kind) in payloads {
                let mut child = SceneNode::new(kind);
                child.set_name(name);
                let child = self.scene.add_node(child);
                self.scene.add_child(idx, child)?;
            }
            node_map.push(idx);
        }

        for node in self.document.nodes() {
            for child in node.children() {
                if let Err(e) = self.scene.add_child(node_map[node.index()], node_map[child.index()]) {
                    log::warn!("Ignoring child {} of node {}: {}", child.index(), node.index(), e);
                }
            }
        }
        Ok(node_map)
    }

    fn node_payloads(&mut self, node: &gltf::Node) -> Result<Vec<(Option<String>, NodeKind)>, Err> {
        let mut payloads = Vec::new();
        if let Some(mesh) = node.mesh() {
            let weights = node.weights().or_else(|| mesh.weights()).map(<[f32]>::to_vec);
            for primitive in mesh.primitives() {
                let geometry = self.decode_primitive(&mesh, &primitive)?;
                let topology = self.scene.get_geometry(geometry).map_or(Topology::Triangles, Geometry::topology);
                let drawable = Drawable {
                    geometry,
                    material: primitive.material().index(),
                    skin: node.skin().map(|s| s.index()),
                    weights: weights.clone(),
                };
                let kind = match topology {
                    Topology::Triangles => NodeKind::Mesh(drawable),
                    Topology::Lines => NodeKind::Line(drawable),
                    Topology::Points => NodeKind::Points(drawable),
                };
                payloads.push((mesh.name().map(str::to_string), kind));
            }
        }
        if let Some(camera) = node.camera() {
            payloads.push((camera.name().map(str::to_string), NodeKind::Camera(camera.index())));
        }
        let light = self.json["nodes"][node.index()]["extensions"]["KHR_lights_punctual"]["light"].as_u64();
        if let Some(light) = light {
            payloads.push((None, NodeKind::Light(light as usize)));
        }
        Ok(payloads)
    }

    fn decode_primitive(&mut self, mesh: &gltf::Mesh, primitive: &gltf::Primitive) -> Result<GeometryIdx, Err> {
        let key = (mesh.index(), primitive.index());
        if let Some(&idx) = self.geometries.get(&key) {
            return Ok(idx);
        }

        let primitive_json = &self.json["meshes"][mesh.index()]["primitives"][primitive.index()];
        let attributes = self.read_attribute_set(&primitive_json["attributes"])?;
        let morph_targets = array(&primitive_json["targets"]).iter()
            .map(|target| self.read_attribute_set(target).map(|attributes| MorphTarget { attributes }))
            .collect::<Result<Vec<_>, _>>()?;

        let indices = primitive.indices()
            .map(|a| accessor::read_indices(&a, self.buffers))
            .transpose()?;
        let vertex_count = attributes.iter()
            .find(|att| att.name() == attribute::POSITION)
            .map_or(0, Attribute::len);
        let (topology, indices) = to_list_topology(primitive.mode(), indices, vertex_count);

        let mut geometry = Geometry::from_parts(topology, attributes, indices);
        geometry.set_morph_targets(morph_targets);
        let idx = self.scene.add_geometry(geometry);
        self.geometries.insert(key, idx);
        Ok(idx)
    }

    /// Reads a JSON object mapping attribute names to accessor indices.
    fn read_attribute_set(&self, attributes: &Value) -> Result<Vec<Attribute>, Err> {
        let Some(map) = attributes.as_object() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(map.len());
        for (name, index) in map {
            let index = index.as_u64()
                .ok_or_else(|| Err::ParseError(format!("Attribute {} has no accessor index", name)))? as usize;
            let accessor = self.document.accessors().nth(index)
                .ok_or_else(|| Err::InvalidInput(format!("Attribute {} refers to missing accessor {}", name, index)))?;
            let AccessorData { layout, data, .. } = accessor::read_accessor(&accessor, self.buffers)?;
            out.push(Attribute::new(name.clone(), layout, data)?);
        }
        Ok(out)
    }

    fn decode_skins(&mut self, node_map: &[SceneNodeIdx]) -> Result<(), Err> {
        for skin in self.document.skins() {
            let inverse_bind_matrices = match skin.inverse_bind_matrices() {
                Some(accessor) => Some(
                    accessor::read_f32_rows::<16>(&accessor, self.buffers)?
                        .iter()
                        .map(Matrix4d::from_column_major_slice)
                        .collect(),
                ),
                None => None,
            };
            self.scene.add_skin(Skin {
                name: skin.name().map(str::to_string),
                joints: skin.joints().map(|j| node_map[j.index()]).collect(),
                inverse_bind_matrices,
                skeleton: skin.skeleton().map(|s| node_map[s.index()]),
            });
        }
        Ok(())
    }

    /// Extract node transformation matrix from glTF node
    fn get_node_transformation_matrix(node: &gltf::Node) -> TrsMatrix {
        let mut trsm = TrsMatrix::new();
        match node.transform() {
            gltf::scene::Transform::Matrix { matrix } => {
                trsm.set_matrix(Matrix4d::from_column_major(&matrix));
            }
            gltf::scene::Transform::Decomposed { translation, rotation, scale } => {
                if translation != [0.0; 3] {
                    trsm.set_translation(Vector3d::new(translation[0] as f64, translation[1] as f64, translation[2] as f64));
                }
                if rotation != [0.0, 0.0, 0.0, 1.0] {
                    // glTF stores quaternions as (x, y, z, w)
                    trsm.set_rotation(Quaterniond::new(
                        rotation[3] as f64,
                        rotation[0] as f64,
                        rotation[1] as f64,
                        rotation[2] as f64,
                    ));
                }
                if scale != [1.0; 3] {
                    trsm.set_scale(Vector3d::new(scale[0] as f64, scale[1] as f64, scale[2] as f64));
                }
            }
        }
        trsm
    }
}


/// Expands strip, loop and fan primitives into their list equivalents.
/// Non-indexed input gets sequential indices first.
pub(crate) fn to_list_topology(mode: Mode, indices: Option<Vec<u32>>, vertex_count: usize) -> (Topology, Option<Vec<u32>>) {
    let sequence = |indices: Option<Vec<u32>>| indices.unwrap_or_else(|| (0..vertex_count as u32).collect());
    match mode {
        Mode::Points => (Topology::Points, indices),
        Mode::Lines => (Topology::Lines, indices),
        Mode::Triangles => (Topology::Triangles, indices),
        Mode::LineStrip | Mode::LineLoop => {
            let seq = sequence(indices);
            let mut out = Vec::with_capacity(seq.len() * 2);
            for pair in seq.windows(2) {
                out.extend_from_slice(&[pair[0], pair[1]]);
            }
            if mode == Mode::LineLoop && seq.len() > 2 {
                out.extend_from_slice(&[seq[seq.len() - 1], seq[0]]);
            }
            (Topology::Lines, Some(out))
        }
        Mode::TriangleStrip => {
            let seq = sequence(indices);
            let mut out = Vec::with_capacity(seq.len().saturating_sub(2) * 3);
            for (i, w) in seq.windows(3).enumerate() {
                // every other triangle is wound the other way
                if i % 2 == 0 {
                    out.extend_from_slice(&[w[0], w[1], w[2]]);
                } else {
                    out.extend_from_slice(&[w[0], w[2], w[1]]);
                }
            }
            (Topology::Triangles, Some(out))
        }
        Mode::TriangleFan => {
            let seq = sequence(indices);
            let mut out = Vec::with_capacity(seq.len().saturating_sub(2) * 3);
            for pair in seq.get(1..).unwrap_or(&[]).windows(2) {
                out.extend_from_slice(&[pair[0], pair[1], seq[0]]);
            }
            (Topology::Triangles, Some(out))
        }
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, Err> {
    use base64::Engine;
    let (header, payload) = uri.split_once(',')
        .ok_or_else(|| Err::InvalidInput("Malformed data URI".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(Err::InvalidInput(format!("Unsupported data URI encoding: {}", header)));
    }
    base64::engine::general_purpose::STANDARD.decode(payload)
        .map_err(|_| Err::InvalidInput("Failed to decode base64 data URI".to_string()))
}

fn array(value: &Value) -> &[Value] {
    value.as_array().map_or(&[], Vec::as_slice)
}

/// `gltf` indexes the POSITION accessor of every primitive while validating,
/// so an out-of-range index has to be caught before validation runs.
fn check_position_accessors(json: &Value) -> Result<(), Err> {
    let num_accessors = json["accessors"].as_array().map_or(0, Vec::len);
    let meshes = json["meshes"].as_array().map(Vec::as_slice).unwrap_or_default();
    for (m, mesh) in meshes.iter().enumerate() {
        let primitives = mesh["primitives"].as_array().map(Vec::as_slice).unwrap_or_default();
        for (p, primitive) in primitives.iter().enumerate() {
            let position = &primitive["attributes"]["POSITION"];
            if position.is_null() {
                continue;
            }
            match position.as_u64() {
                Some(i) if (i as usize) < num_accessors => {}
                _ => {
                    return Err(Err::ParseError(format!(
                        "Mesh {} primitive {} refers to missing POSITION accessor {}", m, p, position
                    )))
                }
            }
        }
    }
    Ok(())
}

fn string_list(value: &Value) -> Vec<String> {
    array(value).iter().filter_map(Value::as_str).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use serde_json::json;
    use crate::io::progress::NoProgress;

    fn triangle_buffer() -> String {
        let mut bytes = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2, 0] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        format!("data:application/octet-stream;base64,{}", base64::engine::general_purpose::STANDARD.encode(&bytes))
    }

    fn document(nodes: Value, extensions_used: Value) -> Vec<u8> {
        json!({
            "asset": {"version": "2.0"},
            "extensionsUsed": extensions_used,
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": nodes,
            "materials": [{"name": "red", "pbrMetallicRoughness": {"baseColorFactor": [1, 0, 0, 1]}}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 0}]}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "buffers": [{"byteLength": 44, "uri": triangle_buffer()}]
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn decodes_embedded_triangle_with_instancing() {
        let nodes = json!([
            {"children": [1, 2], "translation": [1, 2, 3]},
            {"mesh": 0},
            {"mesh": 0, "extensions": {"KHR_node_visibility": {"visible": false}}}
        ]);
        let bytes = document(nodes, json!(["KHR_node_visibility"]));
        let scene = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await.unwrap();

        assert_eq!(scene.num_nodes(), 3);
        assert_eq!(scene.num_geometries(), 1);
        assert_eq!(scene.root_node_indices(), &[0]);
        assert_eq!(scene.material_library().num_materials(), 1);

        let geometry = scene.get_geometry(0).unwrap();
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.indices().unwrap(), &[0, 1, 2]);
        assert!(!scene.get_node(2).unwrap().is_visible());
        assert!(matches!(scene.get_node(1).unwrap().kind(), NodeKind::Mesh(d) if d.material == Some(0)));
        assert_eq!(scene.pre_order()[1].world.data[1][3], 2.0);
    }

    #[tokio::test]
    async fn rejects_draco_compressed_input() {
        let bytes = document(json!([{"mesh": 0}]), json!(["KHR_draco_mesh_compression"]));
        let result = GltfDecoder::new().decode_from_buffer_to_scene(&bytes, None, &NoProgress).await;
        assert!(matches!(result, Err(Err::ParseError(_))));
    }

    #[tokio::test]
    async fn dangling_child_index_is_a_parse_error() {
        let bytes = br#"{"asset":{"version":"2.0"},"nodes":[{"children":[5]}],"scenes":[{"nodes":[0]}],"scene":0}"#;
        let result = GltfDecoder::new().decode_from_buffer_to_scene(bytes, None, &NoProgress).await;
        assert!(matches!(result, Err(Err::ParseError(_))));
    }

    #[tokio::test]
    async fn dangling_position_accessor_is_a_parse_error() {
        let bytes = json!({
            "asset": {"version": "2.0"},
            "nodes": [{"mesh": 0}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 3}}]}]
        })
        .to_string();
        let result = GltfDecoder::new().decode_from_buffer_to_scene(bytes.as_bytes(), None, &NoProgress).await;
        assert!(matches!(result, Err(Err::ParseError(_))));
    }

    #[tokio::test]
    async fn accessor_count_beyond_its_view_is_rejected() {
        let buffer = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode([0u8; 12])
        );
        let bytes = json!({
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{
                "bufferView": 0, "componentType": 5126, "count": 1_000_000_000_000u64, "type": "VEC3",
                "min": [0, 0, 0], "max": [0, 0, 0]
            }],
            "bufferViews": [{"buffer": 0, "byteLength": 12}],
            "buffers": [{"byteLength": 12, "uri": buffer}]
        })
        .to_string();
        let result = GltfDecoder::new().decode_from_buffer_to_scene(bytes.as_bytes(), None, &NoProgress).await;
        assert!(matches!(result, Err(Err::InvalidInput(_))));
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_not_found() {
        let path = std::env::temp_dir().join("gltf-merge-does-not-exist.gltf");
        let result = GltfDecoder::new().decode_from_file_to_scene(&path, &NoProgress).await;
        assert!(matches!(result, Err(Err::InputNotFound(_))));
    }

    #[test]
    fn strips_and_fans_become_lists() {
        let (topology, indices) = to_list_topology(Mode::TriangleStrip, None, 5);
        assert_eq!(topology, Topology::Triangles);
        assert_eq!(indices.unwrap(), vec![0, 1, 2, 1, 3, 2, 2, 3, 4]);

        let (_, indices) = to_list_topology(Mode::TriangleFan, Some(vec![4, 5, 6, 7]), 8);
        assert_eq!(indices.unwrap(), vec![5, 6, 4, 6, 7, 4]);

        let (topology, indices) = to_list_topology(Mode::LineLoop, None, 3);
        assert_eq!(topology, Topology::Lines);
        assert_eq!(indices.unwrap(), vec![0, 1, 1, 2, 2, 0]);
    }
}
