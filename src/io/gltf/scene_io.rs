use std::path::Path;

use crate::core::scene::Scene;
use crate::io::gltf::decode::GltfDecoder;
use crate::io::gltf::encode::{EncodeOptions, GltfEncoder};
use crate::io::progress::LoadProgress;

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Error: {0}")]
    Error(String),
    #[error("GLTF Encoder Error: {0}")]
    GltfEncoderError(#[from] crate::io::gltf::encode::Err),
    #[error("GLTF Decoder Error: {0}")]
    GltfDecoderError(#[from] crate::io::gltf::decode::Err),
}

/// Supported scene file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFileFormat {
    Unknown,
    Gltf,
    Glb,
}

/// Reads a `.gltf` or `.glb` scene.
pub async fn read_scene_from_file(path: &Path, progress: &dyn LoadProgress) -> Result<Scene, Err> {
    match get_scene_file_format(path) {
        SceneFileFormat::Gltf | SceneFileFormat::Glb => {
            let decoder = GltfDecoder::new();
            Ok(decoder.decode_from_file_to_scene(path, progress).await?)
        }
        SceneFileFormat::Unknown => {
            Err(Err::Error(format!("Unknown input file format: {}", path.display())))
        }
    }
}

/// Writes a scene as `.gltf` or `.glb`, chosen by the extension of `path`.
pub async fn write_scene_to_file(path: &Path, scene: &Scene, options: &EncodeOptions) -> Result<(), Err> {
    match get_scene_file_format(path) {
        SceneFileFormat::Gltf | SceneFileFormat::Glb => {
            let encoder = GltfEncoder::with_options(options.clone());
            encoder.encode_scene_to_file(scene, path).await?;
            Ok(())
        }
        SceneFileFormat::Unknown => {
            Err(Err::Error(format!("Unknown output file format: {}", path.display())))
        }
    }
}

/// Determines the scene file format based on the file extension, ignoring case.
pub fn get_scene_file_format(path: &Path) -> SceneFileFormat {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return SceneFileFormat::Unknown;
    };
    match extension.to_ascii_lowercase().as_str() {
        "gltf" => SceneFileFormat::Gltf,
        "glb" => SceneFileFormat::Glb,
        _ => SceneFileFormat::Unknown,
    }
}
