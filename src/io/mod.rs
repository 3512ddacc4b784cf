/// glTF 2.0 reading and writing.
pub mod gltf;

pub mod progress;
