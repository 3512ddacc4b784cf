// lib.rs

/// Contains the scene graph, geometry, attribute and material types shared by
/// every other module.
pub mod core;

/// Contains the mesh/line/vertex statistics used before and after merging.
pub mod analyze;

/// Defines the merge engine that reduces the number of draw calls of a scene.
pub mod merge;

/// Contains the interface between `Scene` objects and glTF files.
pub mod io;

/// Defines the per-file and batch driver.
pub mod optimizer;


/// Contains the most commonly used types and functions.
pub mod prelude {
    pub use crate::core::attribute::{Attribute, AttributeLayout, ComponentDataType};
    pub use crate::core::geometry::{Geometry, Topology, builder::GeometryBuilder};
    pub use crate::core::material::{Material, MaterialLibrary};
    pub use crate::core::scene::{Drawable, Matrix4d, NodeKind, Scene, SceneNode, TrsMatrix, Vector3d, Quaterniond};
    pub use crate::analyze::{analyze, analyze_with_options, reduction_label, AnalyzeOptions, SceneStats};
    pub use crate::merge::{self, merge, IndexWidth, MergeOptions};
    pub use crate::io::gltf::encode::{BufferOutput, EncodeOptions, JsonOutputMode};
    pub use crate::io::progress::{LoadProgress, LogProgress, NoProgress};
    pub use crate::optimizer::{GltfOptimizer, OptimizerConfig};
}
