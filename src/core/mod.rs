pub mod attribute;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod texture;
