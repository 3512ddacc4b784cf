pub(crate) mod accessor;
pub mod decode;
pub mod encode;
pub mod scene_io;
