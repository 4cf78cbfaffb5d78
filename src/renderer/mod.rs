//! WebGPU rendering module
//!
//! `scene` builds a triangle list from a read-only game snapshot; `pipeline`
//! uploads and draws it.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{FrameInfo, build_scene};
pub use vertex::Vertex;
