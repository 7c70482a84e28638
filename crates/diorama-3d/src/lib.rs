pub mod depth;
pub mod model;
pub mod pipeline;
pub mod render;

pub use depth::create_depth;
pub use model::{GpuMesh, MeshData, MeshSource, Vertex};
pub use pipeline::{Layouts, create_bind_group_layouts, create_pipeline};
pub use render::Renderer3D;
