//! Asset catalog backed by glTF files and built-in primitive meshes.

mod catalog;
mod loader;
pub mod primitives;

pub use catalog::{MeshCatalog, PRIMITIVE_CUBE, PRIMITIVE_SPHERE};
pub use loader::load_gltf_meshes;
