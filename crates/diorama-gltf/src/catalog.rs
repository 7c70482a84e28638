use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use diorama_3d::{MeshData, MeshSource};
use diorama_scene::{AssetCatalog, ModelRef, Result, SceneError};
use log::{info, warn};

use crate::loader::load_gltf_meshes;
use crate::primitives;

pub const PRIMITIVE_CUBE: &str = "primitive:cube";
pub const PRIMITIVE_SPHERE: &str = "primitive:sphere";

const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;

/// Resolves catalog ids to CPU meshes and hands out stable [`ModelRef`]s.
///
/// An id maps to a source: a `.gltf`/`.glb` path (relative paths resolve
/// against the catalog root) or one of the built-in primitives. Ids without
/// a configured source are tried as sources themselves. Each id is loaded at
/// most once.
pub struct MeshCatalog {
    root: PathBuf,
    sources: BTreeMap<String, String>,
    ids: HashMap<String, ModelRef>,
    models: Vec<Vec<MeshData>>,
}

impl MeshCatalog {
    pub fn new(root: impl Into<PathBuf>, sources: BTreeMap<String, String>) -> Self {
        Self {
            root: root.into(),
            sources,
            ids: HashMap::new(),
            models: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn resolve(&self, source: &str) -> anyhow::Result<Vec<MeshData>> {
        match source {
            PRIMITIVE_CUBE => Ok(vec![primitives::cube()]),
            PRIMITIVE_SPHERE => Ok(vec![primitives::sphere(SPHERE_SEGMENTS, SPHERE_RINGS)]),
            other if other.starts_with("primitive:") => {
                Err(anyhow::anyhow!("unknown primitive '{other}'"))
            }
            path => {
                let path = Path::new(path);
                let full = if path.is_relative() {
                    self.root.join(path)
                } else {
                    path.to_path_buf()
                };
                load_gltf_meshes(&full)
            }
        }
    }
}

impl AssetCatalog for MeshCatalog {
    fn load(&mut self, id: &str) -> Result<ModelRef> {
        if let Some(&model) = self.ids.get(id) {
            return Ok(model);
        }

        let source = self.sources.get(id).map_or(id, String::as_str);
        let meshes = self.resolve(source).map_err(|err| {
            warn!("asset '{id}' failed to load from '{source}': {err:#}");
            SceneError::AssetLoad {
                id: id.to_string(),
                reason: format!("{err:#}"),
            }
        })?;

        let model = ModelRef(self.models.len());
        info!("loaded '{id}' from '{source}' ({} mesh(es))", meshes.len());
        self.models.push(meshes);
        self.ids.insert(id.to_string(), model);
        Ok(model)
    }
}

impl MeshSource for MeshCatalog {
    fn meshes(&self, model: ModelRef) -> Option<&[MeshData]> {
        self.models.get(model.index()).map(Vec::as_slice)
    }
}
