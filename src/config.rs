use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};

use diorama_anim::builtin_sequences;
use diorama_camera::CameraConfig;
use diorama_gltf::{PRIMITIVE_CUBE, PRIMITIVE_SPHERE};
use diorama_stage::{EditRates, KeyBindings};

pub const CONFIG_FILE: &str = "diorama.toml";
pub const CONFIG_ENV: &str = "DIORAMA_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fps: u64,
    pub max_frame_dt: f32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Diorama".into(),
            width: 800,
            height: 600,
            fps: 120,
            max_frame_dt: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Relative model paths resolve against this directory.
    pub root: PathBuf,
    /// Catalog id to source: a `.gltf`/`.glb` path or a `primitive:*` mesh.
    /// Entries in a config file are layered over the built-in table.
    #[serde(deserialize_with = "merge_over_default_models")]
    pub models: BTreeMap<String, String>,
    /// Ids created by the create keys, in key order.
    pub kinds: Vec<String>,
}

fn default_models() -> BTreeMap<String, String> {
    [
        ("rock", PRIMITIVE_CUBE),
        ("planet", PRIMITIVE_SPHERE),
        ("cyborg", PRIMITIVE_CUBE),
        ("nanosuit", PRIMITIVE_CUBE),
        ("doggo", PRIMITIVE_SPHERE),
    ]
    .into_iter()
    .map(|(id, src)| (id.to_string(), src.to_string()))
    .collect()
}

fn merge_over_default_models<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut models = default_models();
    models.extend(BTreeMap::<String, String>::deserialize(deserializer)?);
    Ok(models)
}

impl AssetsSection {
    /// Whether the catalog has something to load for `id`: a configured
    /// source, or an id that names a primitive or glTF file itself.
    pub fn resolves(&self, id: &str) -> bool {
        self.models.contains_key(id)
            || id == PRIMITIVE_CUBE
            || id == PRIMITIVE_SPHERE
            || Path::new(id)
                .extension()
                .is_some_and(|ext| ext == "gltf" || ext == "glb")
    }
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            models: default_models(),
            kinds: ["rock", "planet", "cyborg", "nanosuit"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DioramaConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub window: WindowSection,
    pub camera: CameraConfig,
    pub edit: EditRates,
    pub assets: AssetsSection,
    pub bindings: KeyBindings,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            window: WindowSection::default(),
            camera: CameraConfig::default(),
            edit: EditRates::default(),
            assets: AssetsSection::default(),
            bindings: KeyBindings::default(),
        }
    }
}

impl DioramaConfig {
    /// `$DIORAMA_CONFIG`, or `diorama.toml` in the working directory.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.fps == 0 {
            bail!("window.fps must be positive");
        }
        if self.window.max_frame_dt.is_nan() || self.window.max_frame_dt <= 0.0 {
            bail!("window.max_frame_dt must be positive");
        }
        if self.edit.mask_magnitude.is_nan() || self.edit.mask_magnitude <= 0.0 {
            bail!("edit.mask_magnitude must be positive");
        }
        if self.assets.kinds.len() > self.bindings.create.len() {
            bail!(
                "{} model kinds but only {} create bindings",
                self.assets.kinds.len(),
                self.bindings.create.len()
            );
        }
        if let Some(id) = self.assets.kinds.iter().find(|id| !self.assets.resolves(id)) {
            bail!("model kind '{id}' has no entry in assets.models");
        }
        for sequence in builtin_sequences() {
            if let Some(id) = sequence.assets.iter().find(|id| !self.assets.resolves(id)) {
                bail!(
                    "sequence '{}' needs asset '{id}', which has no entry in assets.models",
                    sequence.name
                );
            }
        }
        let conflicts = self.bindings.conflicts();
        if !conflicts.is_empty() {
            let listed: Vec<String> = conflicts
                .iter()
                .map(|(key, first, second)| format!("{key:?} ({first:?} and {second:?})"))
                .collect();
            bail!("keys bound to more than one control: {}", listed.join(", "));
        }
        Ok(())
    }

    /// Write the defaults to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        let text = toml::to_string_pretty(&Self::default()).context("serializing defaults")?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_gltf::MeshCatalog;
    use diorama_scene::{AssetCatalog, Axis, Key, SignedAxis};

    #[test]
    fn defaults_survive_toml() {
        let text = toml::to_string_pretty(&DioramaConfig::default()).unwrap();
        assert_eq!(DioramaConfig::parse(&text).unwrap(), DioramaConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DioramaConfig::parse(
            r#"
            log_filter = "debug"

            [edit]
            translate = 4.0

            [assets.models]
            rock = "models/rock.glb"

            [bindings.rotate]
            "+y" = "L"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.edit.translate, 4.0);
        assert_eq!(config.edit.rotate, 120.0);
        assert_eq!(config.assets.models.len(), 5);
        assert_eq!(config.assets.models["rock"], "models/rock.glb");
        assert_eq!(config.assets.models["planet"], PRIMITIVE_SPHERE);
        assert_eq!(config.assets.kinds.len(), 4);
        assert_eq!(config.bindings.rotate[&SignedAxis::pos(Axis::Y)], Key::L);
        assert_eq!(config.window, WindowSection::default());
    }

    #[test]
    fn malformed_axis_token_fails() {
        let err = DioramaConfig::parse(
            r#"
            [bindings.translate]
            "up" = "Numpad8"
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid axis token"), "{err:#}");
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(DioramaConfig::parse("[window]\nfps = 0\n").is_err());
    }

    #[test]
    fn more_kinds_than_create_keys_is_rejected() {
        let err = DioramaConfig::parse(
            r#"
            [assets]
            kinds = ["a", "b", "c", "d", "e"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("create bindings"), "{err}");
    }

    #[test]
    fn overriding_one_model_keeps_sequence_assets_loadable() {
        let config = DioramaConfig::parse(
            r#"
            [assets.models]
            rock = "primitive:cube"
            "#,
        )
        .unwrap();
        let mut catalog = MeshCatalog::new(&config.assets.root, config.assets.models.clone());

        for sequence in builtin_sequences() {
            for id in &sequence.assets {
                assert!(catalog.load(id).is_ok(), "{id} no longer resolves");
            }
        }
        for id in &config.assets.kinds {
            assert!(catalog.load(id).is_ok(), "{id} no longer resolves");
        }
    }

    #[test]
    fn kind_without_source_is_rejected() {
        let err = DioramaConfig::parse(
            r#"
            [assets]
            kinds = ["rock", "ghost"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'ghost'"), "{err}");

        let config = DioramaConfig::parse(
            r#"
            [assets]
            kinds = ["rock", "models/ghost.glb", "primitive:sphere"]
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.kinds.len(), 3);
    }

    #[test]
    fn sequence_asset_without_source_is_rejected() {
        let mut config = DioramaConfig::default();
        config.assets.models.remove("doggo");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'doggo'"), "{err}");
    }

    #[test]
    fn key_bound_twice_is_rejected() {
        let err = DioramaConfig::parse(
            r#"
            [bindings]
            delete = "P"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("P (Delete and Project)"), "{err}");

        let swapped = DioramaConfig::parse(
            r#"
            [bindings]
            delete = "P"
            project = "Delete"
            "#,
        );
        assert!(swapped.is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("diorama-missing-config.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(DioramaConfig::load(&path).unwrap(), DioramaConfig::default());
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let path = std::env::temp_dir().join(format!("diorama-{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);
        DioramaConfig::write_default(&path).unwrap();
        assert_eq!(DioramaConfig::load(&path).unwrap(), DioramaConfig::default());
        assert!(DioramaConfig::write_default(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
