use std::path::Path;

use anyhow::{Context, Result, anyhow};
use diorama_3d::{MeshData, Vertex};
use glam::{Mat4, Vec3};

const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Load every triangle primitive of the default scene, with node transforms
/// baked into the vertices.
pub fn load_gltf_meshes(path: &Path) -> Result<Vec<MeshData>> {
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("importing {}", path.display()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| anyhow!("{} has no scene", path.display()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
    }
    if meshes.is_empty() {
        return Err(anyhow!("{} contains no triangle meshes", path.display()));
    }
    Ok(meshes)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!(
                    "skipping {:?} primitive in mesh {:?}",
                    primitive.mode(),
                    mesh.name()
                );
                continue;
            }
            out.push(read_primitive(&primitive, world, buffers).with_context(|| {
                format!("mesh {}", mesh.name().unwrap_or("<unnamed>"))
            })?);
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| anyhow!("primitive has no positions"))?
        .collect();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vec![[0.0; 3]; positions.len()],
    };
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normal_xform = if world.determinant().abs() > f32::EPSILON {
        world.inverse().transpose()
    } else {
        world
    };
    let vertices = positions
        .iter()
        .zip(&normals)
        .map(|(p, n)| Vertex {
            position: world.transform_point3(Vec3::from(*p)).to_array(),
            normal: normal_xform
                .transform_vector3(Vec3::from(*n))
                .normalize_or_zero()
                .to_array(),
        })
        .collect();

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(MeshData {
        vertices,
        indices,
        base_color: if base_color == [1.0; 4] {
            DEFAULT_COLOR
        } else {
            base_color
        },
    })
}
