use bytemuck::{Pod, Zeroable};
use diorama_scene::ModelRef;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// CPU-side triangle mesh with a flat base color.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

/// Where the renderer fetches mesh data for models it has not uploaded yet.
pub trait MeshSource {
    fn meshes(&self, model: ModelRef) -> Option<&[MeshData]>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct MaterialUniform {
    pub base_color: [f32; 4],
}

pub struct GpuMesh {
    pub vbuf: Buffer,
    pub ibuf: Buffer,
    pub index_count: u32,
    pub material_bg: BindGroup,
    _material_buf: Buffer,
}

impl GpuMesh {
    pub fn upload(device: &Device, material_bgl: &BindGroupLayout, mesh: &MeshData) -> Self {
        let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_material"),
            contents: bytemuck::bytes_of(&MaterialUniform {
                base_color: mesh.base_color,
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let material_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_material_bg"),
            layout: material_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buf.as_entire_binding(),
            }],
        });

        Self {
            vbuf,
            ibuf,
            index_count: mesh.indices.len() as u32,
            material_bg,
            _material_buf: material_buf,
        }
    }
}
