use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use wgpu::*;

use crate::depth::DEPTH_FORMAT;
use crate::model::{MaterialUniform, Vertex};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// One entry of the per-draw dynamic uniform buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

pub struct Layouts {
    pub camera_bgl: BindGroupLayout,
    /// Bound with a dynamic offset per draw.
    pub model_bgl: BindGroupLayout,
    pub material_bgl: BindGroupLayout,
}

fn uniform_entry(visibility: ShaderStages, dynamic: bool, size: usize) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

pub fn create_bind_group_layouts(device: &Device) -> Layouts {
    let camera_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bgl"),
        entries: &[uniform_entry(
            ShaderStages::VERTEX,
            false,
            size_of::<CameraUniform>(),
        )],
    });
    let model_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("model_bgl"),
        entries: &[uniform_entry(
            ShaderStages::VERTEX,
            true,
            size_of::<DrawUniform>(),
        )],
    });
    let material_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("material_bgl"),
        entries: &[uniform_entry(
            ShaderStages::FRAGMENT,
            false,
            size_of::<MaterialUniform>(),
        )],
    });

    Layouts {
        camera_bgl,
        model_bgl,
        material_bgl,
    }
}

pub fn create_pipeline(
    device: &Device,
    surface_format: TextureFormat,
    layouts: &Layouts,
) -> RenderPipeline {
    let shader = device.create_shader_module(include_wgsl!("shader.wgsl"));

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[&layouts.camera_bgl, &layouts.model_bgl, &layouts.material_bgl],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: PipelineCompilationOptions::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: PipelineCompilationOptions::default(),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }),
        // Reflections and negative scales flip winding, so nothing is culled.
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
