use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;

use diorama_scene::{ModelRef, Renderer};
use glam::Mat4;
use log::{debug, warn};
use wgpu::util::DeviceExt;
use wgpu::*;

use crate::depth::create_depth;
use crate::model::{GpuMesh, MeshSource};
use crate::pipeline::{CameraUniform, DrawUniform, Layouts, create_bind_group_layouts, create_pipeline};

const INITIAL_DRAW_CAPACITY: usize = 64;
const CLEAR_COLOR: Color = Color {
    r: 0.05,
    g: 0.05,
    b: 0.05,
    a: 1.0,
};

struct DrawCall {
    model: ModelRef,
    transform: Mat4,
}

/// Draws recorded for the frame in flight.
#[derive(Default)]
struct DrawQueue {
    calls: Vec<DrawCall>,
    view_proj: Mat4,
}

impl DrawQueue {
    fn len(&self) -> usize {
        self.calls.len()
    }

    /// Drop every pending draw, returning how many were dropped.
    fn discard(&mut self) -> usize {
        let dropped = self.calls.len();
        self.calls.clear();
        dropped
    }
}

impl Renderer for DrawQueue {
    fn draw(&mut self, model: ModelRef, transform: &Mat4, view: &Mat4, projection: &Mat4) {
        self.view_proj = *projection * *view;
        self.calls.push(DrawCall {
            model,
            transform: *transform,
        });
    }
}

/// Collects draws during a frame and flushes them in one pass.
///
/// Meshes are uploaded the first time a model is drawn.
pub struct Renderer3D {
    pub render_pipeline: RenderPipeline,
    pub depth_view: TextureView,
    pub depth_tex: Texture,
    layouts: Layouts,
    camera_bg: BindGroup,
    camera_buf: Buffer,
    draw_bg: BindGroup,
    draw_buf: Buffer,
    draw_capacity: usize,
    draw_stride: u64,
    meshes: HashMap<ModelRef, Vec<GpuMesh>>,
    missing: HashSet<ModelRef>,
    pending: DrawQueue,
}

fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Inverse-transpose of `model`, or `model` itself when it is singular
/// (e.g. after a projection flattened an axis).
fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() < 1e-12 {
        model
    } else {
        model.inverse().transpose()
    }
}

fn create_draw_buffer(
    device: &Device,
    layout: &BindGroupLayout,
    capacity: usize,
    stride: u64,
) -> (Buffer, BindGroup) {
    let buf = device.create_buffer(&BufferDescriptor {
        label: Some("draw_uniforms"),
        size: stride * capacity as u64,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bg = device.create_bind_group(&BindGroupDescriptor {
        label: Some("draw_bg"),
        layout,
        entries: &[BindGroupEntry {
            binding: 0,
            resource: BindingResource::Buffer(BufferBinding {
                buffer: &buf,
                offset: 0,
                size: NonZeroU64::new(size_of::<DrawUniform>() as u64),
            }),
        }],
    });
    (buf, bg)
}

impl Renderer3D {
    pub fn new(device: &Device, surface_format: TextureFormat, width: u32, height: u32) -> Self {
        let (depth_view, depth_tex) = create_depth(device, width, height);
        let layouts = create_bind_group_layouts(device);
        let render_pipeline = create_pipeline(device, surface_format, &layouts);

        let camera_buf = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_bg = device.create_bind_group(&BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &layouts.camera_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        let draw_stride = align_to(
            size_of::<DrawUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (draw_buf, draw_bg) = create_draw_buffer(
            device,
            &layouts.model_bgl,
            INITIAL_DRAW_CAPACITY,
            draw_stride,
        );

        Self {
            render_pipeline,
            depth_view,
            depth_tex,
            layouts,
            camera_bg,
            camera_buf,
            draw_bg,
            draw_buf,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            draw_stride,
            meshes: HashMap::new(),
            missing: HashSet::new(),
            pending: DrawQueue::default(),
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (dv, dt) = create_depth(device, width, height);
        self.depth_view = dv;
        self.depth_tex = dt;
    }

    /// Forget the draws recorded for a frame that will never be presented.
    pub fn discard_queued(&mut self) {
        let dropped = self.pending.discard();
        if dropped > 0 {
            debug!("discarded {dropped} draw(s) for a skipped frame");
        }
    }

    fn upload_missing(&mut self, device: &Device, source: &impl MeshSource) {
        for call in &self.pending.calls {
            if self.meshes.contains_key(&call.model) || self.missing.contains(&call.model) {
                continue;
            }
            match source.meshes(call.model) {
                Some(meshes) => {
                    debug!("uploading {} mesh(es) for {:?}", meshes.len(), call.model);
                    let gpu = meshes
                        .iter()
                        .map(|m| GpuMesh::upload(device, &self.layouts.material_bgl, m))
                        .collect();
                    self.meshes.insert(call.model, gpu);
                }
                None => {
                    warn!("no mesh data for {:?}, skipping its draws", call.model);
                    self.missing.insert(call.model);
                }
            }
        }
    }

    fn write_uniforms(&mut self, device: &Device, queue: &Queue) {
        if self.pending.len() > self.draw_capacity {
            let capacity = self.pending.len().next_power_of_two();
            let (buf, bg) =
                create_draw_buffer(device, &self.layouts.model_bgl, capacity, self.draw_stride);
            self.draw_buf = buf;
            self.draw_bg = bg;
            self.draw_capacity = capacity;
        }

        queue.write_buffer(
            &self.camera_buf,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: self.pending.view_proj.to_cols_array_2d(),
            }),
        );

        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; stride * self.pending.len()];
        for (i, call) in self.pending.calls.iter().enumerate() {
            let uniform = DrawUniform {
                model: call.transform.to_cols_array_2d(),
                normal: normal_matrix(call.transform).to_cols_array_2d(),
            };
            let start = i * stride;
            bytes[start..start + size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.draw_buf, 0, &bytes);
        }
    }

    /// Flush every queued draw into `target_view`.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target_view: &TextureView,
        source: &impl MeshSource,
    ) {
        self.upload_missing(device, source);
        self.write_uniforms(device, queue);

        {
            let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            r_pass.set_pipeline(&self.render_pipeline);
            r_pass.set_bind_group(0, &self.camera_bg, &[]);

            for (i, call) in self.pending.calls.iter().enumerate() {
                let Some(meshes) = self.meshes.get(&call.model) else {
                    continue;
                };
                let offset = (i as u64 * self.draw_stride) as u32;
                r_pass.set_bind_group(1, &self.draw_bg, &[offset]);
                for mesh in meshes {
                    r_pass.set_bind_group(2, &mesh.material_bg, &[]);
                    r_pass.set_vertex_buffer(0, mesh.vbuf.slice(..));
                    r_pass.set_index_buffer(mesh.ibuf.slice(..), IndexFormat::Uint32);
                    r_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        self.pending.discard();
    }
}

impl Renderer for Renderer3D {
    fn draw(&mut self, model: ModelRef, transform: &Mat4, view: &Mat4, projection: &Mat4) {
        self.pending.draw(model, transform, view, projection);
    }
}
