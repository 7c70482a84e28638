mod input;

use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use winit::{
    dpi::PhysicalSize,
    event::{DeviceEvent, WindowEvent},
    event_loop::EventLoopProxy,
    window::Window,
};

use wgpu::{
    Adapter, CommandEncoderDescriptor, Device, ExperimentalFeatures, Features, Instance, Limits,
    MemoryHints, PowerPreference, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration,
    SurfaceError, TextureViewDescriptor,
};

pub use input::{InputState, map_key};

pub type RcWindow = std::sync::Arc<Window>;

use diorama_3d::Renderer3D;
use diorama_camera::{CameraConfig, CameraController, FlyCamera};
use diorama_gltf::MeshCatalog;
use diorama_stage::Stage;

/// Platform settings the graphics layer needs from the app config.
#[derive(Debug, Clone)]
pub struct GraphicsSettings {
    pub camera: CameraConfig,
    /// Upper bound on a frame's elapsed time, in seconds.
    pub max_frame_dt: f32,
}

pub async fn create_graphics(
    window: RcWindow,
    proxy: EventLoopProxy<Graphics>,
    settings: GraphicsSettings,
) -> Result<()> {
    let instance = Instance::default();
    let surface = instance
        .create_surface(std::sync::Arc::clone(&window))
        .context("creating surface")?;

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("could not get an adapter (GPU)")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: Features::empty(),
            required_limits: Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            memory_hints: MemoryHints::Performance,
            trace: Default::default(),
            experimental_features: ExperimentalFeatures::disabled(),
        })
        .await
        .context("failed to get device")?;

    let size = window.inner_size();
    let width = size.width.max(1);
    let height = size.height.max(1);

    let surface_config = surface
        .get_default_config(&adapter, width, height)
        .context("surface is not supported by the adapter")?;
    surface.configure(&device, &surface_config);
    info!(
        "surface {}x{} {:?} on {}",
        surface_config.width,
        surface_config.height,
        surface_config.format,
        adapter.get_info().name
    );

    let renderer = Renderer3D::new(
        &device,
        surface_config.format,
        surface_config.width,
        surface_config.height,
    );

    let camera = FlyCamera::from_config(&settings.camera);
    let controller = CameraController::new(&settings.camera);

    let gfx = Graphics {
        window,
        instance,
        surface,
        surface_config,
        adapter,
        device,
        queue,
        renderer,
        camera,
        controller,
        input: InputState::new(),
        camera_frozen: false,
        max_frame_dt: settings.max_frame_dt,
        last_frame_time: Instant::now(),
    };

    let _ = proxy.send_event(gfx);
    Ok(())
}

#[allow(dead_code)]
pub struct Graphics {
    pub(crate) window: RcWindow,
    instance: Instance,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    adapter: Adapter,
    device: Device,
    queue: Queue,
    renderer: Renderer3D,
    camera: FlyCamera,
    controller: CameraController,
    input: InputState,
    camera_frozen: bool,
    max_frame_dt: f32,
    last_frame_time: Instant,
}

impl Graphics {
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface_config.width = new_size.width.max(1);
        self.surface_config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer.resize(
            &self.device,
            self.surface_config.width,
            self.surface_config.height,
        );
    }

    /// Step the stage by one frame and present it.
    ///
    /// The camera does not move while the stage is animating. The stage
    /// still advances when the surface has no frame to give.
    pub fn draw(&mut self, stage: &mut Stage, catalog: &mut MeshCatalog) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time)
            .as_secs_f32()
            .min(self.max_frame_dt);
        self.last_frame_time = now;

        self.camera_frozen = stage.is_animating();
        if !self.camera_frozen {
            self.controller.update(&mut self.camera, dt);
        }

        let view = self.camera.view_matrix();
        let projection = self
            .camera
            .projection_matrix(self.surface_config.width, self.surface_config.height);
        stage.frame(dt, &self.input, catalog, &mut self.renderer, &view, &projection);
        self.camera_frozen = stage.is_animating();

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.renderer.discard_queued();
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(err) => {
                warn!("skipping frame: {err}");
                self.renderer.discard_queued();
                return;
            }
        };

        let swap_view = frame.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });
        self.renderer
            .render(&self.device, &self.queue, &mut encoder, &swap_view, &*catalog);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        self.input.handle_window_event(event);
        if matches!(event, WindowEvent::Focused(false)) {
            self.controller.release_all();
        }
        // Key releases still reach the controller while frozen so no
        // movement key stays latched after a sequence.
        match event {
            WindowEvent::MouseWheel { .. } if self.camera_frozen => {}
            _ => self.controller.handle_window_event(event, &mut self.camera),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.camera_frozen {
            self.controller.handle_device_event(event, &mut self.camera);
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_config(&self) -> &SurfaceConfiguration {
        &self.surface_config
    }
}
