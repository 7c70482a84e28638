use crate::config::DioramaConfig;
use diorama_anim::{AnimationSequencer, builtin_sequences};
use diorama_gltf::MeshCatalog;
use diorama_runtime::{Graphics, GraphicsSettings, RcWindow, create_graphics};
use diorama_stage::{EditSession, Stage};
use log::{error, info, warn};
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, ElementState, MouseButton, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

enum State {
    Ready(Graphics),
    Init(Option<EventLoopProxy<Graphics>>),
}

pub struct App {
    state: State,
    config: DioramaConfig,
    stage: Stage,
    catalog: MeshCatalog,
    frame_time: Duration,
    render_target: Instant,
    cursor_grabbed: bool,
}

impl App {
    pub fn new(event_loop: &EventLoop<Graphics>, config: DioramaConfig) -> Self {
        let mut catalog =
            MeshCatalog::new(config.assets.root.clone(), config.assets.models.clone());
        let session = EditSession::new(
            config.bindings.clone(),
            config.edit.clone(),
            config.assets.kinds.clone(),
        );
        let mut stage = Stage::new(session, AnimationSequencer::new(builtin_sequences()));
        if let Err(err) = stage.spawn_initial(&mut catalog) {
            error!("initial model not placed: {err}");
        }

        Self {
            state: State::Init(Some(event_loop.create_proxy())),
            frame_time: Duration::from_nanos(1_000_000_000 / config.window.fps),
            config,
            stage,
            catalog,
            render_target: Instant::now(),
            cursor_grabbed: false,
        }
    }

    fn draw(&mut self) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.draw(&mut self.stage, &mut self.catalog);
        }
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.resize(size);
        }
    }

    fn set_cursor_grab(&mut self, grab: bool) {
        let State::Ready(gfx) = &self.state else {
            return;
        };
        let window = gfx.window();
        let mode = if grab {
            CursorGrabMode::Confined
        } else {
            CursorGrabMode::None
        };
        if let Err(err) = window.set_cursor_grab(mode) {
            warn!("cursor grab {mode:?} failed: {err}");
        }
        window.set_cursor_visible(!grab);
        self.cursor_grabbed = grab;
    }
}

impl ApplicationHandler<Graphics> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let State::Init(proxy) = &mut self.state {
            if let Some(proxy) = proxy.take() {
                let window_cfg = &self.config.window;
                let win_attr = Window::default_attributes()
                    .with_title(window_cfg.title.clone())
                    .with_inner_size(LogicalSize::new(window_cfg.width, window_cfg.height));

                let window: RcWindow = match event_loop.create_window(win_attr) {
                    Ok(window) => std::sync::Arc::new(window),
                    Err(err) => {
                        error!("cannot create window: {err}");
                        event_loop.exit();
                        return;
                    }
                };
                let settings = GraphicsSettings {
                    camera: self.config.camera.clone(),
                    max_frame_dt: window_cfg.max_frame_dt,
                };
                if let Err(err) = pollster::block_on(create_graphics(window, proxy, settings)) {
                    error!("graphics init failed: {err:#}");
                    event_loop.exit();
                }
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        info!("click to capture the mouse, Esc to release or quit");
        graphics.request_redraw();
        self.state = State::Ready(graphics);
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if self.render_target <= Instant::now() {
            self.render_target += self.frame_time;
            if let State::Ready(gfx) = &self.state {
                gfx.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => {
                self.draw();
                let now = Instant::now();
                if self.render_target <= now {
                    self.render_target = now + self.frame_time;
                    if let State::Ready(gfx) = &self.state {
                        gfx.request_redraw();
                    }
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event: ref key_event,
                ..
            } if key_event.physical_key == PhysicalKey::Code(KeyCode::Escape) => {
                if key_event.state == ElementState::Pressed && !key_event.repeat {
                    if self.cursor_grabbed {
                        self.set_cursor_grab(false);
                    } else {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !self.cursor_grabbed => self.set_cursor_grab(true),
            WindowEvent::Focused(false) if self.cursor_grabbed => {
                self.set_cursor_grab(false);
                if let State::Ready(gfx) = &mut self.state {
                    gfx.handle_window_event(&event);
                }
            }
            other => {
                if let State::Ready(gfx) = &mut self.state {
                    gfx.handle_window_event(&other);
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let State::Ready(gfx) = &mut self.state {
            if self.cursor_grabbed {
                gfx.handle_device_event(&event);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.render_target));
    }
}
