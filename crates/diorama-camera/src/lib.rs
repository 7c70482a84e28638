use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const MIN_FOV: f32 = 10.0;
const MAX_FOV: f32 = 90.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

pub fn forward_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let cp = pitch.cos();
    let sp = pitch.sin();
    let cy = yaw.cos();
    let sy = yaw.sin();
    Vec3::new(cy * cp, sp, -sy * cp)
}

/// Camera settings read from the `[camera]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    /// Radians, zero looks down +X.
    pub yaw: f32,
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Degrees per scroll line.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 3.0],
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            speed: 3.0,
            sensitivity: 0.0025,
            fov: 45.0,
            zoom_speed: 2.0,
        }
    }
}

pub struct FlyCamera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl FlyCamera {
    pub fn new(eye: Vec3, yaw: f32, pitch: f32, fov: f32) -> Self {
        Self {
            eye,
            yaw,
            pitch,
            fov,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(Vec3::from(config.eye), config.yaw, config.pitch, config.fov)
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw_pitch(self.yaw, self.pitch)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = (width.max(1) as f32) / (height.max(1) as f32);
        Mat4::perspective_rh(self.fov.to_radians(), aspect, NEAR, FAR)
    }
}

/// WASD movement, Q/E for down/up, right shift to boost, mouse look and
/// scroll zoom.
pub struct CameraController {
    move_forward: bool,
    move_back: bool,
    move_left: bool,
    move_right: bool,
    move_up: bool,
    move_down: bool,
    boost_speed: bool,
    base_speed: f32,
    sensitivity: f32,
    zoom_speed: f32,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            move_forward: false,
            move_back: false,
            move_left: false,
            move_right: false,
            move_up: false,
            move_down: false,
            boost_speed: false,
            base_speed: config.speed,
            sensitivity: config.sensitivity,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, cam: &mut FlyCamera) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if !*repeat {
                    self.set_key(*code, *state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.zoom(cam, lines);
            }
            _ => {}
        }
    }

    /// Returns whether `code` is a camera key.
    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        match code {
            KeyCode::KeyW => self.move_forward = pressed,
            KeyCode::KeyS => self.move_back = pressed,
            KeyCode::KeyA => self.move_left = pressed,
            KeyCode::KeyD => self.move_right = pressed,
            KeyCode::KeyE => self.move_up = pressed,
            KeyCode::KeyQ => self.move_down = pressed,
            KeyCode::ShiftRight => self.boost_speed = pressed,
            _ => return false,
        }
        true
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent, cam: &mut FlyCamera) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.look(cam, *dx as f32, *dy as f32);
        }
    }

    pub fn look(&self, cam: &mut FlyCamera, dx: f32, dy: f32) {
        cam.yaw -= dx * self.sensitivity;
        cam.pitch -= dy * self.sensitivity;
        let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
        cam.pitch = cam.pitch.clamp(-max_pitch, max_pitch);
    }

    /// Positive `lines` zoom in.
    pub fn zoom(&self, cam: &mut FlyCamera, lines: f32) {
        cam.fov = (cam.fov - lines * self.zoom_speed).clamp(MIN_FOV, MAX_FOV);
    }

    /// Drop every held movement key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.move_forward = false;
        self.move_back = false;
        self.move_left = false;
        self.move_right = false;
        self.move_up = false;
        self.move_down = false;
        self.boost_speed = false;
    }

    pub fn update(&mut self, cam: &mut FlyCamera, dt: f32) {
        let mut movement = Vec3::ZERO;

        let forward = cam.forward();
        let mut flat_forward = Vec3::new(forward.x, 0.0, forward.z);
        if flat_forward.length_squared() > 0.0 {
            flat_forward = flat_forward.normalize();
        }

        let mut right = flat_forward.cross(Vec3::Y);
        if right.length_squared() > 0.0 {
            right = right.normalize();
        }

        if self.move_forward {
            movement += flat_forward;
        }
        if self.move_back {
            movement -= flat_forward;
        }
        if self.move_right {
            movement += right;
        }
        if self.move_left {
            movement -= right;
        }
        if self.move_up {
            movement += Vec3::Y;
        }
        if self.move_down {
            movement -= Vec3::Y;
        }

        if movement.length_squared() > 0.0 {
            movement = movement.normalize();
            let mut speed = self.base_speed;
            if self.boost_speed {
                speed *= 5.0;
            }
            cam.eye += movement * speed * dt;
        }
    }
}
