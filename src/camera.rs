//! Orbital camera, perspective projection and view/projection uniforms.
//!
//! The camera orbits a focus target on a sphere described by yaw, pitch and
//! radius. Mouse input is accumulated by [`OrbitController`] and applied once
//! per frame: dragging orbits, scrolling zooms and right-dragging pans the
//! target in the view plane.

use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective,
};
use winit::event::MouseScrollDelta;

/// wgpu clip space has z in [0, 1] while cgmath produces OpenGL-style
/// [-1, 1] projections, so every projection matrix gets this correction.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Camera described by a focus target and spherical coordinates around it.
///
/// `yaw` rotates around the world Y axis, `pitch` tilts towards the poles and
/// `radius` is the distance to the target. The eye position is derived, never
/// stored, so orbit and zoom cannot drift apart.
#[derive(Clone, Debug)]
pub struct Camera {
    pub target: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub radius: f32,
}

impl Camera {
    pub fn new<T: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        target: T,
        yaw: Y,
        pitch: P,
        radius: f32,
    ) -> Self {
        Self {
            target: target.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
            radius,
        }
    }

    /// Build a camera placed at `eye` focusing `target`, recovering the
    /// spherical coordinates from the offset between the two.
    pub fn looking_from<T: Into<Point3<f32>>>(eye: T, target: T) -> Self {
        let eye = eye.into();
        let target = target.into();
        let offset = eye - target;
        let radius = offset.magnitude();
        let pitch = Rad((offset.y / radius).asin());
        let yaw = Rad(offset.z.atan2(offset.x));
        Self {
            target,
            yaw,
            pitch,
            radius,
        }
    }

    /// Derived eye position on the orbit sphere.
    pub fn eye(&self) -> Point3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        self.target
            + Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.radius
    }

    /// Unit vector pointing to the right of the view direction, in the
    /// horizontal plane. Used for panning.
    pub fn right(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        // Perpendicular to the eye->target direction projected onto XZ.
        Vector3::new(sin_yaw, 0.0, -cos_yaw)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }
}

/// Perspective projection parameters. Aspect tracks the surface dimensions
/// via [`resize`](Self::resize).
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// View/projection data in the layout the shaders expect.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.eye().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Pitch stops just short of the poles so the look-at basis never collapses.
const PITCH_LIMIT: Rad<f32> = Rad(std::f32::consts::FRAC_PI_2 - 0.01);
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 500.0;

/// Accumulates pointer and scroll input and applies it to a [`Camera`] once
/// per frame.
///
/// Bindings follow the usual orbit-control convention: left-drag orbits,
/// right-drag pans the target in the view plane, the wheel zooms.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    rotate_delta: (f32, f32),
    pan_delta: (f32, f32),
    scroll_delta: f32,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, pan_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            pan_speed,
            zoom_speed,
            rotate_delta: (0.0, 0.0),
            pan_delta: (0.0, 0.0),
            scroll_delta: 0.0,
        }
    }

    /// Accumulate an orbit drag in pointer pixels.
    pub fn handle_orbit(&mut self, dx: f64, dy: f64) {
        self.rotate_delta.0 += dx as f32;
        self.rotate_delta.1 += dy as f32;
    }

    /// Accumulate a pan drag in pointer pixels.
    pub fn handle_pan(&mut self, dx: f64, dy: f64) {
        self.pan_delta.0 += dx as f32;
        self.pan_delta.1 += dy as f32;
    }

    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(_, lines) => *lines,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
        };
    }

    /// Apply the accumulated input to the camera and reset the accumulators.
    pub fn update(&mut self, camera: &mut Camera) {
        let (dx, dy) = self.rotate_delta;
        camera.yaw += Rad(dx * self.rotate_speed);
        camera.pitch += Rad(dy * self.rotate_speed);
        if camera.pitch > PITCH_LIMIT {
            camera.pitch = PITCH_LIMIT;
        } else if camera.pitch < -PITCH_LIMIT {
            camera.pitch = -PITCH_LIMIT;
        }

        let (px, py) = self.pan_delta;
        if px != 0.0 || py != 0.0 {
            let right = camera.right();
            let up = right.cross(camera.target - camera.eye()).normalize();
            // Pan distance scales with the orbit radius so the motion tracks
            // the cursor at any zoom level.
            let factor = self.pan_speed * camera.radius;
            camera.target += right * (-px * factor) + up * (-py * factor);
        }

        camera.radius = (camera.radius * (1.0 - self.scroll_delta * self.zoom_speed))
            .clamp(MIN_RADIUS, MAX_RADIUS);

        self.rotate_delta = (0.0, 0.0);
        self.pan_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(0.005, 0.001, 0.1)
    }
}

/// GPU-side camera bundle: uniform data, its buffer and bind group, plus the
/// controller that drives the camera.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Camera pose of the demo scene: eye at (5, 5, 5) focusing the origin.
pub fn demo_camera() -> Camera {
    Camera::looking_from([5.0, 5.0, 5.0], [0.0, 0.0, 0.0])
}

/// Projection of the demo scene: 60 degree field of view, clip range 0.1..1000.
pub fn demo_projection(width: u32, height: u32) -> Projection {
    Projection::new(width, height, Deg(60.0), 0.1, 1000.0)
}
