//! Orbit camera: rotation angles, pan offset, distance scalar.
//!
//! The view matrix is `T(0,0,-distance) * R_x(psi) * R_y(phi) * T(-center)`,
//! recomputed on every mutation.

use glam::{Mat4, Vec3};

pub struct OrbitCamera {
    center: Vec3,
    psi: f32,
    phi: f32,
    distance: f32,
    rot_speed: f32,
    translate_speed: f32,
    zoom_speed: f32,
    view: Mat4,
}

impl OrbitCamera {
    pub fn new(distance: f32) -> Self {
        let mut camera = Self {
            center: Vec3::ZERO,
            psi: 0.0,
            phi: 0.0,
            distance,
            rot_speed: 0.005,
            translate_speed: 0.01,
            zoom_speed: 0.25,
            view: Mat4::IDENTITY,
        };
        camera.update();
        camera
    }

    fn update(&mut self) {
        let rotation = Mat4::from_rotation_x(self.psi) * Mat4::from_rotation_y(self.phi);
        self.view = Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * rotation
            * Mat4::from_translation(-self.center);
    }

    /// Rotate by cursor deltas in x/y.
    pub fn rotate(&mut self, dpsi: f32, dphi: f32) {
        self.psi += dpsi * self.rot_speed;
        self.phi += dphi * self.rot_speed;
        self.update();
    }

    /// Pan the orbit center by cursor deltas in x/y.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.center.x += dx * self.translate_speed;
        self.center.y += dy * self.translate_speed;
        self.update();
    }

    /// Move along the view axis; distance never collapses to zero.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta * self.zoom_speed).max(0.1);
        self.update();
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn projection(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(fov_y, aspect, near, far)
    }
}
