use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::OrbitConfig;

const POLAR_EPSILON: f32 = 1e-6;
const ZOOM_BASE: f32 = 0.95;

/// Spherical orbit around a target with damped input. Input is ignored while
/// disabled, but pending motion still settles.
pub struct OrbitControls {
    enabled: bool,
    target: Vec3,
    config: OrbitConfig,
    /// Pending (azimuth, polar) rotation in radians.
    spherical_delta: Vec2,
    pending_scale: f32,
}

impl OrbitControls {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            enabled: true,
            target: config.target,
            config: config.clone(),
            spherical_delta: Vec2::ZERO,
            pending_scale: 1.0,
        }
    }

    #[cfg(test)]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!("Orbit controls {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Drag by `delta` pixels. A drag across the full viewport height turns a
    /// full circle.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }

        let scale = TAU * self.config.rotate_speed / viewport_height;
        self.spherical_delta.x -= delta.x * scale;
        self.spherical_delta.y -= delta.y * scale;
    }

    /// Wheel input. Negative deltas move closer.
    pub fn dolly(&mut self, wheel_delta: f32) {
        if !self.enabled {
            return;
        }

        let zoom_scale = ZOOM_BASE.powf(self.config.zoom_speed);
        if wheel_delta < 0.0 {
            self.pending_scale *= zoom_scale;
        } else if wheel_delta > 0.0 {
            self.pending_scale /= zoom_scale;
        }
    }

    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.eye - self.target;
        let mut radius = offset.length();
        let (mut azimuth, mut polar) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        let damping = self.config.damping_factor;
        azimuth += self.spherical_delta.x * damping;
        polar += self.spherical_delta.y * damping;

        let (min_azimuth, max_azimuth) = (
            self.config.min_azimuth_angle,
            self.config.max_azimuth_angle,
        );
        if min_azimuth.is_finite() && max_azimuth.is_finite() {
            azimuth = azimuth.clamp(min_azimuth, max_azimuth);
        }

        polar = polar
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        radius = (radius * self.pending_scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        let offset = Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );

        camera.eye = self.target + offset;
        camera.target = self.target;

        self.spherical_delta *= 1.0 - damping;
        self.pending_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    fn setup() -> (OrbitControls, Camera) {
        let config = OrbitConfig::default();
        let controls = OrbitControls::new(&config);
        let camera = Camera::from_config(
            &CameraConfig::default(),
            config.target,
            Vec2::new(1280.0, 720.0),
        );
        (controls, camera)
    }

    fn polar_of(camera: &Camera) -> f32 {
        let offset = camera.eye - camera.target;
        (offset.y / offset.length()).acos()
    }

    #[test]
    fn first_update_clamps_distance() {
        let (mut controls, mut camera) = setup();
        assert!((camera.eye - camera.target).length() < 30.0);

        controls.update(&mut camera);
        assert_relative_eq!((camera.eye - camera.target).length(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn polar_angle_stays_within_limits() {
        let (mut controls, mut camera) = setup();

        for _ in 0..200 {
            controls.rotate(Vec2::new(0.0, 400.0), 720.0);
            controls.update(&mut camera);
        }
        assert!(polar_of(&camera) >= PI / 3.0 - 1e-4);

        for _ in 0..200 {
            controls.rotate(Vec2::new(0.0, -400.0), 720.0);
            controls.update(&mut camera);
        }
        assert!(polar_of(&camera) <= PI / 2.0 + 1e-4);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let (mut controls, mut camera) = setup();
        controls.update(&mut camera);
        let before = camera.eye;

        controls.set_enabled(false);
        controls.rotate(Vec2::new(300.0, 0.0), 720.0);
        controls.dolly(-1.0);
        controls.update(&mut camera);

        assert_relative_eq!(camera.eye.x, before.x, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.z, before.z, epsilon = 1e-4);
    }

    #[test]
    fn dolly_stays_within_distance_limits() {
        let (mut controls, mut camera) = setup();
        for _ in 0..100 {
            controls.dolly(1.0);
            controls.update(&mut camera);
        }
        assert_relative_eq!((camera.eye - camera.target).length(), 75.0, epsilon = 1e-3);
    }

    #[test]
    fn damping_settles_rotation() {
        let (mut controls, mut camera) = setup();
        controls.rotate(Vec2::new(100.0, 0.0), 720.0);
        for _ in 0..500 {
            controls.update(&mut camera);
        }
        let settled = camera.eye;
        controls.update(&mut camera);
        assert_relative_eq!(camera.eye.x, settled.x, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.z, settled.z, epsilon = 1e-4);
    }
}
