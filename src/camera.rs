use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::config::CameraConfig;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig, target: Vec3, viewport: Vec2) -> Self {
        let mut camera = Self {
            eye: config.position,
            target,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect: 1.0,
        };
        camera.set_viewport(viewport);
        camera
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        if viewport.x > 0.0 && viewport.y > 0.0 {
            self.aspect = viewport.x / viewport.y;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn get_vp_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.get_vp_matrix();
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aspect_follows_viewport() {
        let mut camera = Camera::from_config(
            &CameraConfig::default(),
            Vec3::ZERO,
            Vec2::new(1600.0, 900.0),
        );
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
        assert_relative_eq!(camera.fov_y, 35f32.to_radians());

        // Minimised windows report a zero size; keep the last aspect.
        camera.set_viewport(Vec2::ZERO);
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::from_config(
            &CameraConfig::default(),
            Vec3::new(1.0, 2.0, 3.0),
            Vec2::new(800.0, 600.0),
        );
        let clip = camera.get_vp_matrix().project_point3(camera.target);
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-4);
    }
}
