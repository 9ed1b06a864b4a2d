use std::mem::size_of;

use glam::{Mat4, Vec4};
use wgpu::BufferUsages;

use crate::materials::{base_tint, Material, MaterialLibrary, TextureId};
use crate::scene_graph::{MeshId, Scene};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    pub model: Mat4,
    pub tint: Vec4,
}

impl Instance {
    pub fn descriptor() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
        ];

        wgpu::VertexBufferLayout {
            array_stride: size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One primitive of one node, pointing at its slot in the instance buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub mesh: MeshId,
    pub primitive: usize,
    /// `None` samples the white fallback texture.
    pub texture: Option<TextureId>,
    pub instance: u32,
}

#[derive(Debug, Default)]
pub struct DrawList {
    pub instances: Vec<Instance>,
    pub opaque: Vec<Draw>,
    pub transparent: Vec<Draw>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.instances.clear();
        self.opaque.clear();
        self.transparent.clear();
    }

    /// Collects every visible mesh primitive with its current world matrix.
    /// Hitboxes are skipped and glass goes to the blended list.
    pub fn gather(&mut self, scene: &Scene, materials: &MaterialLibrary) {
        self.clear();

        for (_, object) in scene.mesh_objects() {
            let Some(mesh_id) = object.mesh_id else {
                continue;
            };
            let Some(mesh) = scene.get_mesh(mesh_id) else {
                continue;
            };
            let material = object.material_id.and_then(|id| materials.get(id));
            let model = *object.transform.get_world_matrix();

            let (texture, transparent) = match material {
                Some(Material::Invisible) => continue,
                Some(Material::Unlit { texture }) => (Some(*texture), false),
                Some(Material::Glass(_)) => (None, true),
                None => (None, false),
            };

            for (index, primitive) in mesh.primitives.iter().enumerate() {
                let tint = material.map_or(primitive.base_color, base_tint);
                let draw = Draw {
                    mesh: mesh_id,
                    primitive: index,
                    texture,
                    instance: self.instances.len() as u32,
                };
                self.instances.push(Instance { model, tint });

                if transparent {
                    self.transparent.push(draw);
                } else {
                    self.opaque.push(draw);
                }
            }
        }
    }
}

pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstanceBuffer {
    const INITIAL_CAPACITY: usize = 256;

    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: Self::create(device, Self::INITIAL_CAPACITY),
            capacity: Self::INITIAL_CAPACITY,
        }
    }

    fn create(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance buffer"),
            size: (size_of::<Instance>() * capacity) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Grows to the next power of two when the frame has more instances than
    /// fit.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[Instance]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.buffer = Self::create(device, self.capacity);
            log::debug!("Instance buffer grown to {}", self.capacity);
        }

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }
}
