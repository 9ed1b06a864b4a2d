use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use wgpu::{CommandEncoderDescriptor, DepthBiasState, MultisampleState, StencilState};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    assets::TextureAsset,
    camera::CameraUniform,
    materials::TextureId,
    rendering::{
        instance::{Draw, DrawList, Instance, InstanceBuffer},
        overlay::OverlayRenderer,
        render_model::{upload_meshes, RenderMesh, MODEL_PRIMITIVE_STATE, RENDER_MODEL_VBL},
        texture::{DepthTexture, Texture},
    },
    scene_graph::MeshId,
    viewer::Viewer,
};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.015,
    g: 0.012,
    b: 0.02,
    a: 1.0,
};

struct MaterialTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    textures: HashMap<TextureId, MaterialTexture>,
    fallback_texture: MaterialTexture,
    meshes: HashMap<MeshId, RenderMesh>,
    draws: DrawList,
    instance_buffer: InstanceBuffer,

    opaque_pipeline: wgpu::RenderPipeline,
    glass_pipeline: wgpu::RenderPipeline,
    overlay: OverlayRenderer,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        viewer: &Viewer,
        imgui: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("Surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_texture = DepthTexture::new(&device, &surface_config);

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(viewer.camera());
        let camera_buffer = camera_uniform.create_buffer(&device);

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let upload = |asset: &TextureAsset| {
            let texture = Texture::from_asset(&device, &queue, asset);
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&asset.label),
                layout: &texture_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ],
            });

            MaterialTexture {
                _texture: texture,
                bind_group,
            }
        };

        let textures = viewer
            .materials()
            .textures
            .iter()
            .map(|(id, asset)| (id, upload(asset)))
            .collect();
        let fallback_texture = upload(&TextureAsset::solid("White fallback", [255; 4]));

        let meshes = upload_meshes(&device, viewer.scene());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Unlit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/unlit.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Unlit render pipeline layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, blend: wgpu::BlendState, depth_write_enabled: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[RENDER_MODEL_VBL, Instance::descriptor()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_config.format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: MODEL_PRIMITIVE_STATE,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTexture::DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque_pipeline = create_pipeline("Opaque pipeline", wgpu::BlendState::REPLACE, true);
        // Glass never writes depth so what is behind it stays visible.
        let glass_pipeline = create_pipeline("Glass pipeline", wgpu::BlendState::ALPHA_BLENDING, false);

        let overlay = OverlayRenderer::new(&device, &queue, surface_config.format, imgui);
        let instance_buffer = InstanceBuffer::new(&device);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            surface_config,
            depth_texture,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            textures,
            fallback_texture,
            meshes,
            draws: DrawList::default(),
            instance_buffer,
            opaque_pipeline,
            glass_pipeline,
            overlay,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_texture
                .resize(&self.device, &self.surface_config);
        }
    }

    pub fn render(
        &mut self,
        viewer: &Viewer,
        imgui: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.camera_uniform.update(viewer.camera());
        self.camera_uniform
            .update_buffer(&self.queue, &self.camera_buffer);

        self.draws.gather(viewer.scene(), viewer.materials());
        self.instance_buffer
            .write(&self.device, &self.queue, &self.draws.instances);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_texture.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            self.instance_buffer.bind(&mut render_pass);

            render_pass.set_pipeline(&self.opaque_pipeline);
            for draw in &self.draws.opaque {
                self.draw(&mut render_pass, draw);
            }

            render_pass.set_pipeline(&self.glass_pipeline);
            for draw in &self.draws.transparent {
                self.draw(&mut render_pass, draw);
            }
        }

        self.overlay
            .render(&view, imgui, &self.device, &self.queue, &mut encoder);

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, draw: &Draw) {
        let Some(primitive) = self
            .meshes
            .get(&draw.mesh)
            .and_then(|mesh| mesh.primitives.get(draw.primitive))
        else {
            return;
        };

        let texture = draw
            .texture
            .and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.fallback_texture);

        render_pass.set_bind_group(1, &texture.bind_group, &[]);
        render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        render_pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..primitive.num_indices, 0, draw.instance..draw.instance + 1);
    }
}
