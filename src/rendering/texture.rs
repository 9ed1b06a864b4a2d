use wgpu::util::DeviceExt;

use crate::assets::{ColorSpace, TextureAsset};

pub struct Texture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_wgpu_texture(texture: wgpu::Texture, sampler: wgpu::Sampler) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }

    /// Uploads decoded RGBA8 pixels. No mipmaps; the baked textures are
    /// viewed at roughly native resolution.
    pub fn from_asset(device: &wgpu::Device, queue: &wgpu::Queue, asset: &TextureAsset) -> Self {
        let format = match asset.options.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&asset.label),
                size: wgpu::Extent3d {
                    width: asset.width,
                    height: asset.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &asset.pixels,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&asset.label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self::from_wgpu_texture(texture, sampler)
    }
}

pub struct DepthTexture {
    texture: Texture,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    const LABEL: &'static str = "Depth Texture";

    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        DepthTexture {
            texture: Self::create_texture(device, config),
        }
    }

    fn create_texture(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Texture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(Self::LABEL),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(Self::LABEL),
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Texture::from_wgpu_texture(texture, sampler)
    }

    pub fn resize(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        self.texture = Self::create_texture(device, config);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }
}
