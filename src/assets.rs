use std::path::{Path, PathBuf};

use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};
use gltf::buffer;
use itertools::izip;

use crate::scene_graph::{Mesh, MeshId, MeshPrimitive, Object3D, ObjectId, Scene, Transform, Vertex};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model {path}")]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("failed to load texture {path}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("model {path} contains no scene")]
    NoScene { path: PathBuf },
    #[error(
        "model {path} requires unsupported extension {extension}; \
         re-export it without Draco mesh compression"
    )]
    UnsupportedExtension { path: PathBuf, extension: String },
    #[error("mesh {mesh} uses unsupported primitive mode {mode:?}")]
    UnsupportedPrimitive { mesh: String, mode: gltf::mesh::Mode },
    #[error("mesh {mesh} has no {attribute} attribute")]
    MissingAttribute {
        mesh: String,
        attribute: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Upload flags. The baked textures are authored for glTF UVs, so they are
/// never flipped and always sampled as sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    pub flip_y: bool,
    pub color_space: ColorSpace,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_y: false,
            color_space: ColorSpace::Srgb,
        }
    }
}

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub options: TextureOptions,
}

impl TextureAsset {
    pub fn load(path: &Path, options: TextureOptions) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|source| AssetError::Texture {
            path: path.to_path_buf(),
            source,
        })?;

        let image = if options.flip_y { image.flipv() } else { image };
        let rgba = image.to_rgba8();

        log::debug!(
            "Loaded texture {} ({}x{})",
            path.display(),
            rgba.width(),
            rgba.height()
        );

        Ok(Self {
            label: path.display().to_string(),
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
            options,
        })
    }

    /// 1x1 texture of a single colour.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
            options: TextureOptions::default(),
        }
    }
}

pub type Buffers<'a> = &'a [buffer::Data];

fn reject_draco<'a>(
    path: &Path,
    mut required: impl Iterator<Item = &'a str>,
) -> Result<(), AssetError> {
    match required.find(|extension| *extension == DRACO_EXTENSION) {
        Some(extension) => Err(AssetError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        }),
        None => Ok(()),
    }
}

/// Imports a glTF/GLB file into a fresh scene. Nodes are allocated depth
/// first, parents before children, so arena order matches traversal order.
pub fn load_gltf_scene(path: &Path) -> Result<Scene, AssetError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    reject_draco(path, document.extensions_required())?;

    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene {
            path: path.to_path_buf(),
        })?;

    let mut loader = GltfSceneLoader {
        scene: Scene::new(),
        buffers: &buffers,
        mesh_ids: Vec::new(),
    };

    for node in gltf_scene.nodes() {
        loader.spawn_node(&node, None)?;
    }

    log::info!(
        "Loaded {} with {} nodes and {} meshes",
        path.display(),
        loader.scene.objects.len(),
        loader.scene.meshes.len()
    );

    Ok(loader.scene)
}

struct GltfSceneLoader<'a> {
    scene: Scene,
    buffers: Buffers<'a>,
    /// glTF mesh index to scene mesh, so shared meshes are imported once.
    mesh_ids: Vec<(usize, MeshId)>,
}

impl GltfSceneLoader<'_> {
    fn spawn_node(
        &mut self,
        node: &gltf::Node,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, AssetError> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let (translation, rotation, scale) = node.transform().decomposed();
        let (x, y, z) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);

        let mut object = Object3D::named(node_name.clone());
        object.transform = Transform::new(
            Vec3::from(translation),
            Vec3::new(x, y, z),
            Vec3::from(scale),
        );

        if let Some(mesh) = node.mesh() {
            object.mesh_id = Some(self.import_mesh(&node_name, mesh)?);
        }

        let object_id = self.scene.add_object(object);

        if let Some(parent_id) = parent {
            self.scene.set_object_parent(object_id, Some(parent_id));
        }

        for child in node.children() {
            self.spawn_node(&child, Some(object_id))?;
        }

        Ok(object_id)
    }

    fn import_mesh(&mut self, node_name: &str, mesh: gltf::Mesh) -> Result<MeshId, AssetError> {
        let mesh_index = mesh.index();

        if let Some(&(_, mesh_id)) = self.mesh_ids.iter().find(|(index, _)| *index == mesh_index) {
            return Ok(mesh_id);
        }

        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("{} (Mesh)", node_name));

        let primitives = mesh
            .primitives()
            .map(|primitive| read_primitive(&mesh_name, &primitive, self.buffers))
            .collect::<Result<Vec<_>, _>>()?;

        let mesh = Mesh::new(mesh_name.clone(), primitives).ok_or(AssetError::MissingAttribute {
            mesh: mesh_name,
            attribute: "POSITION",
        })?;

        let mesh_id = self.scene.add_mesh(mesh);
        self.mesh_ids.push((mesh_index, mesh_id));

        Ok(mesh_id)
    }
}

fn read_primitive(
    mesh_name: &str,
    primitive: &gltf::Primitive,
    buffers: Buffers,
) -> Result<MeshPrimitive, AssetError> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        return Err(AssetError::UnsupportedPrimitive {
            mesh: mesh_name.to_string(),
            mode: primitive.mode(),
        });
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingAttribute {
            mesh: mesh_name.to_string(),
            attribute: "POSITION",
        })?
        .collect();

    // Untextured primitives still need a UV per vertex.
    let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(tex_coords) => tex_coords.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    let vertices = izip!(positions.iter(), tex_coords.iter())
        .map(|(position, tex_coords)| Vertex {
            position: Vec3::from(*position),
            tex_coords: Vec2::from(*tex_coords),
        })
        .collect::<Vec<Vertex>>();

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let base_color = Vec4::from(
        primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor(),
    );

    Ok(MeshPrimitive {
        index: primitive.index(),
        vertices,
        indices,
        base_color,
    })
}
