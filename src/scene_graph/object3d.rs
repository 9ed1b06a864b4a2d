use glam::Vec3;
use id_arena::Id;

use crate::materials::MaterialId;
use crate::scene_graph::mesh::MeshId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub mesh_id: Option<MeshId>,
    /// `None` keeps the material imported with the model.
    pub material_id: Option<MaterialId>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.mesh_id.is_some()
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            mesh_id: None,
            material_id: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
