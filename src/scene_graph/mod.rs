pub mod mesh;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use mesh::{Mesh, MeshId, MeshPrimitive, Vertex};
pub use object3d::{Object3D, ObjectId};
pub use scene::Scene;
pub use transform::{Transform, TransformSnapshot};
