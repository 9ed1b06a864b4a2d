use glam::{Vec2, Vec3, Vec4Swizzles};

use crate::camera::Camera;
use crate::catalog::Catalog;
use crate::math::ray::Ray;
use crate::scene_graph::{ObjectId, Scene};

/// Maps a client-area position in pixels to normalized device coordinates,
/// x to the right and y up, both in [-1, 1].
pub fn ndc_from_client(position: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }

    Vec2::new(
        (position.x / viewport.x) * 2.0 - 1.0,
        -(position.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Ray from the camera eye through the given NDC point.
pub fn ray_from_camera(ndc: Vec2, camera: &Camera) -> Ray {
    let inverse = camera.get_vp_matrix().inverse();
    let on_far_half = inverse * ndc.extend(0.5).extend(1.0);
    let point = on_far_half.xyz() / on_far_half.w;

    Ray::new(camera.eye, point - camera.eye)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest hit per object in `pool`, sorted by distance.
pub fn intersect_pool(ray: &Ray, pool: &[ObjectId], scene: &Scene) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = pool
        .iter()
        .filter_map(|&object| {
            intersect_object(ray, object, scene).map(|distance| Intersection {
                object,
                distance,
                point: ray.point_at(distance),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn intersect_object(ray: &Ray, object_id: ObjectId, scene: &Scene) -> Option<f32> {
    let object = scene.get_object(object_id)?;
    let mesh = scene.get_mesh(object.mesh_id?)?;
    let world = *object.transform.get_world_matrix();

    mesh.bounds.transform(&world).intersect_ray(ray)?;

    mesh.triangles()
        .filter_map(|[a, b, c]| {
            ray.intersect_triangle(
                world.transform_point3(a),
                world.transform_point3(b),
                world.transform_point3(c),
            )
        })
        .min_by(f32::total_cmp)
}

/// Both intersection lists for one frame. Built fresh every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameHits {
    pub targets: Vec<Intersection>,
    pub hovers: Vec<Intersection>,
}

impl FrameHits {
    pub fn cast(ray: &Ray, catalog: &Catalog, scene: &Scene) -> Self {
        Self {
            targets: intersect_pool(ray, &catalog.raycast_targets, scene),
            hovers: intersect_pool(ray, &catalog.hover_targets, scene),
        }
    }

    pub fn nearest_target(&self) -> Option<&Intersection> {
        self.targets.first()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::scene_graph::{Mesh, Object3D};
    use approx::assert_relative_eq;

    /// Camera on +Z looking at the origin, square viewport.
    pub(crate) fn front_camera() -> Camera {
        let config = CameraConfig {
            position: Vec3::new(0.0, 0.0, 20.0),
            ..CameraConfig::default()
        };
        Camera::from_config(&config, Vec3::ZERO, Vec2::new(800.0, 800.0))
    }

    pub(crate) fn add_box(scene: &mut Scene, name: &str, position: Vec3) -> ObjectId {
        let mesh = scene.add_mesh(Mesh::cuboid(name, Vec3::ONE));
        let mut object = Object3D::named(name);
        object.mesh_id = Some(mesh);
        object.transform.set_translation(position);
        scene.add_object(object)
    }

    #[test]
    fn ndc_corners_and_centre() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(ndc_from_client(Vec2::ZERO, viewport), Vec2::new(-1.0, 1.0));
        assert_eq!(ndc_from_client(viewport, viewport), Vec2::new(1.0, -1.0));
        assert_eq!(
            ndc_from_client(Vec2::new(400.0, 300.0), viewport),
            Vec2::ZERO
        );
        assert_eq!(ndc_from_client(Vec2::new(5.0, 5.0), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn centre_ray_looks_down_the_view_axis() {
        let camera = front_camera();
        let ray = ray_from_camera(Vec2::ZERO, &camera);
        assert_relative_eq!(ray.origin.z, 20.0);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let mut scene = Scene::new();
        let far = add_box(&mut scene, "far_target", Vec3::new(0.0, 0.0, -5.0));
        let near = add_box(&mut scene, "near_target", Vec3::new(0.0, 0.0, 5.0));
        let aside = add_box(&mut scene, "aside_target", Vec3::new(8.0, 0.0, 0.0));
        scene.update_transforms();

        let ray = ray_from_camera(Vec2::ZERO, &front_camera());
        let hits = intersect_pool(&ray, &[far, near, aside], &scene);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, near);
        assert_relative_eq!(hits[0].distance, 14.0, epsilon = 1e-4);
        assert_eq!(hits[1].object, far);
        assert_relative_eq!(hits[1].point.z, -4.0, epsilon = 1e-4);
    }

    #[test]
    fn pointer_off_target_misses() {
        let mut scene = Scene::new();
        let target = add_box(&mut scene, "target", Vec3::ZERO);
        scene.update_transforms();

        let ray = ray_from_camera(Vec2::new(0.9, 0.9), &front_camera());
        assert!(intersect_pool(&ray, &[target], &scene).is_empty());
    }
}
