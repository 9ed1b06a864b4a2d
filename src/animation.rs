use glam::Vec3;

use crate::catalog::{Catalog, HoverProfile};
use crate::scene_graph::{ObjectId, TransformSnapshot};
use crate::tween::{Animator, AxisTarget, Channel, Easing, TweenKey};

pub const HOVER_EASING: Easing = Easing::BounceOut;

/// What a hover profile animates. The partner, when present, is driven on the
/// same channel in lock-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRecipe {
    pub channel: Channel,
    pub hovered: AxisTarget,
    pub partner_hovered: Option<AxisTarget>,
}

impl AnimationRecipe {
    const fn single(channel: Channel, hovered: AxisTarget) -> Self {
        Self {
            channel,
            hovered,
            partner_hovered: None,
        }
    }

    const fn coupled(hovered: AxisTarget, partner_hovered: AxisTarget) -> Self {
        Self {
            channel: Channel::Rotation,
            hovered,
            partner_hovered: Some(partner_hovered),
        }
    }
}

pub fn recipe(profile: HoverProfile) -> AnimationRecipe {
    match profile {
        HoverProfile::Umbrella => AnimationRecipe::single(Channel::Rotation, AxisTarget::y(1.5)),
        HoverProfile::FrontDoor => {
            AnimationRecipe::coupled(AxisTarget::y(-1.5), AxisTarget::y(1.5))
        }
        HoverProfile::PatioDoor => {
            AnimationRecipe::coupled(AxisTarget::y(-0.5), AxisTarget::y(-0.5))
        }
        HoverProfile::BackDoor => AnimationRecipe::coupled(AxisTarget::y(1.5), AxisTarget::y(1.5)),
        HoverProfile::Dumpster => AnimationRecipe::single(Channel::Rotation, AxisTarget::z(1.0)),
        HoverProfile::Breaker => AnimationRecipe::single(Channel::Rotation, AxisTarget::y(-2.0)),
        HoverProfile::Sign => AnimationRecipe::single(Channel::Scale, AxisTarget::uniform(1.5)),
        // A partner hovered alone swings to the angle its driver gives it.
        HoverProfile::FrontDoorWindow | HoverProfile::PatioKnob | HoverProfile::BackDoorWindow => {
            let driver = profile.driver().map(recipe);
            match driver.and_then(|driver| driver.partner_hovered) {
                Some(hovered) => AnimationRecipe::single(Channel::Rotation, hovered),
                None => AnimationRecipe::single(Channel::Rotation, AxisTarget::default()),
            }
        }
    }
}

fn snapshot_channel(snapshot: &TransformSnapshot, channel: Channel) -> Vec3 {
    match channel {
        Channel::Position => snapshot.position,
        Channel::Rotation => snapshot.rotation,
        Channel::Scale => snapshot.scale,
    }
}

/// Plays the enter (`entering`) or exit animation for a hover target.
///
/// In-flight tweens on the node are always cancelled first, and so are the
/// partner's before it is driven. Exit targets are
/// the node's own captured values, and the partner returns to its own
/// captured values as well. Nodes without a profile only get the cancel.
pub fn play_hover_animation(
    object: ObjectId,
    entering: bool,
    catalog: &Catalog,
    animator: &mut dyn Animator,
    duration: f32,
) {
    animator.kill_tweens_of(object);

    let Some(tags) = catalog.tags(object) else {
        return;
    };
    let Some(profile) = tags.profile else {
        return;
    };

    let recipe = recipe(profile);

    let Some(target) = hover_target(catalog, object, recipe.channel, recipe.hovered, entering)
    else {
        log::debug!("Hover target {:?} has no captured transform", object);
        return;
    };
    animator.tween_to(
        TweenKey::new(object, recipe.channel),
        target,
        duration,
        HOVER_EASING,
    );

    let Some(partner_hovered) = recipe.partner_hovered else {
        return;
    };

    match tags.partner {
        Some(partner) => {
            animator.kill_tweens_of(partner);
            if let Some(target) =
                hover_target(catalog, partner, recipe.channel, partner_hovered, entering)
            {
                animator.tween_to(
                    TweenKey::new(partner, recipe.channel),
                    target,
                    duration,
                    HOVER_EASING,
                );
            }
        }
        // Already reported when the catalog was built.
        None => log::debug!("Skipping coupled animation for {:?}: no partner", profile),
    }
}

fn hover_target(
    catalog: &Catalog,
    object: ObjectId,
    channel: Channel,
    hovered: AxisTarget,
    entering: bool,
) -> Option<AxisTarget> {
    if entering {
        return Some(hovered);
    }

    let initial = catalog.initial(object)?;
    Some(hovered.same_axes_from(snapshot_channel(&initial, channel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkTable;
    use crate::scene_graph::{Mesh, Object3D, Scene};
    use crate::tween::tests::{AnimatorCall, RecordingAnimator};
    use crate::tween::TweenEngine;
    use approx::assert_relative_eq;

    fn add_hover_node(scene: &mut Scene, name: &str, rotation_y: f32) -> ObjectId {
        let mesh = scene.add_mesh(Mesh::cuboid(name, Vec3::ONE));
        let mut object = Object3D::named(name);
        object.mesh_id = Some(mesh);
        object.transform.set_rotation(Vec3::new(0.0, rotation_y, 0.0));
        scene.add_object(object)
    }

    #[test]
    fn front_door_swings_with_its_window() {
        let mut scene = Scene::new();
        let door = add_hover_node(&mut scene, "front_door_hover", 0.25);
        let window = add_hover_node(&mut scene, "front_door_window_hover", -0.75);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut tweens = TweenEngine::new();
        play_hover_animation(door, true, &catalog, &mut tweens, 0.5);
        tweens.advance(0.5, &mut scene);

        let rotation_y = |scene: &Scene, id| scene.get_object(id).unwrap().transform.rotation().y;
        assert_relative_eq!(rotation_y(&scene, door), -1.5, epsilon = 1e-5);
        assert_relative_eq!(rotation_y(&scene, window), 1.5, epsilon = 1e-5);

        play_hover_animation(door, false, &catalog, &mut tweens, 0.5);
        tweens.advance(0.5, &mut scene);

        // Each returns to its own captured rotation.
        assert_relative_eq!(rotation_y(&scene, door), 0.25, epsilon = 1e-5);
        assert_relative_eq!(rotation_y(&scene, window), -0.75, epsilon = 1e-5);
    }

    #[test]
    fn enter_cancels_before_starting() {
        let mut scene = Scene::new();
        let dumpster = add_hover_node(&mut scene, "dumpster_hover", 0.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut animator = RecordingAnimator::default();
        play_hover_animation(dumpster, true, &catalog, &mut animator, 0.5);

        assert_eq!(
            animator.calls,
            vec![
                AnimatorCall::Kill(dumpster),
                AnimatorCall::Tween {
                    key: TweenKey::new(dumpster, Channel::Rotation),
                    target: AxisTarget::z(1.0),
                    duration: 0.5,
                    easing: Easing::BounceOut,
                },
            ]
        );
    }

    #[test]
    fn partner_is_cancelled_before_it_is_driven() {
        let mut scene = Scene::new();
        let door = add_hover_node(&mut scene, "front_door_hover", 0.0);
        let window = add_hover_node(&mut scene, "front_door_window_hover", 0.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut animator = RecordingAnimator::default();
        play_hover_animation(door, true, &catalog, &mut animator, 0.5);

        assert_eq!(
            animator.calls,
            vec![
                AnimatorCall::Kill(door),
                AnimatorCall::Tween {
                    key: TweenKey::new(door, Channel::Rotation),
                    target: AxisTarget::y(-1.5),
                    duration: 0.5,
                    easing: Easing::BounceOut,
                },
                AnimatorCall::Kill(window),
                AnimatorCall::Tween {
                    key: TweenKey::new(window, Channel::Rotation),
                    target: AxisTarget::y(1.5),
                    duration: 0.5,
                    easing: Easing::BounceOut,
                },
            ]
        );
    }

    #[test]
    fn partner_position_tween_does_not_survive_the_door() {
        let mut scene = Scene::new();
        let door = add_hover_node(&mut scene, "front_door_hover", 0.0);
        let window = add_hover_node(&mut scene, "front_door_window_hover", 0.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut tweens = TweenEngine::new();
        let slide = TweenKey::new(window, Channel::Position);
        tweens.tween_to(slide, AxisTarget::x(3.0), 1.0, Easing::Linear);

        play_hover_animation(door, true, &catalog, &mut tweens, 0.5);

        assert!(!tweens.is_active(slide));
        assert!(tweens.is_active(TweenKey::new(window, Channel::Rotation)));
    }

    #[test]
    fn window_hovered_alone_swings_to_its_partner_angle() {
        let mut scene = Scene::new();
        let door = add_hover_node(&mut scene, "front_door_hover", 0.0);
        let window = add_hover_node(&mut scene, "front_door_window_hover", 0.3);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut tweens = TweenEngine::new();
        play_hover_animation(window, true, &catalog, &mut tweens, 0.5);
        tweens.advance(0.5, &mut scene);

        let rotation_y = |scene: &Scene, id| scene.get_object(id).unwrap().transform.rotation().y;
        assert_relative_eq!(rotation_y(&scene, window), 1.5, epsilon = 1e-5);
        assert_relative_eq!(rotation_y(&scene, door), 0.0, epsilon = 1e-5);

        play_hover_animation(window, false, &catalog, &mut tweens, 0.5);
        tweens.advance(0.5, &mut scene);
        assert_relative_eq!(rotation_y(&scene, window), 0.3, epsilon = 1e-5);
    }

    #[test]
    fn sign_scales_and_restores_captured_scale() {
        let mut scene = Scene::new();
        let sign = add_hover_node(&mut scene, "open_sign_hover", 0.0);
        scene.set_object_scale(sign, Vec3::splat(0.8));
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut animator = RecordingAnimator::default();
        play_hover_animation(sign, true, &catalog, &mut animator, 0.5);
        play_hover_animation(sign, false, &catalog, &mut animator, 0.5);

        assert_eq!(
            animator.tweens_for(sign),
            vec![AxisTarget::uniform(1.5), AxisTarget::uniform(0.8)]
        );
    }

    #[test]
    fn missing_partner_skips_only_the_coupled_half() {
        let mut scene = Scene::new();
        let patio = add_hover_node(&mut scene, "patio_door_glass_hover", 0.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut animator = RecordingAnimator::default();
        play_hover_animation(patio, true, &catalog, &mut animator, 0.5);

        assert_eq!(animator.tween_count(), 1);
        assert_eq!(animator.tweens_for(patio), vec![AxisTarget::y(-0.5)]);
    }

    #[test]
    fn unprofiled_hover_target_only_cancels() {
        let mut scene = Scene::new();
        let chair = add_hover_node(&mut scene, "chair_hover", 0.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        let mut animator = RecordingAnimator::default();
        play_hover_animation(chair, true, &catalog, &mut animator, 0.5);

        assert_eq!(animator.calls, vec![AnimatorCall::Kill(chair)]);
    }
}
