use glam::Vec2;

use crate::animation::play_hover_animation;
use crate::catalog::{Catalog, ClickTarget};
use crate::links::LinkTable;
use crate::modal::ModalKind;
use crate::pointer::FrameHits;
use crate::scene_graph::ObjectId;
use crate::tween::Animator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Hovering(ObjectId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    OpenLink(String),
    ShowModal(ModalKind),
}

/// Hover bookkeeping between frames. Only the nearest raycast-target hit
/// drives transitions; farther hits are ignored.
pub struct InteractionState {
    /// Pointer in normalized device coordinates.
    pointer: Vec2,
    hovered: Option<ObjectId>,
    hits: FrameHits,
    cursor: Cursor,
    hover_duration: f32,
}

impl InteractionState {
    pub fn new(hover_duration: f32) -> Self {
        Self {
            pointer: Vec2::ZERO,
            hovered: None,
            hits: FrameHits::default(),
            cursor: Cursor::Default,
            hover_duration,
        }
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = ndc;
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }

    #[cfg(test)]
    pub fn top_intersection(&self) -> Option<ObjectId> {
        self.hits.nearest_target().map(|hit| hit.object)
    }

    #[cfg(test)]
    pub fn state(&self) -> HoverState {
        match self.hovered {
            Some(object) => HoverState::Hovering(object),
            None => HoverState::Idle,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn hits(&self) -> &FrameHits {
        &self.hits
    }

    /// Runs one frame of the hover state machine on freshly cast hits.
    pub fn tick(&mut self, hits: FrameHits, catalog: &Catalog, animator: &mut dyn Animator) -> Cursor {
        let top = hits.nearest_target().map(|hit| hit.object);

        match top.filter(|&object| catalog.is_hoverable(object)) {
            Some(object) => {
                if !hits.hovers.is_empty() && self.hovered != Some(object) {
                    if let Some(previous) = self.hovered.take() {
                        play_hover_animation(previous, false, catalog, animator, self.hover_duration);
                    }
                    play_hover_animation(object, true, catalog, animator, self.hover_duration);
                    self.hovered = Some(object);
                }
                self.cursor = Cursor::Pointer;
            }
            None => {
                self.clear_hover(catalog, animator);
                self.cursor = Cursor::Default;
            }
        }

        self.hits = hits;
        self.cursor
    }

    /// Forces `Idle` while a modal is up. Hits are dropped so a click cannot
    /// act on a stale frame.
    pub fn suspend(&mut self, catalog: &Catalog, animator: &mut dyn Animator) {
        self.clear_hover(catalog, animator);
        self.hits = FrameHits::default();
        self.cursor = Cursor::Default;
    }

    fn clear_hover(&mut self, catalog: &Catalog, animator: &mut dyn Animator) {
        if let Some(previous) = self.hovered.take() {
            play_hover_animation(previous, false, catalog, animator, self.hover_duration);
        }
    }

    /// Action for a click on the nearest raycast target of the last frame.
    pub fn click(&self, catalog: &Catalog, links: &LinkTable) -> Option<ClickAction> {
        let object = self.hits.nearest_target()?.object;

        match catalog.tags(object)?.click? {
            ClickTarget::Link(link) => links
                .get(link)
                .map(|link| ClickAction::OpenLink(link.url.clone())),
            ClickTarget::Email => Some(ClickAction::ShowModal(ModalKind::Email)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::tests::add_box;
    use crate::pointer::Intersection;
    use crate::scene_graph::Scene;
    use crate::tween::tests::{AnimatorCall, RecordingAnimator};
    use crate::tween::{AxisTarget, Channel, TweenKey};
    use glam::Vec3;

    struct Fixture {
        catalog: Catalog,
        umbrella: ObjectId,
        breaker: ObjectId,
        github: ObjectId,
        email: ObjectId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let umbrella = add_box(&mut scene, "umbrella_target_hover", Vec3::ZERO);
        let breaker = add_box(&mut scene, "breaker_target_hover", Vec3::X * 4.0);
        let github = add_box(&mut scene, "github_target", Vec3::X * 8.0);
        let email = add_box(&mut scene, "email_target", Vec3::X * 12.0);
        let catalog = Catalog::classify(&scene, &LinkTable::default());

        Fixture {
            catalog,
            umbrella,
            breaker,
            github,
            email,
        }
    }

    fn hit(object: ObjectId, distance: f32) -> Intersection {
        Intersection {
            object,
            distance,
            point: Vec3::ZERO,
        }
    }

    /// Hits as the projector would report them for the given target objects.
    fn hits_on(catalog: &Catalog, objects: &[(ObjectId, f32)]) -> FrameHits {
        let targets = objects.iter().map(|&(object, distance)| hit(object, distance)).collect();
        let hovers = objects
            .iter()
            .filter(|(object, _)| catalog.is_hoverable(*object))
            .map(|&(object, distance)| hit(object, distance))
            .collect();
        FrameHits { targets, hovers }
    }

    fn enters(animator: &RecordingAnimator, object: ObjectId, value: AxisTarget) -> usize {
        animator
            .calls
            .iter()
            .filter(|call| {
                matches!(call, AnimatorCall::Tween { key, target, .. }
                    if *key == TweenKey::new(object, Channel::Rotation) && *target == value)
            })
            .count()
    }

    #[test]
    fn no_hits_means_idle_with_default_cursor() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        let cursor = state.tick(FrameHits::default(), &f.catalog, &mut animator);

        assert_eq!(cursor, Cursor::Default);
        assert_eq!(state.state(), HoverState::Idle);
        assert!(animator.calls.is_empty());
    }

    #[test]
    fn hovering_the_same_object_twice_enters_once() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        for _ in 0..3 {
            let hits = hits_on(&f.catalog, &[(f.umbrella, 10.0)]);
            assert_eq!(state.tick(hits, &f.catalog, &mut animator), Cursor::Pointer);
        }

        assert_eq!(state.state(), HoverState::Hovering(f.umbrella));
        assert_eq!(enters(&animator, f.umbrella, AxisTarget::y(1.5)), 1);
        assert_eq!(animator.tween_count(), 1);
    }

    #[test]
    fn moving_between_objects_exits_then_enters() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        state.tick(hits_on(&f.catalog, &[(f.umbrella, 10.0)]), &f.catalog, &mut animator);
        animator.calls.clear();

        state.tick(hits_on(&f.catalog, &[(f.breaker, 10.0)]), &f.catalog, &mut animator);

        assert_eq!(
            animator.calls,
            vec![
                AnimatorCall::Kill(f.umbrella),
                AnimatorCall::Tween {
                    key: TweenKey::new(f.umbrella, Channel::Rotation),
                    target: AxisTarget::y(0.0),
                    duration: 0.5,
                    easing: crate::tween::Easing::BounceOut,
                },
                AnimatorCall::Kill(f.breaker),
                AnimatorCall::Tween {
                    key: TweenKey::new(f.breaker, Channel::Rotation),
                    target: AxisTarget::y(-2.0),
                    duration: 0.5,
                    easing: crate::tween::Easing::BounceOut,
                },
            ]
        );
        assert_eq!(state.hovered(), Some(f.breaker));
    }

    #[test]
    fn only_the_nearest_hit_counts() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        // A non-hover target in front of a hover target blocks the hover.
        let hits = hits_on(&f.catalog, &[(f.github, 5.0), (f.umbrella, 10.0)]);
        let cursor = state.tick(hits, &f.catalog, &mut animator);

        assert_eq!(cursor, Cursor::Default);
        assert_eq!(state.hovered(), None);
        assert_eq!(state.top_intersection(), Some(f.github));
    }

    #[test]
    fn leaving_a_target_plays_exit_and_clears() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        state.tick(hits_on(&f.catalog, &[(f.umbrella, 10.0)]), &f.catalog, &mut animator);
        state.tick(FrameHits::default(), &f.catalog, &mut animator);

        assert_eq!(state.hovered(), None);
        assert_eq!(state.cursor(), Cursor::Default);
        assert_eq!(enters(&animator, f.umbrella, AxisTarget::y(0.0)), 1);
    }

    #[test]
    fn suspend_plays_exit_and_drops_hits() {
        let f = fixture();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        state.tick(hits_on(&f.catalog, &[(f.umbrella, 10.0)]), &f.catalog, &mut animator);
        state.suspend(&f.catalog, &mut animator);

        assert_eq!(state.state(), HoverState::Idle);
        assert_eq!(state.cursor(), Cursor::Default);
        assert!(state.hits().targets.is_empty());
        assert_eq!(enters(&animator, f.umbrella, AxisTarget::y(0.0)), 1);
        assert_eq!(state.click(&f.catalog, &LinkTable::default()), None);
    }

    #[test]
    fn click_resolves_links_and_email() {
        let f = fixture();
        let links = LinkTable::default();
        let mut state = InteractionState::new(0.5);
        let mut animator = RecordingAnimator::default();

        state.tick(hits_on(&f.catalog, &[(f.github, 3.0)]), &f.catalog, &mut animator);
        assert_eq!(
            state.click(&f.catalog, &links),
            Some(ClickAction::OpenLink("https://github.com/sipsjava".to_string()))
        );

        state.tick(hits_on(&f.catalog, &[(f.email, 3.0)]), &f.catalog, &mut animator);
        assert_eq!(
            state.click(&f.catalog, &links),
            Some(ClickAction::ShowModal(ModalKind::Email))
        );

        state.tick(hits_on(&f.catalog, &[(f.umbrella, 3.0)]), &f.catalog, &mut animator);
        assert_eq!(state.click(&f.catalog, &links), None);

        state.tick(FrameHits::default(), &f.catalog, &mut animator);
        assert_eq!(state.click(&f.catalog, &links), None);
    }
}
