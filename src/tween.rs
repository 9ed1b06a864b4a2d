use std::collections::HashMap;

use glam::Vec3;

use crate::scene_graph::{ObjectId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadOut,
    BounceOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Transform property group a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Rotation,
    Scale,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Position, Channel::Rotation, Channel::Scale];

    fn read(self, scene: &Scene, object: ObjectId) -> Option<Vec3> {
        let transform = &scene.get_object(object)?.transform;
        Some(match self {
            Channel::Position => transform.translation(),
            Channel::Rotation => transform.rotation(),
            Channel::Scale => transform.scale(),
        })
    }

    fn write(self, scene: &mut Scene, object: ObjectId, value: Vec3) {
        match self {
            Channel::Position => scene.set_object_translation(object, value),
            Channel::Rotation => scene.set_object_rotation(object, value),
            Channel::Scale => scene.set_object_scale(object, value),
        }
    }
}

/// Per-axis end values. Axes left as `None` are not animated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisTarget {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl AxisTarget {
    #[cfg(test)]
    pub fn x(value: f32) -> Self {
        Self {
            x: Some(value),
            ..Default::default()
        }
    }

    pub fn y(value: f32) -> Self {
        Self {
            y: Some(value),
            ..Default::default()
        }
    }

    pub fn z(value: f32) -> Self {
        Self {
            z: Some(value),
            ..Default::default()
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self {
            x: Some(value),
            y: Some(value),
            z: Some(value),
        }
    }

    /// Same axes, values taken from `source`.
    pub fn same_axes_from(self, source: Vec3) -> Self {
        Self {
            x: self.x.map(|_| source.x),
            y: self.y.map(|_| source.y),
            z: self.z.map(|_| source.z),
        }
    }

    pub fn apply_to(self, base: Vec3) -> Vec3 {
        Vec3::new(
            self.x.unwrap_or(base.x),
            self.y.unwrap_or(base.y),
            self.z.unwrap_or(base.z),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenKey {
    pub object: ObjectId,
    pub channel: Channel,
}

impl TweenKey {
    pub fn new(object: ObjectId, channel: Channel) -> Self {
        Self { object, channel }
    }
}

/// Tween capability used by hover animations.
pub trait Animator {
    /// Cancels every in-flight tween on the object's position, rotation and
    /// scale.
    fn kill_tweens_of(&mut self, object: ObjectId);

    /// Starts a tween, cancelling any previous one with the same key.
    fn tween_to(&mut self, key: TweenKey, target: AxisTarget, duration: f32, easing: Easing);
}

#[derive(Debug, Clone)]
struct Tween {
    /// Captured on the first advance, like a lazily rendered tween.
    from: Option<Vec3>,
    target: AxisTarget,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

#[derive(Default)]
pub struct TweenEngine {
    tweens: HashMap<TweenKey, Tween>,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_active(&self, key: TweenKey) -> bool {
        self.tweens.contains_key(&key)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// Steps every tween by `dt` seconds and writes the eased values into the
    /// scene. Finished tweens land exactly on their target and are dropped.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) {
        self.tweens.retain(|key, tween| {
            let Some(from) = tween
                .from
                .or_else(|| key.channel.read(scene, key.object))
            else {
                log::debug!("Dropping tween for missing object {:?}", key.object);
                return false;
            };
            tween.from = Some(from);

            tween.elapsed += dt;
            let progress = if tween.duration > 0.0 {
                (tween.elapsed / tween.duration).min(1.0)
            } else {
                1.0
            };

            let end = tween.target.apply_to(from);
            let value = from.lerp(end, tween.easing.apply(progress));
            key.channel.write(scene, key.object, value);

            progress < 1.0
        });
    }
}

impl Animator for TweenEngine {
    fn kill_tweens_of(&mut self, object: ObjectId) {
        for channel in Channel::ALL {
            self.tweens.remove(&TweenKey::new(object, channel));
        }
    }

    fn tween_to(&mut self, key: TweenKey, target: AxisTarget, duration: f32, easing: Easing) {
        self.tweens.insert(
            key,
            Tween {
                from: None,
                target,
                duration,
                elapsed: 0.0,
                easing,
            },
        );
    }
}

/// Scalar tween for overlay opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.value()
    }

    pub fn value(&self) -> f32 {
        let progress = self.progress();
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        }
    }
}
