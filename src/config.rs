use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::Vec3;

use crate::links::LinkTable;
use crate::materials::{TextureSetTable, Theme};
use crate::modal::ModalKind;

pub const THEME_VAR: &str = "COFFEE_SHOP_THEME";
pub const ASSET_ROOT_VAR: &str = "COFFEE_SHOP_ASSETS";

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(-29.81365715721389, 7.860900199165037, -9.422209800727748),
            fov_y_degrees: 35.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    pub target: Vec3,
    pub damping_factor: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of drag, scaled by viewport height like a full
    /// turn per screen height.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            target: Vec3::new(-3.552940186065884, 5.370265500250291, 2.413349325517568),
            damping_factor: 0.05,
            min_polar_angle: PI / 3.0,
            max_polar_angle: PI / 2.0,
            min_azimuth_angle: -10.0,
            max_azimuth_angle: f32::INFINITY,
            min_distance: 30.0,
            max_distance: 75.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Per-frame rotation increments, in radians.
#[derive(Debug, Clone, Copy)]
pub struct RotorSpeeds {
    pub ac_fan: f32,
    pub sink_fan: f32,
    pub bean: f32,
}

impl Default for RotorSpeeds {
    fn default() -> Self {
        Self {
            ac_fan: 0.15,
            sink_fan: 0.1,
            bean: 0.007,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub asset_root: PathBuf,
    pub model_path: String,
    pub theme: Theme,
    pub texture_sets: TextureSetTable,
    pub screen_texture: String,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub links: LinkTable,
    pub rotors: RotorSpeeds,
    pub hover_duration: f32,
    pub modal_fade_duration: f32,
    pub startup_modal: Option<ModalKind>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            model_path: "models/coffee_shop_devfolio.glb".to_string(),
            theme: Theme::Night,
            texture_sets: TextureSetTable::default(),
            screen_texture: "textures/screen/laptop_screen.webp".to_string(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            links: LinkTable::default(),
            rotors: RotorSpeeds::default(),
            hover_duration: 0.5,
            modal_fade_duration: 0.3,
            startup_modal: Some(ModalKind::Email),
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(theme) = lookup(THEME_VAR) {
            config.theme = theme
                .parse()
                .with_context(|| format!("Invalid {THEME_VAR}"))?;
        }

        if let Some(root) = lookup(ASSET_ROOT_VAR) {
            config.asset_root = PathBuf::from(root);
        }

        log::debug!(
            "Viewer config: theme {:?}, assets in {}",
            config.theme,
            config.asset_root.display()
        );

        Ok(config)
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }
}
