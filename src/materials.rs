use std::str::FromStr;

use glam::{Vec3, Vec4};
use id_arena::{Arena, Id};

use crate::assets::{AssetError, TextureAsset, TextureOptions};
use crate::config::ViewerConfig;
use crate::scene_graph::Scene;

pub type TextureId = Id<TextureAsset>;
pub type MaterialId = Id<Material>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Day,
    Night,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown theme {0:?}, expected \"day\" or \"night\"")]
pub struct UnknownTheme(String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Theme::Day),
            "night" => Ok(Theme::Night),
            _ => Err(UnknownTheme(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSet {
    pub id: u32,
    pub day: String,
    pub night: String,
}

impl TextureSet {
    pub fn path(&self, theme: Theme) -> &str {
        match theme {
            Theme::Day => &self.day,
            Theme::Night => &self.night,
        }
    }
}

/// Baked texture sets. A mesh whose name contains the stringified id samples
/// that set.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSetTable {
    pub sets: Vec<TextureSet>,
}

impl Default for TextureSetTable {
    fn default() -> Self {
        let sets = (1..=3)
            .map(|id| TextureSet {
                id,
                day: format!("textures/day/TextureSet{id}Day.webp"),
                night: format!("textures/night/TextureSet{id}Night.webp"),
            })
            .collect();

        Self { sets }
    }
}

/// Transmission material shared by every pane of glass.
#[derive(Debug, Clone, PartialEq)]
pub struct GlassParams {
    pub color: Vec3,
    pub transmission: f32,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub ior: f32,
    pub thickness: f32,
    pub specular_intensity: f32,
    pub specular_color: Vec3,
    pub depth_write: bool,
}

impl Default for GlassParams {
    fn default() -> Self {
        let color = Vec3::splat(0xfb as f32 / 255.0);
        Self {
            color,
            transmission: 1.0,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 0.0,
            ior: 3.0,
            thickness: 0.01,
            specular_intensity: 1.0,
            specular_color: color,
            depth_write: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Unlit, samples a baked texture.
    Unlit { texture: TextureId },
    Glass(GlassParams),
    /// Pickable but never drawn.
    Invisible,
}

pub struct MaterialLibrary {
    pub textures: Arena<TextureAsset>,
    pub materials: Arena<Material>,
    texture_sets: Vec<(u32, TextureId)>,
    screen_texture: TextureId,
    glass: MaterialId,
    invisible: MaterialId,
}

impl MaterialLibrary {
    pub fn new(theme_textures: Vec<(u32, TextureAsset)>, screen_texture: TextureAsset) -> Self {
        let mut textures = Arena::new();
        let mut materials = Arena::new();

        let texture_sets = theme_textures
            .into_iter()
            .map(|(id, texture)| (id, textures.alloc(texture)))
            .collect();
        let screen_texture = textures.alloc(screen_texture);

        let glass = materials.alloc(Material::Glass(GlassParams::default()));
        let invisible = materials.alloc(Material::Invisible);

        Self {
            textures,
            materials,
            texture_sets,
            screen_texture,
            glass,
            invisible,
        }
    }

    /// Loads the theme's texture sets and the screen texture. Any failure is
    /// fatal for the scene.
    pub fn load(config: &ViewerConfig) -> Result<Self, AssetError> {
        let options = TextureOptions::default();

        let theme_textures = config
            .texture_sets
            .sets
            .iter()
            .map(|set| {
                let path = config.resolve(set.path(config.theme));
                TextureAsset::load(&path, options).map(|texture| (set.id, texture))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let screen = TextureAsset::load(&config.resolve(&config.screen_texture), options)?;

        log::info!(
            "Loaded {} texture sets ({:?}) and screen texture",
            theme_textures.len(),
            config.theme
        );

        Ok(Self::new(theme_textures, screen))
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    #[cfg(test)]
    pub fn get_texture(&self, id: TextureId) -> Option<&TextureAsset> {
        self.textures.get(id)
    }

    pub fn glass(&self) -> MaterialId {
        self.glass
    }

    pub fn invisible(&self) -> MaterialId {
        self.invisible
    }

    fn unlit(&mut self, texture: TextureId) -> MaterialId {
        self.materials.alloc(Material::Unlit { texture })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentStats {
    pub baked: usize,
    pub glass: usize,
    pub screen: usize,
    pub hitbox: usize,
}

/// Replaces imported materials on mesh nodes by name marker. Markers apply in
/// order (texture set, `glass`, `screen`, `hitbox`), so later ones win. Nodes
/// that match nothing keep their imported material.
pub fn assign_materials(scene: &mut Scene, library: &mut MaterialLibrary) -> AssignmentStats {
    let mut stats = AssignmentStats::default();
    let texture_sets = library.texture_sets.clone();

    for (_, object) in scene.objects.iter_mut() {
        if !object.is_mesh() {
            continue;
        }

        for &(set_id, texture) in &texture_sets {
            if object.name.contains(&set_id.to_string()) {
                object.material_id = Some(library.unlit(texture));
                stats.baked += 1;
            }
        }

        if object.name.contains("glass") {
            object.material_id = Some(library.glass());
            stats.glass += 1;
        }

        if object.name.contains("screen") {
            object.material_id = Some(library.unlit(library.screen_texture));
            stats.screen += 1;
        }

        if object.name.contains("hitbox") {
            object.material_id = Some(library.invisible());
            stats.hitbox += 1;
        }
    }

    log::info!(
        "Assigned materials: {} baked, {} glass, {} screen, {} hitbox",
        stats.baked,
        stats.glass,
        stats.screen,
        stats.hitbox
    );

    stats
}

/// Tint used when drawing a node, before texture sampling.
pub fn base_tint(material: &Material) -> Vec4 {
    match material {
        Material::Unlit { .. } => Vec4::ONE,
        Material::Glass(params) => params.color.extend(0.25 * params.opacity),
        Material::Invisible => Vec4::ZERO,
    }
}
