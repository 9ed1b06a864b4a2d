use anyhow::Context;
use glam::{Vec2, Vec3};

use crate::assets::load_gltf_scene;
use crate::camera::Camera;
use crate::catalog::Catalog;
use crate::config::ViewerConfig;
use crate::interaction::{ClickAction, Cursor, InteractionState};
use crate::links::{LinkOpener, SystemBrowser};
use crate::materials::{assign_materials, MaterialLibrary};
use crate::modal::{ModalController, ModalEvent, ModalKind};
use crate::orbit::OrbitControls;
use crate::pointer::{ndc_from_client, ray_from_camera, FrameHits};
use crate::scene_graph::Scene;
use crate::tween::TweenEngine;

/// Owns the whole viewer state. Input handlers and the per-frame tick all go
/// through here.
pub struct Viewer {
    config: ViewerConfig,
    scene: Scene,
    catalog: Catalog,
    materials: MaterialLibrary,
    camera: Camera,
    orbit: OrbitControls,
    interaction: InteractionState,
    tweens: TweenEngine,
    modal: ModalController,
    links: Box<dyn LinkOpener>,
    viewport: Vec2,
    last_touch: Option<Vec2>,
}

impl Viewer {
    /// Loads the model and textures, assigns materials and classifies the
    /// scene. Any asset failure aborts.
    pub fn load(config: ViewerConfig, viewport: Vec2) -> anyhow::Result<Viewer> {
        let model_path = config.resolve(&config.model_path);
        let scene = load_gltf_scene(&model_path)
            .with_context(|| format!("Failed to load scene from {}", model_path.display()))?;
        let materials = MaterialLibrary::load(&config).context("Failed to load textures")?;

        Ok(Self::from_parts(
            config,
            scene,
            materials,
            Box::new(SystemBrowser),
            viewport,
        ))
    }

    pub fn from_parts(
        config: ViewerConfig,
        mut scene: Scene,
        mut materials: MaterialLibrary,
        links: Box<dyn LinkOpener>,
        viewport: Vec2,
    ) -> Viewer {
        assign_materials(&mut scene, &mut materials);
        let catalog = Catalog::classify(&scene, &config.links);
        scene.update_transforms();

        let camera = Camera::from_config(&config.camera, config.orbit.target, viewport);
        let orbit = OrbitControls::new(&config.orbit);
        let interaction = InteractionState::new(config.hover_duration);
        let modal = ModalController::new(config.modal_fade_duration);
        let startup_modal = config.startup_modal;

        let mut viewer = Viewer {
            config,
            scene,
            catalog,
            materials,
            camera,
            orbit,
            interaction,
            tweens: TweenEngine::new(),
            modal,
            links,
            viewport,
            last_touch: None,
        };

        if let Some(kind) = startup_modal {
            viewer.show_modal(kind);
        }

        viewer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<crate::scene_graph::ObjectId> {
        self.interaction.hovered()
    }

    pub fn cursor(&self) -> Cursor {
        if self.is_suspended() {
            Cursor::Default
        } else {
            self.interaction.cursor()
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.modal.is_open()
    }

    /// One frame: camera, rotors, picking, hover state, tweens, overlay fade.
    pub fn frame(&mut self, dt: f32) {
        self.orbit.update(&mut self.camera);
        self.spin_rotors();
        self.scene.update_transforms();

        if !self.is_suspended() {
            let ray = ray_from_camera(self.interaction.pointer(), &self.camera);
            let hits = FrameHits::cast(&ray, &self.catalog, &self.scene);
            self.interaction.tick(hits, &self.catalog, &mut self.tweens);
        }

        self.tweens.advance(dt, &mut self.scene);

        if let Some(ModalEvent::Closed(kind)) = self.modal.advance(dt) {
            log::debug!("{:?} modal closed, resuming interaction", kind);
            self.orbit.set_enabled(true);
        }

        self.scene.update_transforms();
    }

    fn spin_rotors(&mut self) {
        let speeds = self.config.rotors;
        let pools = [
            (&self.catalog.ac_fans, Vec3::Y * speeds.ac_fan),
            (&self.catalog.sink_fans, Vec3::X * speeds.sink_fan),
            (&self.catalog.beans, Vec3::Z * speeds.bean),
        ];

        for (pool, delta) in pools {
            for &object in pool {
                self.scene.rotate_object(object, delta);
            }
        }
    }

    /// Pointer position in physical pixels.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.modal.pointer_moved();
        if self.is_suspended() {
            return;
        }
        self.interaction
            .set_pointer(ndc_from_client(position, self.viewport));
    }

    pub fn touch_started(&mut self, position: Vec2) {
        if self.is_suspended() {
            return;
        }
        self.last_touch = Some(position);
        self.interaction
            .set_pointer(ndc_from_client(position, self.viewport));
    }

    /// Single-finger drag orbits the camera.
    pub fn touch_moved(&mut self, position: Vec2) {
        if self.is_suspended() {
            return;
        }
        if let Some(previous) = self.last_touch.replace(position) {
            self.orbit.rotate(position - previous, self.viewport.y);
        }
        self.interaction
            .set_pointer(ndc_from_client(position, self.viewport));
    }

    /// A lifted finger acts like a click on whatever is under it.
    pub fn touch_ended(&mut self) {
        self.last_touch = None;
        if self.is_suspended() {
            return;
        }
        self.clicked();
    }

    pub fn clicked(&mut self) {
        if self.is_suspended() {
            return;
        }

        match self.interaction.click(&self.catalog, &self.config.links) {
            Some(ClickAction::OpenLink(url)) => {
                if let Err(err) = self.links.open(&url) {
                    log::warn!("{:#}", err);
                }
            }
            Some(ClickAction::ShowModal(kind)) => self.show_modal(kind),
            None => {}
        }
    }

    /// Mouse drag in pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.orbit.rotate(delta, self.viewport.y);
    }

    pub fn scroll(&mut self, delta: f32) {
        self.orbit.dolly(delta);
    }

    pub fn resize(&mut self, viewport: Vec2) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
    }

    /// Opens an overlay, locking the camera and dropping any hover.
    pub fn show_modal(&mut self, kind: ModalKind) {
        match self.modal.show(kind) {
            Ok(true) => {
                self.orbit.set_enabled(false);
                self.interaction.suspend(&self.catalog, &mut self.tweens);
            }
            Ok(false) => {}
            Err(err) => log::warn!("{}", err),
        }
    }

    pub fn hide_modal(&mut self, kind: ModalKind) {
        self.modal.hide(kind);
    }

    /// Fades out whichever modal is open.
    pub fn dismiss_modal(&mut self) {
        if let Some(kind) = self.modal.open_modal() {
            self.hide_modal(kind);
        }
    }

    pub fn modal_exit_clicked(&mut self, kind: ModalKind) {
        self.modal.exit_click(kind);
    }

    pub fn modal_exit_touched(&mut self, kind: ModalKind) {
        self.modal.exit_touch_end(kind);
    }
}
