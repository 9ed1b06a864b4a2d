use crate::{
    rendering::overlay::{self, OverlayOutput},
    viewer::Viewer,
};

/// Advances the viewer by one frame and lays out the overlay for it.
pub fn update(viewer: &mut Viewer, ui: &imgui::Ui, dt: f32) -> OverlayOutput {
    viewer.frame(dt);

    let output = overlay::draw_modal(ui, viewer.modal());
    if let Some(kind) = output.exit_clicked {
        viewer.modal_exit_clicked(kind);
    }

    output
}
