use imgui::{Condition, StyleVar, WindowFlags};
use imgui_wgpu::RendererConfig;
use wgpu::{CommandEncoder, TextureView};

use crate::modal::{ModalController, ModalKind};

const MODAL_SIZE: [f32; 2] = [420.0, 220.0];
const EXIT_LABEL: &str = "Close";

/// Screen rectangle of the open modal's exit button, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitButton {
    pub kind: ModalKind,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl ExitButton {
    pub fn contains(&self, point: [f32; 2]) -> bool {
        (self.min[0]..=self.max[0]).contains(&point[0])
            && (self.min[1]..=self.max[1]).contains(&point[1])
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OverlayOutput {
    pub exit_clicked: Option<ModalKind>,
    pub exit_button: Option<ExitButton>,
}

fn body(kind: ModalKind) -> &'static str {
    match kind {
        ModalKind::Github => "Source for this scene and other projects lives on GitHub.",
        ModalKind::About => {
            "An interactive coffee shop built as a portfolio. Hover around the \
             room to find things that move, and click the signs to follow links."
        }
        ModalKind::Email => "Want to get in touch? Click the mail on the counter any time.",
    }
}

/// Draws the open modal, if any, faded by the controller's opacity.
pub fn draw_modal(ui: &imgui::Ui, modal: &ModalController) -> OverlayOutput {
    let mut output = OverlayOutput::default();
    let Some(kind) = modal.open_modal() else {
        return output;
    };

    let display = ui.io().display_size;
    let position = [
        (display[0] - MODAL_SIZE[0]) * 0.5,
        (display[1] - MODAL_SIZE[1]) * 0.5,
    ];
    let _alpha = ui.push_style_var(StyleVar::Alpha(modal.opacity()));

    ui.window(kind.title())
        .position(position, Condition::Always)
        .size(MODAL_SIZE, Condition::Always)
        .flags(WindowFlags::NO_RESIZE | WindowFlags::NO_MOVE | WindowFlags::NO_COLLAPSE)
        .build(|| {
            ui.text_wrapped(body(kind));
            ui.separator();

            // Buttons stop reacting once the fade-out has started.
            if ui.button(EXIT_LABEL) && !modal.is_closing() {
                output.exit_clicked = Some(kind);
            }
            output.exit_button = Some(ExitButton {
                kind,
                min: ui.item_rect_min(),
                max: ui.item_rect_max(),
            });
        });

    output
}

pub struct OverlayRenderer {
    renderer: imgui_wgpu::Renderer,
}

impl OverlayRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        context: &mut imgui::Context,
    ) -> Self {
        let renderer_config = RendererConfig {
            texture_format,
            ..Default::default()
        };

        Self {
            renderer: imgui_wgpu::Renderer::new(context, device, queue, renderer_config),
        }
    }

    pub fn render(
        &mut self,
        view: &TextureView,
        context: &mut imgui::Context,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut CommandEncoder,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let draw_data = context.render();

        // imgui-rs crashes on empty draw data
        if draw_data.draw_lists_count() == 0 {
            return;
        }

        if let Err(err) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Overlay rendering failed: {}", err);
        }
    }
}
