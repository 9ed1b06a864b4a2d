use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{
        ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
    },
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{CursorIcon, Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    engine,
    interaction::Cursor,
    rendering::{overlay::ExitButton, renderer::Renderer},
    viewer::Viewer,
};

/// Pointer travel, in pixels, past which a press-release is a drag and not a
/// click.
const CLICK_SLOP: f32 = 5.0;
const LINE_HEIGHT: f32 = 40.0;

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    config: Option<ViewerConfig>,
    viewer: Option<Viewer>,
    renderer: Option<Renderer>,
    imgui: Option<ImguiState>,
    last_frame: Instant,
    mouse_pos: Vec2,
    press_origin: Option<Vec2>,
    exit_button: Option<ExitButton>,
    cursor: Cursor,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config: Some(config),
            viewer: None,
            renderer: None,
            imgui: None,
            last_frame: Instant::now(),
            mouse_pos: Vec2::ZERO,
            press_origin: None,
            exit_button: None,
            cursor: Cursor::Default,
            error: None,
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 15.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        context.set_ini_filename(None);
        // The viewer owns the cursor shape.
        context.io_mut().config_flags |= imgui::ConfigFlags::NO_MOUSE_CURSOR_CHANGE;

        ImguiState { context, platform }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let config = self.config.take().context("Viewer already started")?;

        let window = event_loop
            .create_window(Window::default_attributes().with_title("Coffee Shop"))
            .context("Failed to create window")?;
        let window = Arc::new(window);
        let size = window.inner_size();

        let viewer = Viewer::load(config, Vec2::new(size.width as f32, size.height as f32))?;
        let mut imgui = Self::setup_imgui(&window);
        let renderer = pollster::block_on(Renderer::new(window, &viewer, &mut imgui.context))?;

        self.viewer = Some(viewer);
        self.imgui = Some(imgui);
        self.renderer = Some(renderer);
        self.last_frame = Instant::now();

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            log::error!("{:#}", err);
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(imgui), Some(renderer), Some(viewer)) = (
            self.imgui.as_mut(),
            self.renderer.as_mut(),
            self.viewer.as_mut(),
        ) else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                renderer.resize(*new_size);
                viewer.resize(Vec2::new(new_size.width as f32, new_size.height as f32));
            }
            WindowEvent::RedrawRequested => {
                let delta_time = self.last_frame.elapsed();
                imgui.context.io_mut().update_delta_time(delta_time);
                self.last_frame = Instant::now();

                renderer.window.request_redraw();

                if let Err(err) = imgui
                    .platform
                    .prepare_frame(imgui.context.io_mut(), &renderer.window)
                {
                    log::error!("Failed to prepare overlay frame: {}", err);
                    return;
                }

                let ui = imgui.context.new_frame();
                let output = engine::update(viewer, ui, delta_time.as_secs_f32());
                self.exit_button = output.exit_button;
                imgui.platform.prepare_render(ui, &renderer.window);

                let cursor = viewer.cursor();
                if cursor != self.cursor {
                    renderer.window.set_cursor(match cursor {
                        Cursor::Default => CursorIcon::Default,
                        Cursor::Pointer => CursorIcon::Pointer,
                    });
                    self.cursor = cursor;
                }

                match renderer.render(viewer, &mut imgui.context) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if self.press_origin.is_some() {
                    viewer.drag(position - self.mouse_pos);
                }
                self.mouse_pos = position;
                viewer.pointer_moved(position);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.press_origin = Some(self.mouse_pos);
                }
                ElementState::Released => {
                    let travelled = self
                        .press_origin
                        .take()
                        .map_or(0.0, |origin| origin.distance(self.mouse_pos));
                    if travelled <= CLICK_SLOP && !imgui.context.io().want_capture_mouse {
                        viewer.clicked();
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / LINE_HEIGHT,
                };
                // Scrolling up brings the camera closer.
                viewer.scroll(-lines);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => viewer.dismiss_modal(),
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => viewer.touch_started(position),
                    TouchPhase::Moved => viewer.touch_moved(position),
                    TouchPhase::Ended => {
                        let logical = touch
                            .location
                            .to_logical::<f32>(renderer.window.scale_factor());
                        match self
                            .exit_button
                            .filter(|button| button.contains([logical.x, logical.y]))
                        {
                            Some(button) => viewer.modal_exit_touched(button.kind),
                            None => viewer.touch_ended(),
                        }
                    }
                    TouchPhase::Cancelled => {}
                }
            }
            _ => (),
        }

        imgui.platform.handle_event::<()>(
            imgui.context.io_mut(),
            &renderer.window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = ViewerConfig::from_env()?;
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
